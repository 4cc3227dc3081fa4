//! 对 `scene-berry::dataset` 的更一层封装. 提供更直接的数据集路径来源.

use std::env;
use std::path::PathBuf;

use scene_berry::dataset::{self, DatasetLayout};

/// 获取 ScanNet++ 风格数据集根目录.
///
/// 1. 若环境变量 `$SCANNETPP_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/scannetpp/data`.
pub fn data_root_from_env_or_home() -> PathBuf {
    if let Ok(d) = env::var("SCANNETPP_DATA_DIR") {
        PathBuf::from(d)
    } else {
        dataset::home_dataset_dir_with(["scannetpp", "data"]).unwrap()
    }
}

/// 从 `$SCANNETPP_DATA_DIR` 或者 `$HOME/dataset/scannetpp/data` 构造数据集布局.
#[inline]
pub fn layout_from_env_or_home() -> DatasetLayout {
    DatasetLayout::new(data_root_from_env_or_home())
}
