//! 数据集路径布局与场景枚举.

use std::io;
use std::path::{Path, PathBuf};

mod rasters;

pub use rasters::{raster_loader, RasterLoader};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// ScanNet++ 风格数据集的目录布局.
///
/// 根目录由调用方注入, 库内不存在任何写死的绝对路径, 以便用临时目录
/// 或内存夹具测试核心逻辑.
///
/// 布局约定 (相对 `root`):
///
/// ```text
/// {scene_id}/scans/segments_anno.json       标注表
/// {scene_id}/dslr/resized_images/{stem}.JPG 原始照片
/// {scene_id}/dslr/nerfstudio/transforms.json 相机位姿表
/// ```
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    /// 以 `root` 为数据集根目录创建布局.
    #[inline]
    pub fn new<P: Into<PathBuf>>(root: P) -> DatasetLayout {
        DatasetLayout { root: root.into() }
    }

    /// 数据集根目录.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 场景目录.
    pub fn scene_dir(&self, scene_id: &str) -> PathBuf {
        self.root.join(scene_id)
    }

    /// 场景标注表路径.
    pub fn anno_path(&self, scene_id: &str) -> PathBuf {
        let mut p = self.scene_dir(scene_id);
        p.push("scans");
        p.push("segments_anno.json");
        p
    }

    /// 场景照片路径. `stem` 为图像主干名.
    pub fn photo_path(&self, scene_id: &str, stem: &str) -> PathBuf {
        let mut p = self.scene_dir(scene_id);
        p.push("dslr");
        p.push("resized_images");
        p.push(format!("{stem}.JPG"));
        p
    }

    /// 场景相机位姿表路径.
    pub fn transforms_path(&self, scene_id: &str) -> PathBuf {
        let mut p = self.scene_dir(scene_id);
        p.push("dslr");
        p.push("nerfstudio");
        p.push("transforms.json");
        p
    }
}

/// 列出 `root` 下所有子目录名, 升序排列.
///
/// 用于从逐场景目录树 (光栅根目录、掩码根目录) 枚举场景 id.
pub fn scene_ids<P: AsRef<Path>>(root: P) -> io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_owned());
            }
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

/// 列出 `dir` 下所有普通文件的主干名, 升序排列.
///
/// 用于从场景级数据文件目录 (如逐场景张量文件) 枚举场景 id.
pub fn scene_ids_from_blobs<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            let path = entry.path();
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_owned());
            }
        }
    }
    ids.sort_unstable();
    Ok(ids)
}
