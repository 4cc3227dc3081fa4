//! 场景光栅数据加载器.
//!
//! 提供迭代器风格的数据集获取模式.

use std::path::{Path, PathBuf};

use ndarray_npy::ReadNpyError;

use crate::InstanceRaster;

/// 从指定路径创建一个场景的光栅 ([`InstanceRaster`]) 加载器.
/// 返回的加载器按图像主干名升序迭代该场景光栅目录下所有的 `.npy` 文件.
///
/// # 注意
///
/// 1. `path` 必须是可读目录, 否则程序 panic.
/// 2. 单个 `.npy` 文件损坏或不可读时, 加载器在迭代到它时返回
///    `Result::Error`, 不影响后续文件.
pub fn raster_loader<P: AsRef<Path>>(path: P) -> RasterLoader {
    let path = path.as_ref().to_owned();
    assert!(path.is_dir());

    let mut stems: Vec<String> = std::fs::read_dir(&path)
        .expect("Raster directory listing error")
        .filter_map(|e| {
            let p = e.ok()?.path();
            if !p.is_file() || p.extension().and_then(|s| s.to_str()) != Some("npy") {
                return None;
            }
            Some(p.file_stem()?.to_str()?.to_owned())
        })
        .collect();

    // 升序迭代, 因此降序入栈.
    stems.sort_unstable_by(|a, b| b.cmp(a));

    RasterLoader {
        path,
        stems_rev: stems,
    }
}

/// 单场景光栅数据加载器.
#[derive(Debug)]
pub struct RasterLoader {
    path: PathBuf,
    stems_rev: Vec<String>,
}

impl Iterator for RasterLoader {
    type Item = (String, Result<InstanceRaster, ReadNpyError>);

    fn next(&mut self) -> Option<Self::Item> {
        let stem = self.stems_rev.pop()?;

        self.path.push(format!("{stem}.npy"));
        let data = InstanceRaster::open(self.path.as_path());
        self.path.pop();

        Some((stem, data))
    }
}

impl ExactSizeIterator for RasterLoader {
    #[inline]
    fn len(&self) -> usize {
        self.stems_rev.len()
    }
}
