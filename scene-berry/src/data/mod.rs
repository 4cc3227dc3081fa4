//! 光栅/掩码/抠图基础数据结构.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::ops::Index;
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::{Array2, ArrayView2};
use ndarray_npy::{read_npy, ReadNpyError};

use crate::consts::{gray, NO_INSTANCE};
use crate::{Idx2d, InstanceId};

mod crop;
mod mask;
mod save;

pub use crop::MaskedCrop;
pub use mask::InstanceMask;
pub use save::{ImgWriteRaw, ImgWriteVis};

/// 一张图像的实例 ID 光栅. 每个像素记录覆盖它的实例 id,
/// [`NO_INSTANCE`] 为保留的背景值.
///
/// 光栅分辨率由上游渲染决定, 可能低于原始照片分辨率.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRaster {
    data: Array2<InstanceId>,
}

impl InstanceRaster {
    /// 从 `.npy` 文件 (2 维 `i64` 数组) 读取光栅.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<InstanceRaster, ReadNpyError> {
        Ok(InstanceRaster {
            data: read_npy(path)?,
        })
    }

    /// 从内存数组直接构造光栅.
    #[inline]
    pub fn from_array(data: Array2<InstanceId>) -> InstanceRaster {
        InstanceRaster { data }
    }

    /// 获取光栅形状 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        let sh = self.data.shape();
        (sh[0], sh[1])
    }

    /// 获取光栅像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 获得 **底层** 数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<InstanceId> {
        self.data.view()
    }

    /// 光栅中出现的所有实例 id, 升序排列, 不含 [`NO_INSTANCE`].
    pub fn visible_ids(&self) -> Vec<InstanceId> {
        let distinct: HashSet<InstanceId> = self
            .data
            .iter()
            .copied()
            .filter(|&id| id != NO_INSTANCE)
            .collect();
        let mut ids: Vec<InstanceId> = distinct.into_iter().collect();
        ids.sort_unstable();
        ids
    }

    /// 值等于 `id` 的像素个数.
    #[inline]
    pub fn pixel_count(&self, id: InstanceId) -> usize {
        self.data.iter().filter(|&&v| v == id).count()
    }

    /// 构造 `id` 对应的二值掩码: 值等于 `id` 的像素为前景, 其余为背景.
    ///
    /// `id` 未在光栅中出现时得到全背景掩码, 不是错误.
    pub fn build_mask(&self, id: InstanceId) -> InstanceMask {
        InstanceMask::from_array(self.data.mapv(|v| {
            if v == id {
                gray::WHITE
            } else {
                gray::BLACK
            }
        }))
    }

    /// 压缩数据.
    pub fn compress(&self) -> CompactRaster {
        let mut buf = Vec::with_capacity(self.size() * 8);
        for v in self.data.iter() {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let mut e = ZlibEncoder::new(Vec::with_capacity(8), Compression::best());
        e.write_all(&buf).expect("Compression error");
        CompactRaster {
            buf: e.finish().expect("Compression error"),
            sh: self.shape(),
        }
    }
}

impl Index<Idx2d> for InstanceRaster {
    type Output = InstanceId;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 压缩存储的 [`InstanceRaster`]; 不透明类型.
///
/// 掩码生成分两阶段读取同一光栅 (统计可见性, 而后物化被选中的掩码),
/// 该类型让光栅在两阶段之间以压缩形式驻留内存, 避免二次磁盘读取.
#[derive(Debug, Clone)]
pub struct CompactRaster {
    /// 压缩的不透明字节流.
    buf: Vec<u8>,

    /// 形状.
    sh: Idx2d,
}

impl CompactRaster {
    /// 解压缩数据.
    pub fn decompress(&self) -> InstanceRaster {
        let (h, w) = self.sh;
        let mut d = ZlibDecoder::new(self.buf.as_slice());
        let mut buf = Vec::with_capacity(h * w * 8);
        d.read_to_end(&mut buf).expect("Decompression error");
        debug_assert_eq!(buf.len(), h * w * 8);
        let elems: Vec<InstanceId> = buf
            .chunks_exact(8)
            .map(|c| InstanceId::from_le_bytes(c.try_into().unwrap()))
            .collect();
        let data = Array2::from_shape_vec((h, w), elems).unwrap();
        InstanceRaster { data }
    }

    /// 压缩后的字节数.
    #[inline]
    pub fn compressed_len(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_raster() -> InstanceRaster {
        InstanceRaster::from_array(array![
            [0, 1001, 1001, 0],
            [0, 1001, 1002, 1002],
            [0, 0, 0, 1002],
        ])
    }

    #[test]
    fn test_visible_ids_sorted_nonzero() {
        let raster = sample_raster();
        assert_eq!(raster.visible_ids(), vec![1001, 1002]);
        assert_eq!(raster.shape(), (3, 4));
    }

    #[test]
    fn test_pixel_count() {
        let raster = sample_raster();
        assert_eq!(raster.pixel_count(1001), 3);
        assert_eq!(raster.pixel_count(1002), 3);
        assert_eq!(raster.pixel_count(9999), 0);
    }

    #[test]
    fn test_build_mask_matches_pixel_count() {
        let raster = sample_raster();
        for id in raster.visible_ids() {
            let mask = raster.build_mask(id);
            assert_eq!(mask.shape(), raster.shape());
            assert_eq!(mask.foreground_len(), raster.pixel_count(id));
        }
    }

    #[test]
    fn test_build_mask_absent_id_is_all_background() {
        let raster = sample_raster();
        let mask = raster.build_mask(4242);
        assert_eq!(mask.foreground_len(), 0);
        assert_eq!(mask.shape(), raster.shape());
    }

    #[test]
    fn test_build_mask_is_deterministic() {
        let raster = sample_raster();
        assert_eq!(raster.build_mask(1001), raster.build_mask(1001));
    }

    #[test]
    fn test_compress_roundtrip() {
        let raster = sample_raster();
        let compact = raster.compress();
        assert_eq!(compact.decompress(), raster);
    }
}
