//! 二值实例掩码.

use std::ops::Index;
use std::path::Path;

use image::{GrayImage, ImageResult};
use ndarray::{Array2, ArrayView2};

use crate::consts::gray;
use crate::Idx2d;

/// 一个实例在一张光栅中的足迹: 前景为 [`gray::WHITE`], 背景为 [`gray::BLACK`],
/// 形状与来源光栅一致.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceMask {
    data: Array2<u8>,
}

impl InstanceMask {
    /// 从内存数组直接构造掩码. 像素值应只含 0 和 255.
    #[inline]
    pub fn from_array(data: Array2<u8>) -> InstanceMask {
        InstanceMask { data }
    }

    /// 从单通道图像构造掩码.
    ///
    /// 只有严格等于 255 的像素算前景, 其余一律归为背景.
    pub fn from_gray_image(img: &GrayImage) -> InstanceMask {
        let (w, h) = img.dimensions();
        let data = Array2::from_shape_vec(
            (h as usize, w as usize),
            img.as_raw()
                .iter()
                .map(|&p| {
                    if gray::is_foreground(p) {
                        gray::WHITE
                    } else {
                        gray::BLACK
                    }
                })
                .collect(),
        )
        .unwrap();
        InstanceMask { data }
    }

    /// 从 PNG 文件读取掩码. 像素按 [`InstanceMask::from_gray_image`] 规则二值化.
    pub fn open<P: AsRef<Path>>(path: P) -> ImageResult<InstanceMask> {
        let img = image::open(path)?.to_luma8();
        Ok(Self::from_gray_image(&img))
    }

    /// 获取掩码形状 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        let sh = self.data.shape();
        (sh[0], sh[1])
    }

    /// 获取掩码像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 获得 **底层** 数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<u8> {
        self.data.view()
    }

    /// 前景像素个数.
    #[inline]
    pub fn foreground_len(&self) -> usize {
        self.data.iter().filter(|&&p| gray::is_foreground(p)).count()
    }

    /// 给定位置是否为前景? 越界时返回 `false`.
    #[inline]
    pub fn is_foreground(&self, pos: Idx2d) -> bool {
        self.data.get(pos).copied().is_some_and(gray::is_foreground)
    }
}

impl Index<Idx2d> for InstanceMask {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_foreground_len() {
        let mask = InstanceMask::from_array(array![[0, 255], [255, 0]]);
        assert_eq!(mask.foreground_len(), 2);
        assert!(mask.is_foreground((0, 1)));
        assert!(!mask.is_foreground((0, 0)));
        assert!(!mask.is_foreground((9, 9)));
    }

    #[test]
    fn test_from_gray_image_binarizes_strictly() {
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(0, 0, image::Luma([255]));
        img.put_pixel(1, 0, image::Luma([254]));
        img.put_pixel(0, 1, image::Luma([1]));

        let mask = InstanceMask::from_gray_image(&img);
        assert_eq!(mask.shape(), (2, 2));
        assert_eq!(mask.foreground_len(), 1);
        assert_eq!(mask[(0, 0)], 255);
        assert_eq!(mask[(0, 1)], 0);
    }
}
