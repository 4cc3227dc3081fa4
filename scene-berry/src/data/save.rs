//! 图像的持久化存储.

use std::path::Path;

use image::{GrayImage, ImageResult, RgbImage};
use once_cell::sync::Lazy;

use crate::consts::NO_INSTANCE;
use crate::{InstanceMask, InstanceRaster, MaskedCrop};

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
///
/// `ImgWriteRaw` trait 的意图是, 图像将按原样保存, 不做任何像素映射.
/// 适用于掩码这类像素值本身即有意义的图像.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好" 的方式保存,
/// 而不是 "as is" 的方式. 对于 [`InstanceRaster`] 这类以大整数实例 id
/// 存储的光栅, 保存时会把每个 id 映射到肉眼较易区分的伪彩色.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 按原样存储. 前景/背景分别为白色/黑色.
impl ImgWriteRaw for InstanceMask {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.array_view().indexed_iter() {
            buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
        }
        buf.save(path)
    }
}

/// 按原样存储.
impl ImgWriteRaw for MaskedCrop {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image().save(path)
    }
}

const PALETTE_LEN: usize = 61;

/// 可视化调色板. 素数大小, 降低相邻 id 撞色的概率.
static PALETTE: Lazy<Vec<[u8; 3]>> = Lazy::new(|| {
    (0..PALETTE_LEN as u32)
        .map(|i| {
            [
                (i.wrapping_mul(97) % 200 + 55) as u8,
                (i.wrapping_mul(53) % 200 + 55) as u8,
                (i.wrapping_mul(151) % 200 + 55) as u8,
            ]
        })
        .collect()
});

/// 会将 "无实例" 像素映射为黑色, 其余实例 id 映射为调色板伪彩色.
impl ImgWriteVis for InstanceRaster {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = RgbImage::new(width as u32, height as u32);
        for ((h, w), &id) in self.array_view().indexed_iter() {
            let rgb = if id == NO_INSTANCE {
                [0, 0, 0]
            } else {
                PALETTE[id.rem_euclid(PALETTE_LEN as i64) as usize]
            };
            buf.put_pixel(w as u32, h as u32, image::Rgb(rgb));
        }
        buf.save(path)
    }
}
