//! 照片抠图.

use image::RgbImage;

/// 一张照片套用掩码后的抠图: 前景像素保留原值, 其余像素置零.
/// 分辨率与原始照片一致.
///
/// `MaskedCrop` 只提供到底层图像的轻量转换, 构造统一走
/// [`crate::crop::extract_crop`].
#[derive(Debug, Clone)]
pub struct MaskedCrop {
    data: RgbImage,
}

impl MaskedCrop {
    /// 从已抠好的图像直接构造.
    #[inline]
    pub(crate) fn from_image(data: RgbImage) -> MaskedCrop {
        MaskedCrop { data }
    }

    /// 图像尺寸 (宽, 高).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.data.dimensions()
    }

    /// 获得底层图像引用.
    #[inline]
    pub fn image(&self) -> &RgbImage {
        &self.data
    }

    /// 直接获得底层图像.
    #[inline]
    pub fn into_image(self) -> RgbImage {
        self.data
    }
}
