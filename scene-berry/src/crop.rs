//! 照片抠图提取.
//!
//! 把已物化的掩码套用到原始照片上, 得到训练用抠图样本. 位姿配对由
//! [`crate::pipeline::CropPass`] 负责, 本模块只做像素级提取.

use image::RgbImage;

use crate::{InstanceMask, MaskedCrop};

/// 抠图提取的运行时错误.
#[derive(Debug, Clone)]
pub enum CropError {
    /// 照片与掩码的空间尺寸不一致.
    ///
    /// 第一个参数是照片尺寸, 第二个参数是掩码尺寸, 均为 (宽, 高).
    DimensionMismatch((u32, u32), (u32, u32)),
}

/// 将掩码套用到照片上: 前景像素保留照片原值, 其余置为黑色.
///
/// 照片与掩码的空间尺寸必须严格一致, 否则返回
/// [`CropError::DimensionMismatch`]; 调用方应跳过该样本并继续批处理.
pub fn extract_crop(photo: &RgbImage, mask: &InstanceMask) -> Result<MaskedCrop, CropError> {
    let photo_dim = photo.dimensions();
    let (mh, mw) = mask.shape();
    let mask_dim = (mw as u32, mh as u32);
    if photo_dim != mask_dim {
        return Err(CropError::DimensionMismatch(photo_dim, mask_dim));
    }

    // 新图像零初始化, 背景无需显式涂黑.
    let mut out = RgbImage::new(photo_dim.0, photo_dim.1);
    for (x, y, pix) in photo.enumerate_pixels() {
        if mask.is_foreground((y as usize, x as usize)) {
            out.put_pixel(x, y, *pix);
        }
    }
    Ok(MaskedCrop::from_image(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_foreground_kept_background_zeroed() {
        let mut photo = RgbImage::new(2, 2);
        photo.put_pixel(0, 0, image::Rgb([10, 20, 30]));
        photo.put_pixel(1, 0, image::Rgb([40, 50, 60]));
        photo.put_pixel(0, 1, image::Rgb([70, 80, 90]));
        photo.put_pixel(1, 1, image::Rgb([11, 12, 13]));

        let mask = InstanceMask::from_array(array![[255, 0], [0, 255]]);

        let crop = extract_crop(&photo, &mask).unwrap();
        assert_eq!(crop.dimensions(), (2, 2));
        assert_eq!(crop.image().get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(crop.image().get_pixel(1, 0).0, [0, 0, 0]);
        assert_eq!(crop.image().get_pixel(0, 1).0, [0, 0, 0]);
        assert_eq!(crop.image().get_pixel(1, 1).0, [11, 12, 13]);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        // 照片 800x600, 掩码 400x300 (光栅分辨率低于照片分辨率).
        let photo = RgbImage::new(800, 600);
        let mask = InstanceMask::from_array(ndarray::Array2::zeros((300, 400)));

        match extract_crop(&photo, &mask) {
            Err(CropError::DimensionMismatch(photo_dim, mask_dim)) => {
                assert_eq!(photo_dim, (800, 600));
                assert_eq!(mask_dim, (400, 300));
            }
            Ok(_) => panic!("尺寸不一致时不应产出抠图"),
        }
    }
}
