//! 批处理管线.
//!
//! 数据集后处理的两道工序, 各自是一个参数化 pass:
//!
//! - [`MaskPass`]: 可见性统计 -> top-K 视图筛选 -> 掩码物化.
//! - [`CropPass`]: 掩码 + 原始照片 -> 抠图样本 + 相机位姿.
//!
//! 失败隔离策略: 失败只影响它发生的最小单元. 标注表缺失跳过场景,
//! 光栅损坏跳过图像, 尺寸不符跳过样本, 位姿缺失只省略位姿文件.
//! 每次跳过都带着 (场景, 图像, 实例) 上下文写入日志, 便于独立诊断与重跑.
//!
//! 场景之间没有共享可变状态, 输出路径按场景划分互不相交, 因此两个 pass
//! 都提供按场景并行的 `par_run` 版本.

use crate::InstanceId;

mod crop_pass;
mod mask_pass;

pub use crop_pass::{CropPass, CropReport};
pub use mask_pass::{MaskPass, MaskReport};

/// 将标签转义为文件名安全形式: 空格写成 `-`.
///
/// 词表标签可能含空格 (如 "office chair"), 但不会含下划线,
/// 因此 `_` 可以安全地用作文件名分隔符.
#[inline]
pub fn sanitize_label(label: &str) -> String {
    label.replace(' ', "-")
}

/// 掩码文件名: `{图像主干名}_{标签}_{实例 id}.png`.
pub fn mask_file_name(image: &str, label: &str, id: InstanceId) -> String {
    format!("{image}_{}_{id}.png", sanitize_label(label))
}

/// 解析掩码文件名, 返回 (图像主干名, 标签, 实例 id).
///
/// 从右往左拆分, 因此图像主干名自身可以包含 `_` (如 `frame_000123`).
/// 不符合约定的文件名返回 `None`.
pub fn parse_mask_file_name(name: &str) -> Option<(String, String, InstanceId)> {
    let stem = name.strip_suffix(".png")?;
    let mut fields = stem.rsplitn(3, '_');
    let id: InstanceId = fields.next()?.parse().ok()?;
    let label = fields.next()?.to_owned();
    let image = fields.next()?.to_owned();
    if image.is_empty() || label.is_empty() {
        return None;
    }
    Some((image, label, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_file_name_roundtrip() {
        let name = mask_file_name("DSC00633", "chair", 1001);
        assert_eq!(name, "DSC00633_chair_1001.png");
        assert_eq!(
            parse_mask_file_name(&name),
            Some(("DSC00633".to_owned(), "chair".to_owned(), 1001))
        );
    }

    #[test]
    fn test_label_with_space_is_sanitized() {
        let name = mask_file_name("DSC00633", "office chair", 1001);
        assert_eq!(name, "DSC00633_office-chair_1001.png");
        let (image, label, id) = parse_mask_file_name(&name).unwrap();
        assert_eq!(image, "DSC00633");
        assert_eq!(label, "office-chair");
        assert_eq!(id, 1001);
    }

    #[test]
    fn test_image_stem_may_contain_underscore() {
        let name = mask_file_name("frame_000123", "pillow", 7);
        let (image, label, id) = parse_mask_file_name(&name).unwrap();
        assert_eq!(image, "frame_000123");
        assert_eq!(label, "pillow");
        assert_eq!(id, 7);
    }

    #[test]
    fn test_malformed_names_are_rejected() {
        assert_eq!(parse_mask_file_name("whatever.png"), None);
        assert_eq!(parse_mask_file_name("a_b_notanumber.png"), None);
        assert_eq!(parse_mask_file_name("IMG1_chair_1001.jpg"), None);
        assert_eq!(parse_mask_file_name("_chair_1001.png"), None);
    }
}
