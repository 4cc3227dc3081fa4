//! 通用常量与标签词表.

use std::fs;
use std::io;
use std::path::Path;

use crate::InstanceId;

/// 光栅中 "无实例" 像素的保留值.
pub const NO_INSTANCE: InstanceId = 0;

/// 单通道颜色.
pub mod gray {
    /// 掩码背景像素值.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 掩码前景像素值.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是掩码前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        matches!(p, WHITE)
    }

    /// 像素是否是掩码背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        !is_foreground(p)
    }
}

/// top-K 视图筛选的默认 K 值.
pub const DEFAULT_TOP_K: usize = 5;

/// 家具词表. 顺序即词表顺序.
pub const FURNITURE_LABELS: [&str; 10] = [
    "table",
    "chair",
    "office chair",
    "sofa",
    "bed",
    "cabinet",
    "bookshelf",
    "desk",
    "door",
    "monitor",
];

/// "困难物体" 词表, 收录柔软/细薄的实例类别. 顺序即词表顺序.
pub const DIFFICULT_LABELS: [&str; 10] = [
    "pillow",
    "blanket",
    "curtain",
    "towel",
    "clothes",
    "bag",
    "paper",
    "plant",
    "cable",
    "book",
];

/// 语义标签词表. 决定哪些实例参与处理, 元素顺序即遍历顺序.
///
/// 词表是纯数据, 不持有任何文件句柄; 两个编译期预设之外,
/// 也可以从 top-N 标签元数据文件构造.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// 家具词表预设.
    pub fn furniture() -> LabelSet {
        Self::from_labels(FURNITURE_LABELS)
    }

    /// "困难物体" 词表预设.
    pub fn difficult() -> LabelSet {
        Self::from_labels(DIFFICULT_LABELS)
    }

    /// 按布尔开关选择预设. `true` 为困难词表, `false` 为家具词表.
    #[inline]
    pub fn from_preset(difficult: bool) -> LabelSet {
        if difficult {
            Self::difficult()
        } else {
            Self::furniture()
        }
    }

    /// 从任意字符串序列构造词表. 空白会被裁剪, 空行被忽略.
    pub fn from_labels<I, S>(labels: I) -> LabelSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        LabelSet {
            labels: labels
                .into_iter()
                .map(|s| s.as_ref().trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// 从 top-N 标签元数据文件 (每行一个标签, 按频次降序) 读取前 `n` 行.
    pub fn from_top_file<P: AsRef<Path>>(path: P, n: usize) -> io::Result<LabelSet> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_labels(content.lines().take(n)))
    }

    /// 按词表顺序迭代标签.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// 词表是否收录 `label`?
    #[inline]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// `label` 在词表中的位次. 未收录时返回 `None`.
    #[inline]
    pub fn rank(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// 词表大小.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 词表是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// id 是否为 "无实例" 保留值?
#[inline]
pub const fn is_no_instance(id: InstanceId) -> bool {
    id == NO_INSTANCE
}
