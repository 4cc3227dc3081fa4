//! 场景标注表.
//!
//! 对应磁盘上每个场景的 `segments_anno.json`, 只取其中的 `segGroups`
//! 部分: 实例 id 到语义标签的映射.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::InstanceId;

/// 标注表中的一个 segment group: 一个物理实例及其语义标签.
///
/// 原始文件中还携带网格 segment 索引等字段, 本库不消费它们.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SegGroup {
    /// 实例 id. 场景内唯一.
    pub id: InstanceId,

    /// 语义标签.
    pub label: String,
}

/// 打开标注表错误.
#[derive(Debug)]
pub enum AnnoError {
    /// 标注表文件不存在.
    NotFound(PathBuf),

    /// 其他底层 I/O 错误.
    IoError(std::io::Error),

    /// json 解析错误.
    JsonError(serde_json::Error),
}

/// `segments_anno.json` 的顶层结构. 只反序列化需要的字段.
#[derive(Debug, Deserialize)]
struct SegmentsAnno {
    #[serde(rename = "segGroups", default)]
    seg_groups: Vec<SegGroup>,
}

/// 一个场景的实例标注表.
#[derive(Debug, Clone)]
pub struct SceneAnnotation {
    groups: Vec<SegGroup>,
}

impl SceneAnnotation {
    /// 从 `segments_anno.json` 读取标注表.
    ///
    /// 文件不存在时返回 [`AnnoError::NotFound`], 调用方据此跳过整个场景.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SceneAnnotation, AnnoError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AnnoError::NotFound(path.to_owned()));
        }
        let content = fs::read_to_string(path).map_err(AnnoError::IoError)?;
        Self::from_json_str(&content).map_err(AnnoError::JsonError)
    }

    /// 从 json 字符串解析标注表.
    pub fn from_json_str(content: &str) -> Result<SceneAnnotation, serde_json::Error> {
        let anno: SegmentsAnno = serde_json::from_str(content)?;
        Ok(SceneAnnotation {
            groups: anno.seg_groups,
        })
    }

    /// 从内存中的 segment groups 直接构造标注表.
    #[inline]
    pub fn from_groups(groups: Vec<SegGroup>) -> SceneAnnotation {
        SceneAnnotation { groups }
    }

    /// 标签为 `label` 的所有实例 id, 按标注表顺序.
    pub fn ids_with_label(&self, label: &str) -> Vec<InstanceId> {
        self.groups
            .iter()
            .filter(|g| g.label == label)
            .map(|g| g.id)
            .collect()
    }

    /// 实例 `id` 的语义标签. 未标注时返回 `None`.
    pub fn label_of(&self, id: InstanceId) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.label.as_str())
    }

    /// 获取全部 segment groups.
    #[inline]
    pub fn groups(&self) -> &[SegGroup] {
        &self.groups
    }

    /// 实例个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// 标注表是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "sceneId": "abc123",
        "segGroups": [
            {"id": 1001, "label": "chair", "objectId": 1, "segments": [3, 4]},
            {"id": 1002, "label": "table", "objectId": 2, "segments": [9]},
            {"id": 1003, "label": "chair", "objectId": 3, "segments": [11]}
        ]
    }"#;

    #[test]
    fn test_parse_ignores_extra_fields() {
        let anno = SceneAnnotation::from_json_str(SAMPLE).unwrap();
        assert_eq!(anno.len(), 3);
        assert_eq!(anno.ids_with_label("chair"), vec![1001, 1003]);
        assert_eq!(anno.ids_with_label("table"), vec![1002]);
        assert!(anno.ids_with_label("sofa").is_empty());
    }

    #[test]
    fn test_label_of() {
        let anno = SceneAnnotation::from_json_str(SAMPLE).unwrap();
        assert_eq!(anno.label_of(1002), Some("table"));
        assert_eq!(anno.label_of(4242), None);
    }

    #[test]
    fn test_missing_seg_groups_is_empty() {
        let anno = SceneAnnotation::from_json_str("{}").unwrap();
        assert!(anno.is_empty());
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("scans").join("segments_anno.json");
        match SceneAnnotation::open(&missing) {
            Err(AnnoError::NotFound(p)) => assert_eq!(p, missing),
            other => panic!("期望 NotFound, 实际为 {other:?}"),
        }
    }
}
