//! 可见性索引.
//!
//! 将一个场景的标注表与逐图像光栅做连接, 得到 "哪个实例在哪张图像中
//! 可见, 覆盖多少像素" 的记录流. 记录是纯派生数据, 不落盘.

use std::collections::HashSet;

use crate::anno::SceneAnnotation;
use crate::consts::LabelSet;
use crate::{InstanceId, InstanceRaster};

/// 一条可见性记录: 实例 `instance_id` (标签 `label`) 在场景 `scene_id`
/// 的图像 `image` 中可见, 覆盖 `pixel_count` 个像素.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRecord {
    /// 场景 id.
    pub scene_id: String,

    /// 图像主干名 (不含扩展名).
    pub image: String,

    /// 实例 id.
    pub instance_id: InstanceId,

    /// 实例的语义标签.
    pub label: String,

    /// 该实例在该图像中覆盖的像素个数.
    pub pixel_count: usize,
}

/// 计算单张图像的可见实例记录.
///
/// 按词表顺序遍历标签, 对每个标签取 "标注表中该标签的实例 id" 与
/// "光栅中出现的 id" 的交集. 光栅中出现、但标注表未收录的 id
/// 会被静默丢弃 (粗粒度词表的已知效应, 不是错误).
pub fn image_visibility(
    scene_id: &str,
    image: &str,
    raster: &InstanceRaster,
    anno: &SceneAnnotation,
    labels: &LabelSet,
) -> Vec<VisibilityRecord> {
    let visible: HashSet<InstanceId> = raster.visible_ids().into_iter().collect();

    let mut records = Vec::new();
    for label in labels.iter() {
        for id in anno.ids_with_label(label) {
            if visible.contains(&id) {
                records.push(VisibilityRecord {
                    scene_id: scene_id.to_owned(),
                    image: image.to_owned(),
                    instance_id: id,
                    label: label.to_owned(),
                    pixel_count: raster.pixel_count(id),
                });
            }
        }
    }
    records
}

/// 计算整个场景的可见实例记录: 对每张 (图像, 光栅) 调用
/// [`image_visibility`] 并拼接结果.
pub fn scene_visibility(
    scene_id: &str,
    rasters: &[(String, InstanceRaster)],
    anno: &SceneAnnotation,
    labels: &LabelSet,
) -> Vec<VisibilityRecord> {
    let mut records = Vec::new();
    for (image, raster) in rasters {
        records.extend(image_visibility(scene_id, image, raster, anno, labels));
    }
    records
}
