//! 掩码生成 pass.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use log::{error, info, warn};

use super::mask_file_name;
use crate::anno::SceneAnnotation;
use crate::consts::LabelSet;
use crate::dataset::{raster_loader, DatasetLayout};
use crate::ranking::select_top_k;
use crate::visibility::image_visibility;
use crate::{CompactRaster, ImgWriteRaw, InstanceId};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 掩码生成统计.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaskReport {
    /// 完整处理的场景数.
    pub scenes: usize,

    /// 整场景跳过数 (标注表或光栅目录不可用).
    pub skipped_scenes: usize,

    /// 单图像跳过数 (光栅读取失败).
    pub skipped_images: usize,

    /// 掩码写出失败数.
    pub failed_writes: usize,

    /// 成功写出的掩码数.
    pub masks: usize,
}

impl MaskReport {
    /// 合并两份统计.
    pub fn merged(self, other: MaskReport) -> MaskReport {
        MaskReport {
            scenes: self.scenes + other.scenes,
            skipped_scenes: self.skipped_scenes + other.skipped_scenes,
            skipped_images: self.skipped_images + other.skipped_images,
            failed_writes: self.failed_writes + other.failed_writes,
            masks: self.masks + other.masks,
        }
    }
}

/// 掩码生成 pass: 可见性统计 -> top-K 视图筛选 -> 掩码物化.
///
/// 所有路径与调节项在构造时注入, 不依赖任何写死的全局路径.
///
/// 每个场景分两阶段处理: 第一阶段流式读取光栅, 统计可见性并把光栅以
/// 压缩形式缓存在内存; 第二阶段只对入选视图解压光栅并写出掩码,
/// 每张光栅最多解压一次.
#[derive(Debug)]
pub struct MaskPass {
    raster_root: PathBuf,
    layout: DatasetLayout,
    output_root: PathBuf,
    labels: LabelSet,
    top_k: usize,
}

impl MaskPass {
    /// 构造掩码生成 pass.
    ///
    /// `raster_root` 下应有逐场景的光栅目录; `layout` 提供标注表位置;
    /// 掩码写出到 `{output_root}/{scene_id}/` 下.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        raster_root: P,
        layout: DatasetLayout,
        output_root: Q,
        labels: LabelSet,
        top_k: usize,
    ) -> MaskPass {
        MaskPass {
            raster_root: raster_root.into(),
            layout,
            output_root: output_root.into(),
            labels,
            top_k,
        }
    }

    /// 顺序处理给定场景.
    pub fn run(&self, scenes: &[String]) -> MaskReport {
        scenes
            .iter()
            .map(|s| self.run_scene(s))
            .fold(MaskReport::default(), MaskReport::merged)
    }

    /// 借助 `rayon`, 并行处理给定场景. 场景间无共享可变状态,
    /// 输出路径按场景划分互不相交.
    #[cfg(feature = "rayon")]
    pub fn par_run(&self, scenes: &[String]) -> MaskReport {
        scenes
            .par_iter()
            .map(|s| self.run_scene(s))
            .reduce(MaskReport::default, MaskReport::merged)
    }

    /// 处理单个场景. 任何失败都不会越过场景边界向外传播.
    pub fn run_scene(&self, scene_id: &str) -> MaskReport {
        let mut report = MaskReport::default();

        let anno = match SceneAnnotation::open(self.layout.anno_path(scene_id)) {
            Ok(anno) => anno,
            Err(e) => {
                warn!("场景 {scene_id}: 标注表不可用, 整场景跳过: {e:?}");
                report.skipped_scenes = 1;
                return report;
            }
        };

        let raster_dir = self.raster_root.join(scene_id);
        if !raster_dir.is_dir() {
            warn!(
                "场景 {scene_id}: 光栅目录 {} 不存在, 整场景跳过",
                raster_dir.display()
            );
            report.skipped_scenes = 1;
            return report;
        }

        // 第一阶段: 统计可见性, 同时以压缩形式缓存光栅.
        let mut cache: HashMap<String, CompactRaster> = HashMap::new();
        let mut records = Vec::new();
        for (stem, loaded) in raster_loader(&raster_dir) {
            match loaded {
                Ok(raster) => {
                    records.extend(image_visibility(
                        scene_id,
                        &stem,
                        &raster,
                        &anno,
                        &self.labels,
                    ));
                    cache.insert(stem, raster.compress());
                }
                Err(e) => {
                    warn!("场景 {scene_id}: 图像 {stem} 光栅读取失败, 已跳过: {e:?}");
                    report.skipped_images += 1;
                }
            }
        }

        let ranked = select_top_k(records, self.top_k);

        // 第二阶段: 入选视图按图像归并, 每张光栅只解压一次.
        let mut by_image: BTreeMap<&str, Vec<(&str, InstanceId)>> = BTreeMap::new();
        for ((label, id), views) in &ranked {
            for rec in views {
                by_image
                    .entry(rec.image.as_str())
                    .or_default()
                    .push((label.as_str(), *id));
            }
        }

        let scene_out = self.output_root.join(scene_id);
        if let Err(e) = fs::create_dir_all(&scene_out) {
            error!(
                "场景 {scene_id}: 创建输出目录 {} 失败: {e:?}",
                scene_out.display()
            );
            report.skipped_scenes = 1;
            return report;
        }

        for (image, instances) in by_image {
            // 入选记录必然来自第一阶段缓存过的光栅.
            let raster = cache[image].decompress();
            for (label, id) in instances {
                let mask = raster.build_mask(id);
                let path = scene_out.join(mask_file_name(image, label, id));
                match mask.save_raw(&path) {
                    Ok(()) => report.masks += 1,
                    Err(e) => {
                        error!(
                            "场景 {scene_id}: 掩码 {} 写出失败: {e:?}",
                            path.display()
                        );
                        report.failed_writes += 1;
                    }
                }
            }
        }

        info!(
            "场景 {scene_id}: {} 个实例组入选, 写出 {} 个掩码",
            ranked.len(),
            report.masks
        );
        report.scenes = 1;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstanceMask;
    use ndarray::Array2;
    use ndarray_npy::write_npy;
    use std::path::Path;

    /// 造一个 4x4 光栅, 前 `n` 个像素为 `id`, 其余为背景.
    fn raster_with(id: InstanceId, n: usize) -> Array2<i64> {
        Array2::from_shape_fn((4, 4), |(h, w)| if h * 4 + w < n { id } else { 0 })
    }

    fn write_scene(raster_root: &Path, data_root: &Path, scene_id: &str) {
        let scene_rasters = raster_root.join(scene_id);
        std::fs::create_dir_all(&scene_rasters).unwrap();

        // IMG1: 1001 覆盖 5 像素; IMG2: 1001 覆盖 9 像素.
        write_npy(scene_rasters.join("IMG1.npy"), &raster_with(1001, 5)).unwrap();
        let mut img2 = raster_with(1001, 9);
        img2[(3, 2)] = 1002;
        img2[(3, 3)] = 1002;
        write_npy(scene_rasters.join("IMG2.npy"), &img2).unwrap();

        let scans = data_root.join(scene_id).join("scans");
        std::fs::create_dir_all(&scans).unwrap();
        std::fs::write(
            scans.join("segments_anno.json"),
            r#"{"segGroups": [
                {"id": 1001, "label": "chair"},
                {"id": 1002, "label": "table"}
            ]}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_mask_pass_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let raster_root = dir.path().join("rasters");
        let data_root = dir.path().join("data");
        let output_root = dir.path().join("masks");
        write_scene(&raster_root, &data_root, "abc123");

        let pass = MaskPass::new(
            &raster_root,
            DatasetLayout::new(&data_root),
            &output_root,
            LabelSet::from_labels(["chair", "table"]),
            1,
        );

        // "zzz" 无标注表, 应整场景跳过且不影响 "abc123".
        let report = pass.run(&["abc123".to_owned(), "zzz".to_owned()]);
        assert_eq!(report.scenes, 1);
        assert_eq!(report.skipped_scenes, 1);
        assert_eq!(report.masks, 2);

        // k=1: chair 组取覆盖更大的 IMG2; table 组大小 1 >= 1, 同样入选.
        let chair = output_root.join("abc123").join("IMG2_chair_1001.png");
        let table = output_root.join("abc123").join("IMG2_table_1002.png");
        assert!(chair.is_file());
        assert!(table.is_file());
        assert!(!output_root.join("abc123").join("IMG1_chair_1001.png").exists());

        // 掩码前景数等于可见性统计的像素数.
        assert_eq!(InstanceMask::open(&chair).unwrap().foreground_len(), 9);
        assert_eq!(InstanceMask::open(&table).unwrap().foreground_len(), 2);
    }

    #[test]
    fn test_groups_below_k_emit_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let raster_root = dir.path().join("rasters");
        let data_root = dir.path().join("data");
        let output_root = dir.path().join("masks");
        write_scene(&raster_root, &data_root, "abc123");

        let pass = MaskPass::new(
            &raster_root,
            DatasetLayout::new(&data_root),
            &output_root,
            LabelSet::from_labels(["chair", "table"]),
            5,
        );

        // 所有组的可见视图都不足 5 张, 整组剔除.
        let report = pass.run(&["abc123".to_owned()]);
        assert_eq!(report.scenes, 1);
        assert_eq!(report.masks, 0);
    }

    #[test]
    fn test_corrupt_raster_skips_image_only() {
        let dir = tempfile::tempdir().unwrap();
        let raster_root = dir.path().join("rasters");
        let data_root = dir.path().join("data");
        let output_root = dir.path().join("masks");
        write_scene(&raster_root, &data_root, "abc123");
        std::fs::write(raster_root.join("abc123").join("BAD.npy"), b"junk").unwrap();

        let pass = MaskPass::new(
            &raster_root,
            DatasetLayout::new(&data_root),
            &output_root,
            LabelSet::from_labels(["chair", "table"]),
            1,
        );

        let report = pass.run(&["abc123".to_owned()]);
        assert_eq!(report.scenes, 1);
        assert_eq!(report.skipped_images, 1);
        assert_eq!(report.masks, 2);
    }
}
