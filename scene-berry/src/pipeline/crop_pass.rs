//! 抠图提取 pass.

use std::fs;
use std::path::PathBuf;

use log::{error, info, warn};
use ndarray_npy::write_npy;

use super::parse_mask_file_name;
use crate::crop::{extract_crop, CropError};
use crate::dataset::DatasetLayout;
use crate::pose::PoseTable;
use crate::{ImgWriteRaw, InstanceMask};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 抠图提取统计.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CropReport {
    /// 完整处理的场景数.
    pub scenes: usize,

    /// 整场景跳过数 (掩码目录不可用).
    pub skipped_scenes: usize,

    /// 单样本跳过数 (照片/掩码读取失败, 尺寸不符, 文件名不合约定).
    pub skipped_samples: usize,

    /// 成功写出的抠图样本数.
    pub crops: usize,

    /// 位姿缺失的样本数 (抠图已写出, 位姿文件省略).
    pub missing_poses: usize,
}

impl CropReport {
    /// 合并两份统计.
    pub fn merged(self, other: CropReport) -> CropReport {
        CropReport {
            scenes: self.scenes + other.scenes,
            skipped_scenes: self.skipped_scenes + other.skipped_scenes,
            skipped_samples: self.skipped_samples + other.skipped_samples,
            crops: self.crops + other.crops,
            missing_poses: self.missing_poses + other.missing_poses,
        }
    }
}

/// 抠图提取 pass: 已物化的掩码 + 原始照片 -> 抠图样本 + 相机位姿.
///
/// 消费 [`super::MaskPass`] 的输出目录树. 每个样本产出同名的
/// `{stem}.png` (抠图) 和 `{stem}.npy` (4×4 位姿), 放在
/// `{output_root}/{scene_id}_{label}_{instance_id}/` 下.
#[derive(Debug)]
pub struct CropPass {
    mask_root: PathBuf,
    layout: DatasetLayout,
    output_root: PathBuf,
}

impl CropPass {
    /// 构造抠图提取 pass.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        mask_root: P,
        layout: DatasetLayout,
        output_root: Q,
    ) -> CropPass {
        CropPass {
            mask_root: mask_root.into(),
            layout,
            output_root: output_root.into(),
        }
    }

    /// 顺序处理给定场景.
    pub fn run(&self, scenes: &[String]) -> CropReport {
        scenes
            .iter()
            .map(|s| self.run_scene(s))
            .fold(CropReport::default(), CropReport::merged)
    }

    /// 借助 `rayon`, 并行处理给定场景.
    #[cfg(feature = "rayon")]
    pub fn par_run(&self, scenes: &[String]) -> CropReport {
        scenes
            .par_iter()
            .map(|s| self.run_scene(s))
            .reduce(CropReport::default, CropReport::merged)
    }

    /// 处理单个场景的所有掩码. 任何失败都不会越过场景边界向外传播.
    pub fn run_scene(&self, scene_id: &str) -> CropReport {
        let mut report = CropReport::default();

        let mask_dir = self.mask_root.join(scene_id);
        let mut mask_names: Vec<String> = match fs::read_dir(&mask_dir) {
            Ok(entries) => entries
                .filter_map(|e| {
                    let p = e.ok()?.path();
                    if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("png") {
                        Some(p.file_name()?.to_str()?.to_owned())
                    } else {
                        None
                    }
                })
                .collect(),
            Err(e) => {
                warn!(
                    "场景 {scene_id}: 掩码目录 {} 不可读, 整场景跳过: {e:?}",
                    mask_dir.display()
                );
                report.skipped_scenes = 1;
                return report;
            }
        };
        mask_names.sort_unstable();

        // 位姿表整体缺失时降级为 "所有样本均无位姿", 不中断场景.
        let poses = match PoseTable::open(self.layout.transforms_path(scene_id)) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!("场景 {scene_id}: 位姿表不可用, 所有样本将不带位姿: {e:?}");
                None
            }
        };

        for name in &mask_names {
            let Some((image, label, id)) = parse_mask_file_name(name) else {
                warn!("场景 {scene_id}: 掩码文件名 {name} 不合约定, 已跳过");
                report.skipped_samples += 1;
                continue;
            };

            let photo_path = self.layout.photo_path(scene_id, &image);
            let photo = match image::open(&photo_path) {
                Ok(img) => img.to_rgb8(),
                Err(e) => {
                    warn!(
                        "场景 {scene_id}: 实例 {id} 的照片 {} 读取失败, 已跳过: {e:?}",
                        photo_path.display()
                    );
                    report.skipped_samples += 1;
                    continue;
                }
            };

            let mask = match InstanceMask::open(mask_dir.join(name)) {
                Ok(mask) => mask,
                Err(e) => {
                    warn!("场景 {scene_id}: 掩码 {name} 读取失败, 已跳过: {e:?}");
                    report.skipped_samples += 1;
                    continue;
                }
            };

            let crop = match extract_crop(&photo, &mask) {
                Ok(crop) => crop,
                Err(CropError::DimensionMismatch(photo_dim, mask_dim)) => {
                    error!(
                        "场景 {scene_id}: 图像 {image} 实例 {id} 照片 {photo_dim:?} 与掩码 \
                         {mask_dim:?} 尺寸不符, 已跳过"
                    );
                    report.skipped_samples += 1;
                    continue;
                }
            };

            let out_dir = self.output_root.join(format!("{scene_id}_{label}_{id}"));
            if let Err(e) = fs::create_dir_all(&out_dir) {
                error!(
                    "场景 {scene_id}: 创建输出目录 {} 失败, 已跳过: {e:?}",
                    out_dir.display()
                );
                report.skipped_samples += 1;
                continue;
            }

            let crop_path = out_dir.join(format!("{image}.png"));
            if let Err(e) = crop.save_raw(&crop_path) {
                error!(
                    "场景 {scene_id}: 抠图 {} 写出失败, 已跳过: {e:?}",
                    crop_path.display()
                );
                report.skipped_samples += 1;
                continue;
            }
            report.crops += 1;

            // 抠图落盘之后才写位姿, 不会出现只有位姿没有抠图的残片.
            match poses.as_ref().and_then(|t| t.pose_for(&image)) {
                Some(pose) => {
                    let pose_path = out_dir.join(format!("{image}.npy"));
                    if let Err(e) = write_npy(&pose_path, &pose) {
                        error!(
                            "场景 {scene_id}: 位姿 {} 写出失败: {e:?}",
                            pose_path.display()
                        );
                        report.missing_poses += 1;
                    }
                }
                None => {
                    warn!("场景 {scene_id}: 图像 {image} 无匹配位姿, 仅写出抠图");
                    report.missing_poses += 1;
                }
            }
        }

        info!(
            "场景 {scene_id}: {} 个掩码产出 {} 个抠图样本",
            mask_names.len(),
            report.crops
        );
        report.scenes = 1;
        report
    }
}
