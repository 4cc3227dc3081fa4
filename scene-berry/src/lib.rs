#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 将 ScanNet++ 风格数据集的逐像素实例 ID 光栅转换为逐实例二值掩码,
//! 并为每个实例挑选可见度最高的视图, 最终从原始照片抠取训练样本.
//!
//! 处理流程 (自底向上):
//!
//! 1. 标注表 ([`anno`]) 与光栅 ([`InstanceRaster`]) 联合, 得到每张图像的可见实例
//!    及像素数 ([`visibility`]).
//! 2. 对每个 (label, instance) 组按可见像素数排序, 选出 top-K 视图 ([`ranking`]).
//! 3. 被选中的 (图像, 实例) 对物化为二值掩码 PNG ([`pipeline::MaskPass`]).
//! 4. 掩码套用到原始照片上, 产生抠图样本与对应相机位姿
//!    ([`crop`], [`pipeline::CropPass`]).
//!
//! # 注意
//!
//! 1. 该 crate 只消费预先算好的实例 ID 光栅和标注元数据, 不负责渲染或重建.
//! 2. 场景之间完全独立, 任何单场景的数据缺失都不会中断整个批次.
//!    单图像/单样本的失败只跳过其自身. 细节见 [`pipeline`].
//!
//! # 开发计划
//!
//! ### 可见性索引与 top-K 视图筛选 ✅
//!
//! 实现位于 `scene-berry/src/visibility.rs` 和 `scene-berry/src/ranking.rs`.
//!
//! ### 掩码物化与压缩光栅缓存 ✅
//!
//! 两阶段掩码生成: 第一阶段统计可见性并以 zlib 压缩形式缓存光栅,
//! 第二阶段只对选中的视图解压并写出掩码.
//!
//! 实现位于 `scene-berry/src/data` 和 `scene-berry/src/pipeline/mask_pass.rs`.
//!
//! ### 照片抠图与相机位姿配对 ✅
//!
//! 实现位于 `scene-berry/src/crop.rs` 和 `scene-berry/src/pipeline/crop_pass.rs`.
//!
//! ### 标签词表预设 ✅
//!
//! 家具词表与 "困难物体" 词表, 以及从元数据文件读取 top-N 标签.
//!
//! 实现位于 `scene-berry/src/consts.rs`.
//!
//! ### 完善代码文档 ✅
//!
//! 给每个 public API 提供文档, 并视情况给 private API 提供文档.

/// 二维索引 (高, 宽), 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 实例 ID 的底层整数类型. 与光栅 `.npy` 文件的元素类型一致.
pub type InstanceId = i64;

pub mod consts;

/// 光栅/掩码/抠图基础数据结构.
mod data;

pub use data::{CompactRaster, ImgWriteRaw, ImgWriteVis, InstanceMask, InstanceRaster, MaskedCrop};

pub mod anno;
pub mod crop;
pub mod dataset;
pub mod pipeline;
pub mod pose;
pub mod prelude;
pub mod ranking;
pub mod visibility;
