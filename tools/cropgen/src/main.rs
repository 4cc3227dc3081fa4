//! 抠图提取工具.
//!
//! 消费 `maskgen` 物化的掩码目录树, 把每个掩码套用到对应的原始照片上,
//! 产出抠图样本和配对的相机位姿.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use scene_berry::dataset::{self, DatasetLayout};
use scene_berry::pipeline::CropPass;

/// 从掩码与原始照片生成抠图训练样本.
#[derive(Parser, Debug)]
#[command(name = "cropgen", about = "将掩码套用到原始照片, 产出抠图样本与相机位姿")]
struct Args {
    /// 掩码根目录 (`maskgen` 的输出), 其下每个场景一个子目录.
    masks_dir: PathBuf,

    /// 抠图输出根目录.
    output_dir: PathBuf,

    /// 数据集根目录 (原始照片与位姿表).
    /// 缺省时取 `$SCANNETPP_DATA_DIR` 或 `$HOME/dataset/scannetpp/data`.
    #[arg(long)]
    data_root: Option<PathBuf>,
}

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .expect("Logger init error");

    let args = Args::parse();
    let layout = match args.data_root {
        Some(root) => DatasetLayout::new(root),
        None => utils::loader::layout_from_env_or_home(),
    };

    let scenes = dataset::scene_ids(&args.masks_dir).expect("Mask directory listing error");
    log::info!("发现 {} 个场景, 并行度 {}", scenes.len(), utils::cpus());

    let pass = CropPass::new(&args.masks_dir, layout, &args.output_dir);
    let report = pass.par_run(&scenes);

    utils::sep();
    println!("场景: {} 完成, {} 跳过", report.scenes, report.skipped_scenes);
    println!("样本: {} 写出, {} 跳过", report.crops, report.skipped_samples);
    println!("位姿: {} 缺失", report.missing_poses);
    utils::sep();
}
