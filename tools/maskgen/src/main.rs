//! 掩码生成工具.
//!
//! 将逐场景的实例 ID 光栅与标注表连接, 为每个 (标签, 实例) 组挑选
//! 可见像素最多的 top-K 视图, 并把它们物化为二值掩码 PNG.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use scene_berry::consts::{LabelSet, DEFAULT_TOP_K};
use scene_berry::dataset::{self, DatasetLayout};
use scene_berry::pipeline::MaskPass;

/// 从实例 ID 光栅生成逐实例二值掩码.
#[derive(Parser, Debug)]
#[command(name = "maskgen", about = "从逐场景实例 ID 光栅生成 top-K 视图的逐实例掩码")]
struct Args {
    /// 逐场景数据文件目录, 文件主干名即场景 id.
    scene_dir: PathBuf,

    /// 光栅根目录, 其下每个场景一个 `.npy` 文件目录.
    raster_dir: PathBuf,

    /// 掩码输出根目录.
    output_dir: PathBuf,

    /// 使用 "困难物体" 标签词表 (缺省为家具词表).
    #[arg(long)]
    difficult: bool,

    /// 从 top-N 标签元数据文件读取词表 (每行一个标签, 按频次降序),
    /// 优先于预设词表.
    #[arg(long)]
    labels_file: Option<PathBuf>,

    /// 与 `--labels-file` 连用: 取文件前多少行.
    #[arg(long, default_value_t = 10)]
    labels_top: usize,

    /// 每个实例入选的视图数. 可见视图不足该数的实例整组剔除.
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// 数据集根目录 (标注表等).
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

    let labels = match &args.labels_file {
        Some(path) => {
            LabelSet::from_top_file(path, args.labels_top).expect("Label file reading error")
        }
        None => LabelSet::from_preset(args.difficult),
    };

    let scenes =
        dataset::scene_ids_from_blobs(&args.scene_dir).expect("Scene directory listing error");
    log::info!("发现 {} 个场景, 并行度 {}", scenes.len(), utils::cpus());

    let pass = MaskPass::new(&args.raster_dir, layout, &args.output_dir, labels, args.top_k);
    let report = pass.par_run(&scenes);

    utils::sep();
    println!("场景: {} 完成, {} 跳过", report.scenes, report.skipped_scenes);
    println!("图像: {} 跳过", report.skipped_images);
    println!("掩码: {} 写出, {} 失败", report.masks, report.failed_writes);
    utils::sep();
}
