use std::path::PathBuf;

use anyhow::Result;
use checkpoint::{PatchOutcome, patch_checkpoint};
use clap::Parser;
use tracing::{Level, error, info, level_filters::LevelFilter};
use tracing_subscriber::fmt;

/// 为检查点补充推理所需的元数据
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// 输入检查点路径
    input: PathBuf,

    /// 输出路径 (默认在输入文件扩展名前插入 `_patched`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 日志等级 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn application(args: &Args) -> Result<()> {
    match patch_checkpoint(&args.input, args.output.as_deref())? {
        PatchOutcome::Patched(output) => info!("检查点已保存至 {}", output.display()),
        PatchOutcome::Skipped(_) => {}
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    fmt()
        .with_max_level(LevelFilter::from_level(args.log_level))
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .init();

    if let Err(e) = application(&args) {
        error!("修补检查点失败: {:#}", e);
        std::process::exit(1);
    }
}
