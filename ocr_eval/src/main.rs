use anyhow::{Result, bail};
use model_config::ModelConfig;
use ocr::{ImageVisualizer, PPOcr, RecPreprocess};
use tracing::{error, info};

use crate::{
    args::Args,
    evaluator::{EvalOptions, evaluate},
    log::LogContext,
};

mod args;
mod classifier;
mod error;
mod evaluator;
mod log;
mod manifest;
mod metrics;
mod persister;
mod progress;
mod runner;

/// 程序入口
fn application(args: &Args) -> Result<()> {
    info!("OCR 批量评估开始");

    if !args.img_list.is_file() {
        bail!("图片清单文件 {} 不存在", args.img_list.display());
    }
    if !args.checkpoint.is_file() {
        bail!("模型文件 {} 不存在", args.checkpoint.display());
    }

    // 模型配置, 测试流程只在启动时解析一次
    let config = ModelConfig::load(&args.config)?;
    let preprocess = RecPreprocess::from_pipeline(config.effective_test_pipeline()?);
    let character_dict = config.load_character_dict()?;

    info!("推理设备: {}", args.device);
    let pp_ocr = PPOcr::new(
        &args.checkpoint,
        character_dict,
        preprocess,
        args.device,
        config.model.intra_threads,
    )?;
    let visualizer = ImageVisualizer::default();

    let report = evaluate(&EvalOptions::from(args), &pp_ocr, &visualizer)?;
    info!(
        "共评估 {} 张图片, 其中 {} 张带有真实标签",
        report.outcomes.len(),
        report.num_gt_label
    );
    info!("推理完成, 结果已保存至 {}", args.out_dir.display());
    Ok(())
}

fn main() {
    let args = Args::new();

    let log_context = match LogContext::init(&args.out_dir, args.log_level) {
        Ok(log_context) => log_context,
        Err(e) => {
            eprintln!("初始化日志失败: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("日志文件: {}", log_context.log_file().display());

    let mut code = match application(&args) {
        Ok(_) => {
            info!("程序已执行完毕");
            0
        }
        Err(e) => {
            error!("程序存在异常: {:#}", e);
            1
        }
    };

    if let Err(e) = log_context.finish() {
        eprintln!("{:#}", e);
        code = 1;
    }
    std::process::exit(code);
}
