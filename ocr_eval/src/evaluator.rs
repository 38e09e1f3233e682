use std::path::PathBuf;

use anyhow::Result;
use ocr::{Ocr, Visualizer};
use tracing::{debug, info};

use crate::{
    args::Args,
    classifier::{ClassifiedOutcome, OutputLayout, ResultClassifier},
    manifest::{ManifestReader, count_lines},
    metrics::{EvaluationSummary, aggregate, log_summary},
    persister::save_results,
    progress::ProgressBar,
    runner::InferenceRunner,
};

/// 评估参数
#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub img_root_path: PathBuf,
    pub img_list: PathBuf,
    pub out_dir: PathBuf,
    pub show: bool,
}

impl From<&Args> for EvalOptions {
    fn from(args: &Args) -> Self {
        Self {
            img_root_path: args.img_root_path.clone(),
            img_list: args.img_list.clone(),
            out_dir: args.out_dir.clone(),
            show: args.show,
        }
    }
}

/// 评估报告
#[derive(Debug)]
pub struct EvalReport {
    pub outcomes: Vec<ClassifiedOutcome>,
    pub num_gt_label: usize,
    pub summary: Option<EvaluationSummary>,
}

/// 批量评估清单中的图片
///
/// 逐一识别并分类, 全部完成后保存结果, 所有条目都带有真实标签时计算评估指标
///
/// # 参数
///
/// * `options` - 评估参数
/// * `ocr` - 文字识别器
/// * `visualizer` - 可视化器
pub fn evaluate(
    options: &EvalOptions,
    ocr: &dyn Ocr,
    visualizer: &dyn Visualizer,
) -> Result<EvalReport> {
    let layout = OutputLayout::create(&options.out_dir)?;
    let total = count_lines(&options.img_list)?;
    info!("清单 {} 共 {} 行", options.img_list.display(), total);

    let mut runner = InferenceRunner::new(ocr, &options.img_root_path, ProgressBar::new(total));
    let classifier = ResultClassifier::new(layout, visualizer, options.show);

    let mut outcomes = Vec::with_capacity(total);
    for entry in ManifestReader::open(&options.img_list)? {
        let entry = entry?;
        let (image_path, result) = runner.run(&entry)?;
        outcomes.push(classifier.classify(entry, image_path, result)?);
    }
    debug!("推理结束, 共处理 {} 条清单条目", runner.processed());

    save_results(&outcomes, &options.out_dir)?;

    let num_gt_label = outcomes.iter().filter(|o| o.entry.has_label()).count();
    let summary = aggregate(&outcomes)?;
    if let Some(summary) = &summary {
        log_summary(summary, &options.img_root_path, &options.img_list);
    }

    Ok(EvalReport {
        outcomes,
        num_gt_label,
        summary,
    })
}
