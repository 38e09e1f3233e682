use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::classifier::ClassifiedOutcome;

/// 全部结果文件
pub const RESULTS_FILE: &str = "results.txt";
/// 识别正确结果文件
pub const CORRECT_FILE: &str = "correct.txt";
/// 识别错误结果文件
pub const WRONG_FILE: &str = "wrong.txt";

/// 结果文件写入器
struct ResultWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ResultWriter {
    fn create(path: PathBuf) -> Result<Self> {
        let file =
            File::create(&path).with_context(|| format!("创建结果文件 {} 失败", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)
            .with_context(|| format!("写入结果文件 {} 失败", self.path.display()))
    }

    /// 刷新缓冲区, 写入失败时返回错误而不是在析构时忽略
    fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("写入结果文件 {} 失败", self.path.display()))
    }
}

/// 结果行: `<图片路径> <识别结果> <真实标签>`
///
/// # 参数
///
/// * `outcome` - 单张图片的评估结果
pub fn result_line(outcome: &ClassifiedOutcome) -> String {
    format!(
        "{} {} {}",
        outcome.image_path.display(),
        outcome.result.text,
        outcome.entry.ground_truth_label
    )
}

/// 保存评估结果
///
/// 全部推理结束后一次性写入, 行顺序与清单一致
///
/// # 参数
///
/// * `outcomes` - 按清单顺序排列的评估结果
/// * `res_dir` - 结果保存目录
pub fn save_results(outcomes: &[ClassifiedOutcome], res_dir: &Path) -> Result<()> {
    let mut results = ResultWriter::create(res_dir.join(RESULTS_FILE))?;
    let mut correct = ResultWriter::create(res_dir.join(CORRECT_FILE))?;
    let mut wrong = ResultWriter::create(res_dir.join(WRONG_FILE))?;

    for outcome in outcomes {
        let line = result_line(outcome);
        results.write_line(&line)?;
        match outcome.is_correct {
            Some(true) => correct.write_line(&line)?,
            Some(false) => wrong.write_line(&line)?,
            None => {}
        }
    }

    results.finish()?;
    correct.finish()?;
    wrong.finish()?;
    Ok(())
}
