use std::{fmt, path::Path};

use anyhow::{Result, bail};
use common::remove_symbol_char;
use tracing::info;

use crate::classifier::ClassifiedOutcome;

const EPS: f64 = 1e-8;

/// 评估指标
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub word_acc: f64,
    pub word_acc_ignore_case: f64,
    pub word_acc_ignore_case_symbol: f64,
    pub char_recall: f64,
    pub char_precision: f64,
    /// 1 - 平均归一化编辑距离
    pub one_minus_ned: f64,
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "word_acc: {:.4}, word_acc_ignore_case: {:.4}, word_acc_ignore_case_symbol: {:.4}, char_recall: {:.4}, char_precision: {:.4}, 1-N.E.D: {:.4}",
            self.word_acc,
            self.word_acc_ignore_case,
            self.word_acc_ignore_case_symbol,
            self.char_recall,
            self.char_precision,
            self.one_minus_ned
        )
    }
}

/// 匹配计数
#[derive(Debug, Default)]
struct MatchCount {
    gt_char_num: usize,
    pred_char_num: usize,
    true_positive_char_num: usize,
    gt_word_num: usize,
    match_word_num: usize,
    match_word_ignore_case: usize,
    match_word_ignore_case_symbol: usize,
    norm_ed_sum: f64,
}

/// 在 `a[alo..ahi]` 与 `b[blo..bhi]` 中查找最长公共块, 返回 (i, j, 长度)
///
/// 长度相同时取 `a` 中最靠前的块
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // lengths[j + 1]: 以 a[i - 1], b[j] 结尾的公共块长度
    let mut lengths = vec![0usize; b.len() + 1];
    for i in alo..ahi {
        let mut next = vec![0usize; b.len() + 1];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = lengths[j] + 1;
            next[j + 1] = k;
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        lengths = next;
    }
    (best_i, best_j, best_size)
}

/// 统计两个字符串中匹配的字符数 (所有公共块长度之和)
///
/// # 参数
///
/// * `pred` - 识别结果
/// * `gt` - 真实标签
fn true_positive_char_num(pred: &str, gt: &str) -> usize {
    let a: Vec<char> = pred.chars().collect();
    let b: Vec<char> = gt.chars().collect();
    let mut total = 0;
    let mut queue = vec![((0, a.len()), (0, b.len()))];
    while let Some(((alo, ahi), (blo, bhi))) = queue.pop() {
        let (i, j, k) = longest_match(&a, &b, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            queue.push(((alo, i), (blo, j)));
        }
        if i + k < ahi && j + k < bhi {
            queue.push(((i + k, ahi), (j + k, bhi)));
        }
    }
    total
}

fn count_matches(pred_texts: &[&str], gt_texts: &[&str]) -> MatchCount {
    let mut count = MatchCount::default();
    for (pred_text, gt_text) in pred_texts.iter().zip(gt_texts) {
        if gt_text == pred_text {
            count.match_word_num += 1;
        }
        let gt_text_lower = gt_text.to_lowercase();
        let pred_text_lower = pred_text.to_lowercase();
        if gt_text_lower == pred_text_lower {
            count.match_word_ignore_case += 1;
        }
        let gt_text_lower_ignore = remove_symbol_char(&gt_text_lower);
        let pred_text_lower_ignore = remove_symbol_char(&pred_text_lower);
        if gt_text_lower_ignore == pred_text_lower_ignore {
            count.match_word_ignore_case_symbol += 1;
        }
        count.gt_word_num += 1;

        let gt_len = gt_text_lower_ignore.chars().count();
        let pred_len = pred_text_lower_ignore.chars().count();
        let edit_dist = strsim::levenshtein(&pred_text_lower_ignore, &gt_text_lower_ignore);
        count.norm_ed_sum += edit_dist as f64 / gt_len.max(pred_len).max(1) as f64;

        count.gt_char_num += gt_len;
        count.pred_char_num += pred_len;
        count.true_positive_char_num +=
            true_positive_char_num(&pred_text_lower_ignore, &gt_text_lower_ignore);
    }
    count
}

/// 保留 4 位小数
fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}

/// 计算识别评估指标
///
/// # 参数
///
/// * `pred_texts` - 识别结果列表
/// * `gt_texts` - 真实标签列表, 与识别结果一一对应
pub fn eval_ocr_metric(pred_texts: &[&str], gt_texts: &[&str]) -> Result<EvaluationSummary> {
    if pred_texts.len() != gt_texts.len() {
        bail!(
            "识别结果数量 {} 与真实标签数量 {} 不一致",
            pred_texts.len(),
            gt_texts.len()
        );
    }
    let count = count_matches(pred_texts, gt_texts);
    let ratio = |n: usize, d: usize| round4(n as f64 / (EPS + d as f64));

    Ok(EvaluationSummary {
        word_acc: ratio(count.match_word_num, count.gt_word_num),
        word_acc_ignore_case: ratio(count.match_word_ignore_case, count.gt_word_num),
        word_acc_ignore_case_symbol: ratio(count.match_word_ignore_case_symbol, count.gt_word_num),
        char_recall: ratio(count.true_positive_char_num, count.gt_char_num),
        char_precision: ratio(count.true_positive_char_num, count.pred_char_num),
        one_minus_ned: round4(1.0 - count.norm_ed_sum / count.gt_word_num.max(1) as f64),
    })
}

/// 汇总评估指标
///
/// 仅当所有条目都带有真实标签时计算, 否则返回 `None`. 空清单视为全部带有标签
///
/// # 参数
///
/// * `outcomes` - 按清单顺序排列的评估结果
pub fn aggregate(outcomes: &[ClassifiedOutcome]) -> Result<Option<EvaluationSummary>> {
    let num_gt_label = outcomes.iter().filter(|o| o.entry.has_label()).count();
    if num_gt_label != outcomes.len() {
        return Ok(None);
    }
    let pred_texts: Vec<&str> = outcomes.iter().map(|o| o.result.text.as_str()).collect();
    let gt_texts: Vec<&str> = outcomes
        .iter()
        .map(|o| o.entry.ground_truth_label.as_str())
        .collect();
    eval_ocr_metric(&pred_texts, &gt_texts).map(Some)
}

/// 输出评估指标日志
///
/// # 参数
///
/// * `summary` - 评估指标
/// * `img_root_path` - 图片根目录
/// * `img_list` - 图片清单文件
pub fn log_summary(summary: &EvaluationSummary, img_root_path: &Path, img_list: &Path) {
    info!("\n{}", "-".repeat(100));
    info!(
        "在测试集上评估, 图片根目录: {}, 图片清单: {}",
        img_root_path.display(),
        img_list.display()
    );
    info!("{}", summary);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use ocr::OcrResult;
    use std::path::PathBuf;

    fn outcome(image_path: &str, pred: &str, gt: &str) -> ClassifiedOutcome {
        ClassifiedOutcome {
            entry: ManifestEntry {
                image_path: image_path.to_string(),
                ground_truth_label: gt.to_string(),
            },
            image_path: PathBuf::from(image_path),
            result: OcrResult {
                text: pred.to_string(),
                ..Default::default()
            },
            is_correct: (!gt.is_empty()).then(|| pred == gt),
        }
    }

    #[test]
    fn test_word_acc() {
        let outcomes = vec![outcome("a.jpg", "cat", "cat"), outcome("b.jpg", "fox", "dog")];
        let summary = aggregate(&outcomes).unwrap().unwrap();
        assert_eq!(summary.word_acc, 0.5);
        // fox/dog 仅 'o' 匹配
        assert_eq!(summary.char_recall, 0.6667);
        assert_eq!(summary.char_precision, 0.6667);
        // fox/dog 编辑距离 2, 归一化 2/3
        assert_eq!(summary.one_minus_ned, 0.6667);
    }

    #[test]
    fn test_missing_label_skips_summary() {
        let outcomes = vec![
            outcome("a.jpg", "cat", "cat"),
            outcome("b.jpg", "dog", "dog"),
            outcome("c.jpg", "cow", ""),
        ];
        assert_eq!(aggregate(&outcomes).unwrap(), None);
    }

    #[test]
    fn test_empty_outcomes_summary() {
        let summary = aggregate(&[]).unwrap().unwrap();
        assert_eq!(summary.word_acc, 0.0);
        assert_eq!(summary.char_recall, 0.0);
        assert_eq!(summary.char_precision, 0.0);
        assert_eq!(summary.one_minus_ned, 1.0);
    }

    #[test]
    fn test_ignore_case_and_symbol() {
        let summary = eval_ocr_metric(&["Hello", "it's"], &["hello", "ITS"]).unwrap();
        assert_eq!(summary.word_acc, 0.0);
        assert_eq!(summary.word_acc_ignore_case, 0.5);
        assert_eq!(summary.word_acc_ignore_case_symbol, 1.0);
        assert_eq!(summary.char_recall, 1.0);
        assert_eq!(summary.one_minus_ned, 1.0);
    }

    #[test]
    fn test_char_precision_recall() {
        // 公共块: "ab" + "d"
        assert_eq!(true_positive_char_num("abxd", "abcd"), 3);
        assert_eq!(true_positive_char_num("abc", ""), 0);
        assert_eq!(true_positive_char_num("宗室面具", "宗室的面具"), 4);

        let summary = eval_ocr_metric(&["abxdef"], &["abcd"]).unwrap();
        assert_eq!(summary.char_recall, 0.75);
        assert_eq!(summary.char_precision, 0.5);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(eval_ocr_metric(&["a"], &[]).is_err());
    }

    #[test]
    fn test_display() {
        let summary = eval_ocr_metric(&["cat"], &["cat"]).unwrap();
        assert_eq!(
            summary.to_string(),
            "word_acc: 1.0000, word_acc_ignore_case: 1.0000, word_acc_ignore_case_symbol: 1.0000, char_recall: 1.0000, char_precision: 1.0000, 1-N.E.D: 1.0000"
        );
    }
}
