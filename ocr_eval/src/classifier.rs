use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use common::flatten_file_name;
use ocr::{OcrResult, Visualizer};
use tracing::debug;

use crate::{error::EvalError, manifest::ManifestEntry};

/// 可视化图片目录
pub const OUT_VIS_DIR: &str = "out_vis_dir";
/// 识别正确的可视化图片目录
pub const CORRECT_DIR: &str = "correct";
/// 识别错误的可视化图片目录
pub const WRONG_DIR: &str = "wrong";

/// 单张图片的评估结果
#[derive(Debug, Clone)]
pub struct ClassifiedOutcome {
    pub entry: ManifestEntry,
    /// 图片完整路径
    pub image_path: PathBuf,
    pub result: OcrResult,
    /// 无真实标签时为 `None`
    pub is_correct: Option<bool>,
}

/// 输出目录结构
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub out_vis_dir: PathBuf,
    pub correct_dir: PathBuf,
    pub wrong_dir: PathBuf,
}

impl OutputLayout {
    /// 创建输出目录结构, 已存在的目录保持不变
    ///
    /// # 参数
    ///
    /// * `out_dir` - 结果保存目录
    pub fn create(out_dir: &Path) -> Result<Self> {
        let layout = Self {
            out_vis_dir: out_dir.join(OUT_VIS_DIR),
            correct_dir: out_dir.join(CORRECT_DIR),
            wrong_dir: out_dir.join(WRONG_DIR),
        };
        for dir in [&layout.out_vis_dir, &layout.correct_dir, &layout.wrong_dir] {
            fs::create_dir_all(dir).with_context(|| format!("创建目录 {} 失败", dir.display()))?;
        }
        Ok(layout)
    }
}

/// 结果分类器
pub struct ResultClassifier<'a> {
    layout: OutputLayout,
    visualizer: &'a dyn Visualizer,
    show: bool,
}

impl<'a> ResultClassifier<'a> {
    /// 创建结果分类器
    ///
    /// # 参数
    ///
    /// * `layout` - 输出目录结构
    /// * `visualizer` - 可视化器
    /// * `show` - 仅展示, 不保存可视化图片
    pub fn new(layout: OutputLayout, visualizer: &'a dyn Visualizer, show: bool) -> Self {
        Self {
            layout,
            visualizer,
            show,
        }
    }

    /// 比对识别结果与真实标签, 并将可视化图片复制到对应目录
    ///
    /// # 参数
    ///
    /// * `entry` - 清单条目
    /// * `image_path` - 图片完整路径
    /// * `result` - 识别结果
    pub fn classify(
        &self,
        entry: ManifestEntry,
        image_path: PathBuf,
        result: OcrResult,
    ) -> Result<ClassifiedOutcome> {
        let out_img_name = flatten_file_name(&entry.image_path);
        let out_file = self.layout.out_vis_dir.join(&out_img_name);
        self.visualizer.show_result(
            &image_path,
            &result,
            &entry.ground_truth_label,
            (!self.show).then_some(out_file.as_path()),
        )?;

        let is_correct = entry
            .has_label()
            .then(|| entry.ground_truth_label == result.text);

        if let Some(correct) = is_correct {
            let dst_dir = if correct {
                &self.layout.correct_dir
            } else {
                &self.layout.wrong_dir
            };
            if self.show {
                debug!("展示模式不保存可视化图片, 跳过复制 {}", out_img_name);
            } else {
                if !out_file.is_file() {
                    bail!(EvalError::VisualizationMissing(out_file));
                }
                let dst_file = dst_dir.join(&out_img_name);
                fs::copy(&out_file, &dst_file).with_context(|| {
                    format!(
                        "复制可视化图片 {} 到 {} 失败",
                        out_file.display(),
                        dst_file.display()
                    )
                })?;
            }
        }

        Ok(ClassifiedOutcome {
            entry,
            image_path,
            result,
            is_correct,
        })
    }
}
