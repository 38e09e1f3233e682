use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_hollow_polygon_mut, draw_hollow_rect_mut},
    point::Point,
    rect::Rect,
};
use tracing::{debug, info};

use crate::ocr::OcrResult;

const COLOR_CORRECT: Rgb<u8> = Rgb([0, 200, 0]);
const COLOR_WRONG: Rgb<u8> = Rgb([220, 0, 0]);
const COLOR_UNLABELED: Rgb<u8> = Rgb([128, 128, 128]);
const COLOR_BOUNDARY: Rgb<u8> = Rgb([0, 120, 255]);

/// 识别结果可视化接口
pub trait Visualizer {
    /// 绘制识别结果
    ///
    /// `out_file` 为空时仅展示结果, 不写入文件
    ///
    /// # 参数
    ///
    /// * `image_path` - 原始图片路径
    /// * `result` - 识别结果
    /// * `gt_label` - 真实标签, 为空表示无标签
    /// * `out_file` - 输出文件路径
    fn show_result(
        &self,
        image_path: &Path,
        result: &OcrResult,
        gt_label: &str,
        out_file: Option<&Path>,
    ) -> Result<()>;
}

/// 基于图片文件的可视化实现
///
/// 绘制文本区域, 并以边框颜色标明识别是否正确
#[derive(Debug, Clone)]
pub struct ImageVisualizer {
    frame_width: u32,
}

impl Default for ImageVisualizer {
    fn default() -> Self {
        Self { frame_width: 3 }
    }
}

impl ImageVisualizer {
    pub fn new(frame_width: u32) -> Self {
        Self { frame_width }
    }

    fn frame_color(result: &OcrResult, gt_label: &str) -> Rgb<u8> {
        if gt_label.is_empty() {
            COLOR_UNLABELED
        } else if gt_label == result.text {
            COLOR_CORRECT
        } else {
            COLOR_WRONG
        }
    }

    /// 在图像上绘制识别结果
    ///
    /// # 参数
    ///
    /// * `image` - 待绘制的图像
    /// * `result` - 识别结果
    /// * `gt_label` - 真实标签
    pub fn draw(&self, image: &mut RgbImage, result: &OcrResult, gt_label: &str) {
        for boundary in result.boundary_result.iter().flatten() {
            if boundary.polygon.len() < 2 {
                continue;
            }
            let points: Vec<Point<f32>> = boundary
                .polygon
                .iter()
                .map(|&(x, y)| Point::new(x, y))
                .collect();
            draw_hollow_polygon_mut(image, &points, COLOR_BOUNDARY);
        }

        let (width, height) = image.dimensions();
        let color = Self::frame_color(result, gt_label);
        for i in 0..self.frame_width.min(width / 2).min(height / 2) {
            let rect = Rect::at(i as i32, i as i32).of_size(width - 2 * i, height - 2 * i);
            draw_hollow_rect_mut(image, rect, color);
        }
    }
}

impl Visualizer for ImageVisualizer {
    fn show_result(
        &self,
        image_path: &Path,
        result: &OcrResult,
        gt_label: &str,
        out_file: Option<&Path>,
    ) -> Result<()> {
        let Some(out_file) = out_file else {
            info!(
                "{}: 识别结果 '{}', 真实标签 '{}'",
                image_path.display(),
                result.text,
                gt_label
            );
            return Ok(());
        };

        let mut image = image::open(image_path)
            .with_context(|| format!("读取图片 {} 失败", image_path.display()))?
            .to_rgb8();
        self.draw(&mut image, result, gt_label);
        image
            .save(out_file)
            .with_context(|| format!("保存可视化图片 {} 失败", out_file.display()))?;
        debug!("可视化图片已保存: {}", out_file.display());
        Ok(())
    }
}
