use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

/// 文本区域
#[derive(Debug, Clone, PartialEq)]
pub struct TextBoundary {
    pub polygon: Vec<(f32, f32)>,
    pub score: f32,
}

/// OCR 结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcrResult {
    pub text: String,
    pub score: Option<f32>,
    pub boundary_result: Option<Vec<TextBoundary>>,
}

/// OCR 接口
pub trait Ocr {
    /// 识别图片中的文字
    ///
    /// # 参数
    ///
    /// * `image` - 待识别的图片
    fn recognize(&self, image: &RgbaImage) -> Result<OcrResult>;

    /// 识别图片文件中的文字
    ///
    /// # 参数
    ///
    /// * `image_path` - 图片文件路径
    fn recognize_path(&self, image_path: &Path) -> Result<OcrResult> {
        let image = image::open(image_path)
            .with_context(|| format!("读取图片 {} 失败", image_path.display()))?
            .to_rgba8();
        self.recognize(&image)
    }
}
