use image::{
    RgbaImage,
    imageops::{self, FilterType},
};
use model_config::PipelineStep;
use ndarray::{Array, Array4};
use tracing::debug;

/// 识别模型预处理参数
#[derive(Debug, Clone, PartialEq)]
pub struct RecPreprocess {
    pub height: u32,
    pub min_width: Option<u32>,
    pub max_width: Option<u32>,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for RecPreprocess {
    fn default() -> Self {
        Self {
            height: 48,
            min_width: None,
            max_width: None,
            mean: [0.0; 3],
            std: [1.0; 3],
        }
    }
}

impl RecPreprocess {
    /// 通过测试数据处理流程生成预处理参数
    ///
    /// # 参数
    ///
    /// * `pipeline` - 已解析的测试数据处理流程
    pub fn from_pipeline(pipeline: &[PipelineStep]) -> Self {
        let mut preprocess = Self::default();
        for step in pipeline {
            match step {
                PipelineStep::ResizeOcr {
                    height,
                    min_width,
                    max_width,
                } => {
                    preprocess.height = *height;
                    preprocess.min_width = *min_width;
                    preprocess.max_width = *max_width;
                }
                PipelineStep::Normalize { mean, std } => {
                    preprocess.mean = *mean;
                    preprocess.std = *std;
                }
                PipelineStep::LoadImageFromFile | PipelineStep::Unsupported => {}
            }
        }
        debug!("识别预处理参数: {:?}", preprocess);
        preprocess
    }

    /// 保持宽高比计算缩放后的宽度
    fn target_width(&self, width: u32, height: u32) -> u32 {
        let mut target_width =
            ((width as f32 / height.max(1) as f32) * self.height as f32).ceil() as u32;
        if let Some(min_width) = self.min_width {
            target_width = target_width.max(min_width);
        }
        if let Some(max_width) = self.max_width {
            target_width = target_width.min(max_width);
        }
        target_width.max(1)
    }

    /// 将图像转换为张量数组数据 (1, 3, H, W)
    ///
    /// # 参数
    ///
    /// * `image` - 输入图像
    pub fn to_tensor(&self, image: &RgbaImage) -> Array4<f32> {
        let (width, height) = image.dimensions();
        let target_width = self.target_width(width, height);

        let resized_image =
            imageops::resize(image, target_width, self.height, FilterType::Triangle);
        let mut input = Array::zeros((1, 3, self.height as usize, target_width as usize));

        for (x, y, pixel) in resized_image.enumerate_pixels() {
            for channel in 0..3 {
                let value = pixel.0[channel] as f32 / 255.0;
                input[[0, channel, y as usize, x as usize]] =
                    (value - self.mean[channel]) / self.std[channel];
            }
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_from_pipeline() {
        let pipeline = vec![
            PipelineStep::LoadImageFromFile,
            PipelineStep::ResizeOcr {
                height: 32,
                min_width: Some(16),
                max_width: Some(64),
            },
            PipelineStep::Normalize {
                mean: [0.5; 3],
                std: [0.5; 3],
            },
            PipelineStep::Unsupported,
        ];
        let preprocess = RecPreprocess::from_pipeline(&pipeline);
        assert_eq!(preprocess.height, 32);
        assert_eq!(preprocess.min_width, Some(16));
        assert_eq!(preprocess.max_width, Some(64));
        assert_eq!(preprocess.mean, [0.5; 3]);
    }

    #[test]
    fn test_target_width_clamp() {
        let preprocess = RecPreprocess {
            height: 32,
            min_width: Some(16),
            max_width: Some(64),
            ..Default::default()
        };
        assert_eq!(preprocess.target_width(100, 100), 32);
        assert_eq!(preprocess.target_width(10, 100), 16);
        assert_eq!(preprocess.target_width(1000, 100), 64);
    }

    #[test]
    fn test_target_width_round_up() {
        let preprocess = RecPreprocess {
            height: 32,
            ..Default::default()
        };
        // 50 / 30 * 32 = 53.33
        assert_eq!(preprocess.target_width(50, 30), 54);
        // 41 / 40 * 32 = 32.8
        assert_eq!(preprocess.target_width(41, 40), 33);
        assert_eq!(preprocess.target_width(40, 40), 32);
    }

    #[test]
    fn test_to_tensor() {
        let preprocess = RecPreprocess {
            height: 8,
            mean: [0.5; 3],
            std: [0.5; 3],
            ..Default::default()
        };
        let image = RgbaImage::from_pixel(20, 10, Rgba([255, 0, 255, 255]));
        let tensor = preprocess.to_tensor(&image);

        assert_eq!(tensor.shape(), &[1, 3, 8, 16]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 4, 4]] + 1.0).abs() < 1e-6);
    }
}
