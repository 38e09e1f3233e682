use std::{cell::RefCell, path::Path};

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use ndarray::ArrayView3;
use ort::{
    session::{Session, SessionOutputs, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use tracing::debug;

use crate::{
    Device, RecPreprocess,
    ocr::{Ocr, OcrResult},
};

/// CTC 空白字符索引
const BLANK_INDEX: usize = 0;

/// 基于 PaddleOCR 识别模型的 OCR 实现
pub struct PPOcr {
    session: RefCell<Session>,
    character_dict: Vec<String>,
    preprocess: RecPreprocess,
}

impl PPOcr {
    /// 创建 PPOcr 实例
    ///
    /// # 参数
    ///
    /// * `checkpoint` - ONNX 模型文件
    /// * `character_dict` - 字典
    /// * `preprocess` - 预处理参数
    /// * `device` - 推理设备
    /// * `intra_threads` - 推理线程数
    pub fn new(
        checkpoint: &Path,
        character_dict: Vec<String>,
        preprocess: RecPreprocess,
        device: Device,
        intra_threads: usize,
    ) -> Result<PPOcr> {
        let builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?;
        let builder = match device {
            Device::Cpu => builder,
            #[cfg(feature = "cuda")]
            Device::Cuda(device_id) => builder.with_execution_providers([
                ort::execution_providers::CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])?,
            #[cfg(not(feature = "cuda"))]
            Device::Cuda(device_id) => {
                return Err(anyhow!(
                    "设备 cuda:{} 不可用, 请启用 cuda 特性重新编译",
                    device_id
                ));
            }
        };
        let session = builder
            .commit_from_file(checkpoint)
            .with_context(|| format!("加载模型 {} 失败", checkpoint.display()))?;

        debug!("识别模型加载成功: {}, 设备: {}", checkpoint.display(), device);

        Ok(PPOcr {
            session: RefCell::new(session),
            character_dict,
            preprocess,
        })
    }

    /// 处理模型输出
    ///
    /// # 参数
    ///
    /// * `outputs` - 模型输出
    fn handle_session_outputs(&self, outputs: &SessionOutputs) -> Result<OcrResult> {
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        ctc_decode(output_shape, output_data, &self.character_dict)
    }
}

/// CTC 贪心解码
///
/// 每一步取概率最大的字符, 合并连续重复并去除空白字符
///
/// # 参数
///
/// * `output_shape` - 输出形状 (batch, seq_len, num_classes)
/// * `output_data` - 输出数据
/// * `character_dict` - 字典 (不含空白字符)
pub fn ctc_decode(
    output_shape: &[i64],
    output_data: &[f32],
    character_dict: &[String],
) -> Result<OcrResult> {
    if output_shape.len() != 3 {
        return Err(anyhow!("意想不到的输出形状: {:?}", output_shape));
    }

    let batch_size_out = output_shape[0] as usize;
    let seq_len = output_shape[1] as usize;
    let num_classes = output_shape[2] as usize;
    let expected_len = batch_size_out * seq_len * num_classes;

    if batch_size_out == 0 || output_data.len() != expected_len {
        return Err(anyhow!("意想不到的输出长度: {}", output_data.len()));
    }

    let array_view = ArrayView3::from_shape((batch_size_out, seq_len, num_classes), output_data)
        .map_err(|e| anyhow!("转换输出到数组视图失败: {}", e))?;
    let preds = array_view.index_axis(ndarray::Axis(0), 0);

    let mut sequence = Vec::with_capacity(seq_len);
    for row in preds.outer_iter() {
        if let Some((idx, prob)) = row
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        {
            sequence.push((idx, prob));
        }
    }

    let mut text = String::new();
    let mut filtered_prob = Vec::new();
    for (i, &(idx, prob)) in sequence.iter().enumerate() {
        if (i > 0 && idx == sequence[i - 1].0) || idx == BLANK_INDEX {
            continue;
        }
        let character = character_dict
            .get(idx - 1)
            .ok_or_else(|| anyhow!("字符索引 {} 超出字典范围", idx))?;
        text.push_str(character);
        filtered_prob.push(prob);
    }

    if filtered_prob.is_empty() {
        return Ok(OcrResult {
            text: String::new(),
            score: Some(0.0),
            boundary_result: None,
        });
    }

    let text = text.trim().to_string();
    let score = filtered_prob.iter().sum::<f32>() / filtered_prob.len() as f32;

    debug!("识别结果: {}, 置信度: {}", text, score);

    Ok(OcrResult {
        text,
        score: Some(score),
        boundary_result: None,
    })
}

impl Ocr for PPOcr {
    /// 识别图像中的文本
    ///
    /// # 参数
    ///
    /// * `image` - 输入图像
    fn recognize(&self, image: &RgbaImage) -> Result<OcrResult> {
        let tensor = self.preprocess.to_tensor(image);
        let tensor = TensorRef::from_array_view(tensor.view())?;
        let mut session = self.session.borrow_mut();
        let outputs = session.run(ort::inputs![tensor])?;
        self.handle_session_outputs(&outputs)
    }
}
