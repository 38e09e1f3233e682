use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 测试数据处理步骤
///
/// 仅识别推理需要的步骤, 其余步骤统一解析为 [`PipelineStep::Unsupported`] 并忽略
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum PipelineStep {
    #[schemars(title = "读取图片")]
    LoadImageFromFile,
    #[schemars(title = "文字识别缩放")]
    #[serde(rename = "ResizeOCR")]
    ResizeOcr {
        #[schemars(title = "目标高度")]
        height: u32,
        #[schemars(title = "最小宽度")]
        min_width: Option<u32>,
        #[schemars(title = "最大宽度")]
        max_width: Option<u32>,
    },
    #[schemars(title = "归一化")]
    Normalize {
        #[schemars(title = "均值 (0~1)")]
        mean: [f32; 3],
        #[schemars(title = "标准差 (0~1)")]
        std: [f32; 3],
    },
    #[schemars(title = "不支持的步骤")]
    #[serde(other)]
    Unsupported,
}
