use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::PipelineStep;

/// 组合数据集类型, 测试流程取自第一个子数据集
pub const CONCAT_DATASET: &str = "ConcatDataset";

fn default_intra_threads() -> usize {
    4
}

/// 识别模型配置
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone)]
pub struct RecognizerConfig {
    #[schemars(title = "字典文件路径 (相对于配置文件)")]
    pub character_dict: String,
    #[schemars(title = "推理线程数")]
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

/// 数据集配置
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone)]
pub struct DatasetConfig {
    #[schemars(title = "数据集类型")]
    #[serde(rename = "type")]
    pub dataset_type: String,
    #[schemars(title = "数据处理流程")]
    #[serde(default)]
    pub pipeline: Option<Vec<PipelineStep>>,
    #[schemars(title = "子数据集 (仅组合数据集)")]
    #[serde(default)]
    pub datasets: Option<Vec<DatasetConfig>>,
}

impl DatasetConfig {
    /// 解析实际生效的数据处理流程
    ///
    /// 组合数据集使用第一个子数据集的流程, 其余数据集使用自身的流程
    pub fn resolve_pipeline(&self) -> Result<&[PipelineStep]> {
        if self.dataset_type == CONCAT_DATASET {
            let first = self
                .datasets
                .as_ref()
                .and_then(|datasets| datasets.first())
                .ok_or_else(|| anyhow!("组合数据集缺少子数据集配置"))?;
            return first.resolve_pipeline();
        }
        self.pipeline
            .as_deref()
            .ok_or_else(|| anyhow!("数据集 {} 缺少数据处理流程配置", self.dataset_type))
    }
}

/// 数据配置
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone)]
pub struct DataConfig {
    #[schemars(title = "测试数据集")]
    pub test: DatasetConfig,
}

/// 模型配置文件
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone)]
pub struct ModelConfig {
    #[schemars(title = "识别模型")]
    pub model: RecognizerConfig,
    #[schemars(title = "数据")]
    pub data: DataConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ModelConfig {
    /// 通过文件名加载模型配置
    ///
    /// # 参数
    ///
    /// * `config_file` - 配置文件路径
    pub fn load(config_file: &Path) -> Result<Self> {
        let config_data = fs::read(config_file)
            .with_context(|| format!("读取模型配置文件 {} 失败", config_file.display()))?;
        let mut config = serde_yaml::from_slice::<ModelConfig>(config_data.as_slice())
            .context("解析模型配置文件失败, 请检查格式是否正确")?;
        config.base_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        debug!("模型配置加载成功: {:?}", config);
        Ok(config)
    }

    /// 实际生效的测试数据处理流程
    pub fn effective_test_pipeline(&self) -> Result<&[PipelineStep]> {
        self.data.test.resolve_pipeline()
    }

    /// 字典文件路径
    pub fn character_dict_path(&self) -> PathBuf {
        self.base_dir.join(&self.model.character_dict)
    }

    /// 加载字典, 每行一个字符
    pub fn load_character_dict(&self) -> Result<Vec<String>> {
        let dict_path = self.character_dict_path();
        let content = fs::read_to_string(&dict_path)
            .with_context(|| format!("读取字典文件 {} 失败", dict_path.display()))?;
        let character_dict: Vec<String> = content.lines().map(String::from).collect();
        if character_dict.is_empty() {
            bail!("字典文件 {} 为空", dict_path.display());
        }
        Ok(character_dict)
    }
}
