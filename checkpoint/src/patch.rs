use std::{
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use common::insert_file_suffix;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::CheckpointError;

/// 默认输出文件后缀
pub const PATCHED_SUFFIX: &str = "_patched";
/// 元数据键
pub const META_KEY: &str = "meta";

/// 检查点内容
pub type Checkpoint = Map<String, Value>;

/// 修补结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// 已写入输出文件
    Patched(PathBuf),
    /// 输出文件已存在, 跳过
    Skipped(PathBuf),
}

/// 默认输出路径, 在扩展名前插入 `_patched`
///
/// # 参数
///
/// * `input` - 输入检查点路径
pub fn default_output_path(input: &Path) -> Result<PathBuf> {
    insert_file_suffix(input, PATCHED_SUFFIX)
}

/// 读取检查点
///
/// # 参数
///
/// * `path` - 检查点路径
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint> {
    let data = fs::read(path).with_context(|| format!("读取检查点 {} 失败", path.display()))?;
    let value: Value = serde_json::from_slice(&data)
        .with_context(|| format!("解析检查点 {} 失败", path.display()))?;
    match value {
        Value::Object(checkpoint) => Ok(checkpoint),
        _ => bail!(CheckpointError::NotMapping(path.to_path_buf())),
    }
}

/// 保存检查点, 输出文件必须不存在
///
/// # 参数
///
/// * `path` - 输出路径
/// * `checkpoint` - 检查点内容
pub fn save_checkpoint(path: &Path, checkpoint: &Checkpoint) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("创建检查点 {} 失败", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, checkpoint)
        .with_context(|| format!("写入检查点 {} 失败", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("写入检查点 {} 失败", path.display()))?;
    Ok(())
}

/// 缺少元数据时补充默认值 `{"CLASSES": "text"}`
///
/// 返回是否进行了修补
///
/// # 参数
///
/// * `checkpoint` - 检查点内容
pub fn patch_meta(checkpoint: &mut Checkpoint) -> bool {
    if checkpoint.contains_key(META_KEY) {
        return false;
    }
    checkpoint.insert(META_KEY.to_string(), json!({ "CLASSES": "text" }));
    true
}

/// 修补检查点以用于推理
///
/// # 参数
///
/// * `input` - 输入检查点路径
/// * `output` - 输出路径, 为空时使用默认输出路径
pub fn patch_checkpoint(input: &Path, output: Option<&Path>) -> Result<PatchOutcome> {
    if !input.is_file() {
        bail!(CheckpointError::NotFound(input.to_path_buf()));
    }

    let output = match output {
        Some(output) => output.to_path_buf(),
        None => default_output_path(input)?,
    };

    if output.is_file() {
        info!(
            "跳过输入:\n\t{}\n因为输出已存在:\n\t{}",
            input.display(),
            output.display()
        );
        return Ok(PatchOutcome::Skipped(output));
    }

    let mut checkpoint = load_checkpoint(input)?;
    if patch_meta(&mut checkpoint) {
        debug!("检查点 {} 缺少元数据, 已补充默认值", input.display());
    }
    save_checkpoint(&output, &checkpoint)?;

    Ok(PatchOutcome::Patched(output))
}
