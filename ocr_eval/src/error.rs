use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("清单文件 {} 第 {line} 行格式错误: 缺少图片路径", .path.display())]
    ManifestFormat { path: PathBuf, line: usize },
    #[error("图片不存在: {}", .0.display())]
    ImageNotFound(PathBuf),
    #[error("可视化图片未生成: {}", .0.display())]
    VisualizationMissing(PathBuf),
}
