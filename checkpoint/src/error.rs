use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("检查点文件不存在: {}", .0.display())]
    NotFound(PathBuf),
    #[error("检查点文件 {} 不是键值映射", .0.display())]
    NotMapping(PathBuf),
}
