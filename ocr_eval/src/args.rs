use std::path::PathBuf;

use clap::Parser;
use ocr::Device;
use tracing::Level;

/// OCR 批量评估工具: 对清单中的图片逐一识别, 并与真实标签比对
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// 图片根目录
    #[arg(long = "img_root_path")]
    pub img_root_path: PathBuf,

    /// 图片清单文件, 每行: <相对图片路径> [真实标签]
    #[arg(long = "img_list")]
    pub img_list: PathBuf,

    /// 模型配置文件
    #[arg(long)]
    pub config: PathBuf,

    /// 模型文件
    #[arg(long)]
    pub checkpoint: PathBuf,

    /// 结果保存目录
    #[arg(long = "out_dir", default_value = "./results")]
    pub out_dir: PathBuf,

    /// 仅展示识别结果, 不保存可视化图片
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// 推理设备 (cpu, cuda, cuda:<id>)
    #[arg(long, default_value = "cpu")]
    pub device: Device,

    /// 日志等级 (trace, debug, info, warn, error)
    #[arg(long = "log_level", default_value = "info")]
    pub log_level: Level,
}

impl Args {
    /// 创建命令行参数解析器
    pub fn new() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "ocr_eval",
            "--img_root_path",
            "data/imgs",
            "--img_list",
            "data/list.txt",
            "--config",
            "configs/crnn.yaml",
            "--checkpoint",
            "checkpoints/crnn.onnx",
            "--device",
            "cuda:1",
        ])
        .unwrap();
        assert_eq!(args.img_root_path, PathBuf::from("data/imgs"));
        assert_eq!(args.out_dir, PathBuf::from("./results"));
        assert!(!args.show);
        assert_eq!(args.device, Device::Cuda(1));
        assert_eq!(args.log_level, Level::INFO);
    }

    #[test]
    fn test_missing_required_args() {
        assert!(Args::try_parse_from(["ocr_eval", "--show"]).is_err());
    }
}
