use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use ocr::{Ocr, OcrResult};
use tracing::debug;

use crate::{error::EvalError, manifest::ManifestEntry, progress::ProgressBar};

/// 推理执行器
pub struct InferenceRunner<'a> {
    ocr: &'a dyn Ocr,
    img_root: &'a Path,
    progress: ProgressBar,
}

impl<'a> InferenceRunner<'a> {
    /// 创建推理执行器
    ///
    /// # 参数
    ///
    /// * `ocr` - 文字识别器
    /// * `img_root` - 图片根目录
    /// * `progress` - 进度条
    pub fn new(ocr: &'a dyn Ocr, img_root: &'a Path, progress: ProgressBar) -> Self {
        Self {
            ocr,
            img_root,
            progress,
        }
    }

    /// 识别清单条目对应的图片, 返回图片完整路径与识别结果
    ///
    /// 图片不存在时立即返回错误, 不重试也不跳过
    ///
    /// # 参数
    ///
    /// * `entry` - 清单条目
    pub fn run(&mut self, entry: &ManifestEntry) -> Result<(PathBuf, OcrResult)> {
        self.progress.update();
        let image_path = self.img_root.join(&entry.image_path);
        if !image_path.exists() {
            bail!(EvalError::ImageNotFound(image_path));
        }
        let result = self.ocr.recognize_path(&image_path)?;
        debug!("{}: {:?}", image_path.display(), result);
        Ok((image_path, result))
    }

    /// 已处理数量
    pub fn processed(&self) -> usize {
        self.progress.completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use image::RgbaImage;
    use std::{cell::Cell, fs};

    /// 以文件名作为识别结果
    struct FileNameOcr {
        calls: Cell<usize>,
    }

    impl Ocr for FileNameOcr {
        fn recognize(&self, _image: &RgbaImage) -> Result<OcrResult> {
            Err(anyhow!("不应解码图片"))
        }

        fn recognize_path(&self, image_path: &Path) -> Result<OcrResult> {
            self.calls.set(self.calls.get() + 1);
            Ok(OcrResult {
                text: image_path.file_stem().unwrap().to_string_lossy().to_string(),
                ..Default::default()
            })
        }
    }

    fn entry(image_path: &str) -> ManifestEntry {
        ManifestEntry {
            image_path: image_path.to_string(),
            ground_truth_label: String::new(),
        }
    }

    #[test]
    fn test_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("word")).unwrap();
        fs::write(dir.path().join("word/cat.jpg"), b"").unwrap();

        let ocr = FileNameOcr { calls: Cell::new(0) };
        let mut runner = InferenceRunner::new(&ocr, dir.path(), ProgressBar::new(1));
        let (image_path, result) = runner.run(&entry("word/cat.jpg")).unwrap();

        assert_eq!(image_path, dir.path().join("word/cat.jpg"));
        assert_eq!(result.text, "cat");
        assert_eq!(runner.processed(), 1);
    }

    #[test]
    fn test_image_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = FileNameOcr { calls: Cell::new(0) };
        let mut runner = InferenceRunner::new(&ocr, dir.path(), ProgressBar::new(1));

        let err = runner.run(&entry("missing.jpg")).unwrap_err();
        match err.downcast_ref::<EvalError>() {
            Some(EvalError::ImageNotFound(path)) => {
                assert_eq!(path, &dir.path().join("missing.jpg"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(ocr.calls.get(), 0);
        assert_eq!(runner.processed(), 1);
    }
}
