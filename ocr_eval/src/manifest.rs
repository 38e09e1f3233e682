use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::error::EvalError;

/// 清单条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 相对于图片根目录的路径
    pub image_path: String,
    /// 真实标签, 为空表示无标签
    pub ground_truth_label: String,
}

impl ManifestEntry {
    /// 解析清单行, 空行返回 `None`
    ///
    /// # 参数
    ///
    /// * `line` - 清单行
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let image_path = tokens.next()?.to_string();
        let ground_truth_label = tokens.next().unwrap_or_default().to_string();
        Some(Self {
            image_path,
            ground_truth_label,
        })
    }

    /// 是否带有真实标签
    pub fn has_label(&self) -> bool {
        !self.ground_truth_label.is_empty()
    }
}

/// 清单读取器, 逐行惰性解析
pub struct ManifestReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl ManifestReader {
    /// 打开清单文件
    ///
    /// # 参数
    ///
    /// * `path` - 清单文件路径
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("打开清单文件 {} 失败", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for ManifestReader {
    type Item = Result<ManifestEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_no += 1;
        let entry = line
            .with_context(|| format!("读取清单文件 {} 失败", self.path.display()))
            .and_then(|line| {
                ManifestEntry::parse(&line).ok_or_else(|| {
                    EvalError::ManifestFormat {
                        path: self.path.clone(),
                        line: self.line_no,
                    }
                    .into()
                })
            });
        Some(entry)
    }
}

/// 统计清单行数
///
/// # 参数
///
/// * `path` - 清单文件路径
pub fn count_lines(path: &Path) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("打开清单文件 {} 失败", path.display()))?;
    let mut count = 0;
    for line in BufReader::new(file).lines() {
        line.with_context(|| format!("读取清单文件 {} 失败", path.display()))?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_entry() {
        let entry = ManifestEntry::parse("word/a.jpg cat").unwrap();
        assert_eq!(entry.image_path, "word/a.jpg");
        assert_eq!(entry.ground_truth_label, "cat");
        assert!(entry.has_label());

        let entry = ManifestEntry::parse("  c.jpg\t").unwrap();
        assert_eq!(entry.image_path, "c.jpg");
        assert_eq!(entry.ground_truth_label, "");
        assert!(!entry.has_label());

        let entry = ManifestEntry::parse("d.jpg dog extra").unwrap();
        assert_eq!(entry.ground_truth_label, "dog");

        assert!(ManifestEntry::parse(" \t ").is_none());
    }

    #[test]
    fn test_read_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "a.jpg cat\nb.jpg dog\nc.jpg\n").unwrap();

        assert_eq!(count_lines(&path).unwrap(), 3);
        let entries = ManifestReader::open(&path)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.image_path.as_str()).collect();
        assert_eq!(paths, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(entries[2].ground_truth_label, "");
    }

    #[test]
    fn test_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "a.jpg cat\n\nb.jpg dog\n").unwrap();

        let mut reader = ManifestReader::open(&path).unwrap();
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        match err.downcast_ref::<EvalError>() {
            Some(EvalError::ManifestFormat { line, .. }) => assert_eq!(*line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ManifestReader::open(&dir.path().join("missing.txt")).is_err());
        assert!(count_lines(&dir.path().join("missing.txt")).is_err());
    }
}
