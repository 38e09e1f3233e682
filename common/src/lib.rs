use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

//常用函数

/// 将相对路径展平为文件名
///
/// 路径分隔符替换为下划线, 避免不同目录下的同名图片互相覆盖
///
/// # 参数
///
/// - `path` - 相对路径
pub fn flatten_file_name(path: &str) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// 在文件扩展名前插入后缀
///
/// `dir/model.pth` + `_patched` => `dir/model_patched.pth`
///
/// # 参数
///
/// - `path` - 文件路径
/// - `suffix` - 后缀
pub fn insert_file_suffix(path: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .context(format!("路径 {} 缺少文件名", path.display()))?;
    let mut file_name = stem.to_os_string();
    file_name.push(suffix);
    if let Some(ext) = path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    Ok(path.with_file_name(file_name))
}

/// 是否为保留字符
///
/// 包含: 英文字母, 数字, `^` 以及常用汉字 (U+4E00 ~ U+9FA5)
fn is_kept_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '^' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// 移除符号字符
///
/// 仅保留英文字母, 数字, `^` 以及常用汉字
///
/// # 参数
///
/// - `s` - 字符串
pub fn remove_symbol_char(s: &str) -> String {
    s.chars().filter(|c| is_kept_char(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_file_name() {
        assert_eq!(flatten_file_name("a.jpg"), "a.jpg");
        assert_eq!(flatten_file_name("word/1/a.jpg"), "word_1_a.jpg");
        assert_eq!(flatten_file_name("word\\a.jpg"), "word_a.jpg");
    }

    #[test]
    fn test_insert_file_suffix() {
        let path = insert_file_suffix(Path::new("checkpoints/psenet.pth"), "_patched").unwrap();
        assert_eq!(path, PathBuf::from("checkpoints/psenet_patched.pth"));

        let path = insert_file_suffix(Path::new("model.v1.json"), "_patched").unwrap();
        assert_eq!(path, PathBuf::from("model.v1_patched.json"));

        let path = insert_file_suffix(Path::new("weights"), "_patched").unwrap();
        assert_eq!(path, PathBuf::from("weights_patched"));
    }

    #[test]
    fn test_remove_symbol_char() {
        assert_eq!(remove_symbol_char("Hello, World!"), "HelloWorld");
        assert_eq!(remove_symbol_char("a^b-c_1"), "a^bc1");
        assert_eq!(remove_symbol_char("宗室·面具"), "宗室面具");
    }
}
