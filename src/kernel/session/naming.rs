//! 文件名规则：未命名缓冲区与保存名校验

use crate::kernel::error::EditorError;
use regex::Regex;
use std::sync::OnceLock;

const UNTITLED_PREFIX: &str = "Untitled-";

fn untitled_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Untitled-\d+\.").expect("valid untitled pattern"))
}

/// 是否为 `Untitled-<n>.<ext>` 形式；这类缓冲区保存前必须先命名
pub fn is_untitled(name: &str) -> bool {
    untitled_pattern().is_match(name)
}

pub fn untitled_name(n: usize, extension: &str) -> String {
    format!("{UNTITLED_PREFIX}{n}.{extension}")
}

/// 去掉首尾空白后校验，返回可用的文件名
pub fn validate_name(raw: &str) -> Result<String, EditorError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(EditorError::InvalidName {
            name: raw.to_string(),
            reason: "Name required",
        });
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(EditorError::InvalidName {
            name: name.to_string(),
            reason: "Invalid name",
        });
    }
    Ok(name.to_string())
}

/// 小写扩展名（不含点）；无扩展名返回空串
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}
