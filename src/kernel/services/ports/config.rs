use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_size: u8,
    /// 新建文件使用的扩展名（不含点）
    pub default_extension: String,
    /// 运行 `.py` 文件的解释器
    pub python: String,
    pub highlight_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            default_extension: "py".to_string(),
            python: default_python().to_string(),
            highlight_debounce_ms: 200,
        }
    }
}

impl EditorConfig {
    pub fn tab_text(&self) -> String {
        " ".repeat(self.tab_size.max(1) as usize)
    }

    pub fn highlight_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.highlight_debounce_ms)
    }
}

fn default_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}
