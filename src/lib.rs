//! funkide - 单窗口 TUI 代码编辑器
//!
//! 模块结构：
//! - core: 命令与按键定义
//! - models: 文本缓冲区（Rope + 光标）
//! - kernel: 无界面核心（会话、高亮、运行/预览、输出面板、Store）
//! - app: 工作台（输入分发、渲染、tick）
//! - tui: 终端初始化与恢复

#[cfg(feature = "tui")]
pub mod app;
pub mod core;
pub mod kernel;
pub mod models;
#[cfg(feature = "tui")]
pub mod tui;
