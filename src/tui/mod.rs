//! 终端集成（crossterm + ratatui）
//!
//! 与 `kernel` 分离，核心不依赖终端 crate。

pub mod screen;
