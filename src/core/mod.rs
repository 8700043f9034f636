//! 核心定义：命令与输入事件

pub mod command;
#[cfg(feature = "tui")]
pub mod event;

pub use command::Command;
#[cfg(feature = "tui")]
pub use event::{InputEvent, Key};
