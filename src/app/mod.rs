//! 应用层：工作台（输入分发、tick、渲染）

pub mod theme;
pub mod workbench;

pub use workbench::{InputOutcome, Workbench};
