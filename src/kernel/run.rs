//! 运行/预览分发：按当前缓冲区的扩展名决定做什么

use crate::kernel::session::{extension_of, Session};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPlan {
    Script { filename: String },
    Preview { filename: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRefusal {
    NoFile,
    /// 有未保存修改时不运行，也不自动保存
    Unsaved(String),
    Unsupported { extension: String },
}

impl RunRefusal {
    pub fn title(&self) -> &'static str {
        match self {
            Self::NoFile => "No File",
            Self::Unsaved(_) => "Unsaved Changes",
            Self::Unsupported { .. } => "Unsupported",
        }
    }
}

impl fmt::Display for RunRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFile => write!(f, "No file is open."),
            Self::Unsaved(name) => write!(f, "Save {name} before running it."),
            Self::Unsupported { extension } if extension.is_empty() => {
                write!(f, "Files without an extension cannot be run or previewed.")
            }
            Self::Unsupported { extension } => {
                write!(f, "Cannot run or preview .{extension} files.")
            }
        }
    }
}

pub fn plan(session: &Session) -> Result<RunPlan, RunRefusal> {
    let buffer = session.current().ok_or(RunRefusal::NoFile)?;
    let filename = buffer.filename().to_string();
    if buffer.is_dirty() {
        return Err(RunRefusal::Unsaved(filename));
    }

    let extension = extension_of(&filename);
    match extension.as_str() {
        "py" => Ok(RunPlan::Script { filename }),
        "md" | "markdown" => Ok(RunPlan::Preview { filename }),
        _ => Err(RunRefusal::Unsupported { extension }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/run.rs"]
mod tests;
