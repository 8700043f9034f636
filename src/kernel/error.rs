use crate::kernel::services::ports::StorageError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Cannot read {filename}: {source}")]
    Read {
        filename: String,
        #[source]
        source: StorageError,
    },
    #[error("Cannot write {filename}: {source}")]
    Write {
        filename: String,
        #[source]
        source: StorageError,
    },
    #[error("Cannot delete {filename}: {source}")]
    Delete {
        filename: String,
        #[source]
        source: StorageError,
    },
    #[error("{reason}: {name:?}")]
    InvalidName { name: String, reason: &'static str },
    #[error("{0} is already open in another tab")]
    NameInUse(String),
    #[error("No open buffer named {0}")]
    UnknownBuffer(String),
    #[error("Cannot start {program}: {message}")]
    Launch { program: String, message: String },
    #[error("Preview failed: {0}")]
    Preview(String),
    #[error("Cannot create storage directory {}: {source}", path.display())]
    StorageInit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EditorError {
    /// 通知框标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Read { .. } => "Read Error",
            Self::Write { .. } => "Write Error",
            Self::Delete { .. } => "Delete Error",
            Self::InvalidName { .. } | Self::NameInUse(_) => "Save Error",
            Self::UnknownBuffer(_) => "Error",
            Self::Launch { .. } => "Run Error",
            Self::Preview(_) => "Preview Error",
            Self::StorageInit { .. } => "Storage Error",
        }
    }
}
