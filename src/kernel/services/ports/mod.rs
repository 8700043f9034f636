//! Service ports: traits + data contracts.

pub mod config;
pub mod settings;
pub mod storage;
pub mod viewer;

pub use config::EditorConfig;
pub use settings::{KeybindingRule, Settings};
pub use storage::{Result as StorageResult, StorageError, StorageProvider};
pub use viewer::Viewer;
