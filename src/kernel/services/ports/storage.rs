//! 存储目录抽象
//!
//! 会话只通过文件名访问一个扁平目录；具体实现见 `adapters::storage`。

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("{0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub trait StorageProvider {
    /// 存储目录本身
    fn root(&self) -> &Path;

    /// 目录下的普通文件名，排序后返回；每次调用都重新读盘
    fn list(&self) -> Result<Vec<String>>;

    fn read(&self, name: &str) -> Result<String>;

    fn write(&self, name: &str, content: &str) -> Result<()>;

    fn exists(&self, name: &str) -> bool;

    fn remove(&self, name: &str) -> Result<()>;

    fn path_of(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }
}
