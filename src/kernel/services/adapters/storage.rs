//! 本地存储目录
//!
//! 实现 StorageProvider trait，操作单个扁平目录中的文件

use crate::kernel::error::EditorError;
use crate::kernel::services::ports::storage::{Result, StorageError, StorageProvider};
use std::fs;
use std::path::{Path, PathBuf};

pub const STORAGE_DIR_NAME: &str = "managed_programs";

pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// 打开（必要时创建）存储目录
    pub fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    /// 启动时打开存储：配置里给了目录就用它，否则取 `default_dir`；任一步失败都是 `StorageInit`
    pub fn open_configured(
        configured: Option<PathBuf>,
        default_dir: impl FnOnce() -> std::io::Result<PathBuf>,
    ) -> std::result::Result<Self, EditorError> {
        let dir = match configured {
            Some(dir) => dir,
            None => default_dir().map_err(|source| EditorError::StorageInit {
                path: PathBuf::from(STORAGE_DIR_NAME),
                source,
            })?,
        };
        Self::open(&dir).map_err(|source| EditorError::StorageInit { path: dir, source })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// 默认存储目录：可执行文件所在目录下的 `managed_programs`
pub fn default_storage_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let base = exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join(STORAGE_DIR_NAME))
}

impl StorageProvider for LocalStorage {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.file_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        if !path.is_file() {
            return Err(StorageError::NotAFile(name.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        Ok(fs::write(self.file_path(name), content)?)
    }

    fn exists(&self, name: &str) -> bool {
        self.file_path(name).exists()
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        if !path.is_file() {
            return Err(StorageError::NotAFile(name.to_string()));
        }
        Ok(fs::remove_file(path)?)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/storage.rs"]
mod tests;
