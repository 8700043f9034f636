use std::io;
use std::path::Path;

/// 用系统默认程序打开生成的预览文件
pub trait Viewer: Send + Sync + 'static {
    fn open(&self, path: &Path) -> io::Result<()>;
}
