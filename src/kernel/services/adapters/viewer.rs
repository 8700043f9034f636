//! 系统默认查看器
//!
//! - Linux/BSD: xdg-open
//! - macOS: open
//! - Windows: cmd /C start

use crate::kernel::services::ports::Viewer;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Default)]
pub struct SystemViewer;

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut cmd = viewer_command(path);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // 这些启动器把文件交给桌面环境后立即返回
        let status = cmd.status()?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("viewer exited with {status}"),
            ));
        }
        tracing::debug!(path = %path.display(), "viewer launched");
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
