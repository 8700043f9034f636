use super::message::AppMessage;
use crate::kernel::output::OutputStream;
use crate::kernel::preview;
use crate::kernel::services::adapters::SystemViewer;
use crate::kernel::services::ports::Viewer;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    viewer: Arc<dyn Viewer>,
}

impl AsyncRuntime {
    pub fn new(tx: Sender<AppMessage>) -> io::Result<Self> {
        Self::with_viewer(tx, Arc::new(SystemViewer))
    }

    pub fn with_viewer(tx: Sender<AppMessage>, viewer: Arc<dyn Viewer>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            tx,
            viewer,
        })
    }

    /// 以 `program script` 启动子进程，逐行回传 stdout/stderr，最后回传退出码
    ///
    /// 不提供取消与超时；进程会一直运行到自行退出。
    pub fn run_script(&self, run_id: u64, program: String, script: PathBuf, cwd: PathBuf) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let mut cmd = Command::new(&program);
            cmd.arg(&script)
                .current_dir(&cwd)
                .env("PYTHONUNBUFFERED", "1")
                .env("PYTHONIOENCODING", "utf-8")
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    let _ = tx.send(AppMessage::RunLaunchFailed {
                        run_id,
                        program,
                        error: e.to_string(),
                    });
                    return;
                }
            };

            tracing::info!(
                run_id,
                pid = child.id(),
                script = %script.display(),
                "script started"
            );

            let stdout_task = child
                .stdout
                .take()
                .map(|out| tokio::spawn(pump_lines(run_id, OutputStream::Stdout, out, tx.clone())));
            let stderr_task = child
                .stderr
                .take()
                .map(|err| tokio::spawn(pump_lines(run_id, OutputStream::Stderr, err, tx.clone())));

            // 两路流读完后再报告退出，保证退出消息排在所有输出之后
            if let Some(task) = stdout_task {
                let _ = task.await;
            }
            if let Some(task) = stderr_task {
                let _ = task.await;
            }

            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    tracing::warn!(run_id, error = %e, "wait for script failed");
                    None
                }
            };
            let _ = tx.send(AppMessage::RunExited { run_id, code });
        });
    }

    /// 渲染 Markdown 到 `target` 并交给系统查看器打开
    pub fn render_preview(&self, source: PathBuf, target: PathBuf) {
        let tx = self.tx.clone();
        let viewer = self.viewer.clone();
        self.runtime.spawn(async move {
            let path_for_error = target.clone();
            let result = tokio::task::spawn_blocking(move || -> Result<PathBuf, String> {
                let markdown = std::fs::read_to_string(&source)
                    .map_err(|e| format!("cannot read {}: {e}", source.display()))?;
                let title = source
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                let page = preview::render_page(&title, &markdown);
                std::fs::write(&target, page)
                    .map_err(|e| format!("cannot write {}: {e}", target.display()))?;
                viewer
                    .open(&target)
                    .map_err(|e| format!("cannot open viewer: {e}"))?;
                Ok(target)
            })
            .await;

            let msg = match result {
                Ok(Ok(path)) => AppMessage::PreviewOpened { path },
                Ok(Err(error)) => AppMessage::PreviewFailed {
                    path: path_for_error,
                    error,
                },
                Err(e) => AppMessage::PreviewFailed {
                    path: path_for_error,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(msg);
        });
    }
}

async fn pump_lines<R>(run_id: u64, stream: OutputStream, reader: R, tx: Sender<AppMessage>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim_end_matches(|c| c == '\n' || c == '\r').to_string();
                if tx
                    .send(AppMessage::RunOutput {
                        run_id,
                        stream,
                        line,
                    })
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(run_id, ?stream, error = %e, "reading script output failed");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/async_runtime.rs"]
mod tests;
