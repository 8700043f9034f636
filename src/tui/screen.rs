//! 全屏会话：raw mode、备用屏幕、鼠标与粘贴捕获，以及退出、信号、panic 时的恢复

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 进入、离开全屏模式的底层操作
pub trait ScreenModes: Send + Sync + 'static {
    fn enter(&self) -> io::Result<()>;
    fn leave(&self) -> io::Result<()>;
    fn set_title(&self, title: &str) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct CrosstermModes;

impl ScreenModes for CrosstermModes {
    fn enter(&self) -> io::Result<()> {
        use crossterm::event::{EnableBracketedPaste, EnableMouseCapture};
        use crossterm::execute;
        use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen};

        enable_raw_mode()?;
        if let Err(err) = execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        ) {
            // 半路失败时别把 shell 留在 raw mode
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(())
    }

    fn leave(&self) -> io::Result<()> {
        use crossterm::event::{DisableBracketedPaste, DisableMouseCapture};
        use crossterm::execute;
        use crossterm::terminal::{disable_raw_mode, LeaveAlternateScreen};

        let screen = execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            crossterm::cursor::Show
        );
        let raw = disable_raw_mode();
        screen.and(raw)
    }

    fn set_title(&self, title: &str) -> io::Result<()> {
        crossterm::execute!(io::stdout(), crossterm::terminal::SetTitle(title))
    }
}

/// 可交给信号线程和 panic hook 的恢复句柄；无论调用几次只离开一次
#[derive(Clone)]
pub struct RestoreHandle {
    left: Arc<AtomicBool>,
    modes: Arc<dyn ScreenModes>,
}

impl RestoreHandle {
    pub fn restore(&self) -> io::Result<()> {
        if self.left.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.modes.leave()
    }
}

/// 全屏期间持有，drop 时恢复终端
pub struct Screen {
    handle: RestoreHandle,
    title: Option<String>,
}

impl Screen {
    pub fn enter() -> io::Result<Self> {
        Self::with_modes(Arc::new(CrosstermModes))
    }

    pub fn with_modes(modes: Arc<dyn ScreenModes>) -> io::Result<Self> {
        modes.enter()?;
        Ok(Self {
            handle: RestoreHandle {
                left: Arc::new(AtomicBool::new(false)),
                modes,
            },
            title: None,
        })
    }

    pub fn restore_handle(&self) -> RestoreHandle {
        self.handle.clone()
    }

    /// 窗口标题跟随当前文件；没变就不写终端
    pub fn sync_title(&mut self, title: &str) -> io::Result<()> {
        if self.title.as_deref() == Some(title) {
            return Ok(());
        }
        self.handle.modes.set_title(title)?;
        self.title = Some(title.to_string());
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if let Err(e) = self.handle.restore() {
            tracing::warn!(error = %e, "terminal restore failed");
        }
    }
}

/// panic 时先离开全屏，否则消息会落在备用屏幕上看不到
pub fn install_panic_restore(handle: RestoreHandle) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = handle.restore();
        previous(info);
        eprintln!("funkide crashed: {info}");
    }));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl TerminationSignal {
    /// 128 + 信号编号
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::Hangup => 129,
            TerminationSignal::Interrupt => 130,
            TerminationSignal::Terminate => 143,
        }
    }
}

#[cfg(unix)]
const SIGNAL_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

/// 信号先交给主循环；主循环在宽限期内没退出就由这里恢复终端并退出
#[cfg(unix)]
pub fn spawn_signal_listener(
    handle: RestoreHandle,
    tx: std::sync::mpsc::Sender<TerminationSignal>,
) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    std::thread::Builder::new()
        .name("funkide-signals".to_string())
        .spawn(move || {
            let Some(signal) = signals.forever().find_map(|sig| match sig {
                SIGINT => Some(TerminationSignal::Interrupt),
                SIGTERM => Some(TerminationSignal::Terminate),
                SIGHUP => Some(TerminationSignal::Hangup),
                _ => None,
            }) else {
                return;
            };
            tracing::info!(?signal, "termination signal received");
            if tx.send(signal).is_err() {
                tracing::debug!("main loop already gone");
            }

            std::thread::sleep(SIGNAL_GRACE);
            let _ = handle.restore();
            std::process::exit(signal.exit_code());
        })?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/tui/screen.rs"]
mod tests;
