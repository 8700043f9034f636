use std::path::PathBuf;
use std::time::Instant;

use crate::core::Command;
use crate::kernel::output::OutputStream;

#[derive(Debug, Clone)]
pub enum Action {
    RunCommand(Command),
    OpenFile(String),
    FileListSetViewHeight {
        height: usize,
    },
    FileListClickRow {
        row: usize,
    },
    EditorSetViewSize {
        width: usize,
        height: usize,
    },
    TabClick {
        index: usize,
    },
    OutputScroll {
        delta: isize,
    },
    InputDialogAppend(char),
    InputDialogBackspace,
    InputDialogCursorLeft,
    InputDialogCursorRight,
    InputDialogAccept,
    InputDialogCancel,
    /// 三选一对话框的"是"；两选一时即"确认"
    ConfirmDialogAccept,
    ConfirmDialogDecline,
    ConfirmDialogCancel,
    DismissNotice,
    HighlightTick {
        now: Instant,
    },
    RunOutput {
        run_id: u64,
        stream: OutputStream,
        line: String,
    },
    RunExited {
        run_id: u64,
        code: Option<i32>,
    },
    RunLaunchFailed {
        run_id: u64,
        program: String,
        error: String,
    },
    PreviewOpened {
        path: PathBuf,
    },
    PreviewFailed {
        path: PathBuf,
        error: String,
    },
}

#[cfg(feature = "tui")]
impl From<crate::kernel::services::adapters::AppMessage> for Action {
    fn from(msg: crate::kernel::services::adapters::AppMessage) -> Self {
        use crate::kernel::services::adapters::AppMessage;

        match msg {
            AppMessage::RunOutput {
                run_id,
                stream,
                line,
            } => Action::RunOutput {
                run_id,
                stream,
                line,
            },
            AppMessage::RunExited { run_id, code } => Action::RunExited { run_id, code },
            AppMessage::RunLaunchFailed {
                run_id,
                program,
                error,
            } => Action::RunLaunchFailed {
                run_id,
                program,
                error,
            },
            AppMessage::PreviewOpened { path } => Action::PreviewOpened { path },
            AppMessage::PreviewFailed { path, error } => Action::PreviewFailed { path, error },
        }
    }
}
