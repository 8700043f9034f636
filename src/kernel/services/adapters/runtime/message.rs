use crate::kernel::output::OutputStream;
use std::path::PathBuf;

#[derive(Debug)]
pub enum AppMessage {
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
