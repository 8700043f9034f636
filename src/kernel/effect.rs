use std::path::PathBuf;

/// 需要在后台执行的 IO；由前端交给 `AsyncRuntime`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunScript {
        run_id: u64,
        program: String,
        script: PathBuf,
        cwd: PathBuf,
    },
    RenderPreview {
        source: PathBuf,
        target: PathBuf,
    },
}
