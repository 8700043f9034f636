use crate::kernel::error::EditorError;
use crate::kernel::preview::PREVIEW_FILE;
use crate::kernel::run::{plan, RunPlan};
use crate::kernel::{Action, Effect, NoticeLevel};

use super::DispatchResult;

impl super::Store {
    pub(super) fn run_or_preview(&mut self) -> DispatchResult {
        let plan = match plan(&self.state.session) {
            Ok(plan) => plan,
            Err(refusal) => {
                tracing::info!(reason = %refusal, "run refused");
                self.show_notice(refusal.title(), refusal.to_string(), NoticeLevel::Warning);
                return DispatchResult::changed(true);
            }
        };

        let effect = match plan {
            RunPlan::Script { filename } => {
                let script = self.storage.path_of(&filename);
                let run_id = self.state.output.begin(&script.display().to_string());
                tracing::info!(run_id, script = %script.display(), "run requested");
                Effect::RunScript {
                    run_id,
                    program: self.state.config.python.clone(),
                    script,
                    cwd: self.storage.root().to_path_buf(),
                }
            }
            RunPlan::Preview { filename } => {
                self.state.ui.status_message = Some(format!("Rendering {filename}"));
                Effect::RenderPreview {
                    source: self.storage.path_of(&filename),
                    target: self.storage.path_of(PREVIEW_FILE),
                }
            }
        };

        DispatchResult {
            effects: vec![effect],
            state_changed: true,
        }
    }

    pub(super) fn reduce_run_action(&mut self, action: Action) -> DispatchResult {
        let changed = match action {
            Action::RunOutput {
                run_id,
                stream,
                line,
            } => self.state.output.push(run_id, stream, line),
            Action::RunExited { run_id, code } => {
                let changed = self.state.output.finish(run_id, code);
                if changed {
                    tracing::info!(run_id, code = ?code, "run finished");
                }
                changed
            }
            Action::RunLaunchFailed {
                run_id,
                program,
                error,
            } => {
                if !self.state.output.launch_failed(run_id, &program, &error) {
                    return DispatchResult::changed(false);
                }
                self.show_error(&EditorError::Launch {
                    program,
                    message: error,
                });
                true
            }
            Action::PreviewOpened { path } => {
                tracing::info!(path = %path.display(), "preview opened");
                self.refresh_file_list();
                self.state.ui.status_message = Some(format!("Preview opened: {}", path.display()));
                true
            }
            Action::PreviewFailed { path, error } => {
                self.refresh_file_list();
                self.show_error(&EditorError::Preview(format!("{}: {error}", path.display())));
                true
            }
            _ => false,
        };
        DispatchResult::changed(changed)
    }
}
