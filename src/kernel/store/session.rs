use crate::kernel::error::EditorError;
use crate::kernel::session::{CloseDecision, CloseOutcome, SaveOutcome, SaveRequest};
use crate::kernel::{AfterSave, FocusTarget, InputDialogKind, PendingAction};

impl super::Store {
    pub(super) fn open_file(&mut self, filename: &str) -> bool {
        match self.state.session.open(self.storage.as_ref(), filename) {
            Ok(_) => {
                self.state.file_list.select(filename);
                self.state.ui.focus = FocusTarget::Editor;
                true
            }
            Err(e) => {
                self.show_error(&e);
                // 文件可能已被外部删除
                self.refresh_file_list();
                true
            }
        }
    }

    /// 保存并处理后续；命名类错误交给调用者（输入框内联显示）
    pub(super) fn try_save(
        &mut self,
        filename: &str,
        target: Option<&str>,
        overwrite_confirmed: bool,
        then: AfterSave,
    ) -> Result<(), EditorError> {
        let mut request = match target {
            Some(target) => SaveRequest::named(filename, target),
            None => SaveRequest::plain(filename),
        };
        if overwrite_confirmed {
            request = request.confirmed();
        }
        let outcome = self.state.session.save(self.storage.as_ref(), request)?;
        self.handle_save_outcome(filename, outcome, then);
        Ok(())
    }

    pub(super) fn save_buffer(
        &mut self,
        filename: &str,
        target: Option<&str>,
        overwrite_confirmed: bool,
        then: AfterSave,
    ) {
        if let Err(e) = self.try_save(filename, target, overwrite_confirmed, then) {
            self.show_error(&e);
        }
    }

    pub(super) fn handle_save_outcome(
        &mut self,
        filename: &str,
        outcome: SaveOutcome,
        then: AfterSave,
    ) {
        match outcome {
            SaveOutcome::NeedsName { suggested } => {
                let dialog = &mut self.state.ui.input_dialog;
                dialog.reset();
                dialog.visible = true;
                dialog.title = "Save As".to_string();
                dialog.cursor = suggested.len();
                dialog.value = suggested;
                dialog.kind = Some(InputDialogKind::SaveAs {
                    filename: filename.to_string(),
                    then,
                });
            }
            SaveOutcome::NeedsOverwrite { target } => {
                let dialog = &mut self.state.ui.confirm_dialog;
                dialog.reset();
                dialog.visible = true;
                dialog.title = "Overwrite".to_string();
                dialog.message = format!("{target} already exists. Overwrite it?");
                dialog.on_confirm = Some(PendingAction::ConfirmOverwrite {
                    filename: filename.to_string(),
                    target,
                    then,
                });
            }
            SaveOutcome::Saved { filename, .. } => {
                self.refresh_file_list();
                self.state.file_list.select(&filename);
                self.state.ui.status_message = Some(format!("Saved {filename}"));
                self.after_save(&filename, then);
            }
        }
    }

    fn after_save(&mut self, filename: &str, then: AfterSave) {
        match then {
            AfterSave::Nothing => {}
            AfterSave::CloseBuffer => {
                if let Some(buffer) = self.state.session.remove_buffer(filename) {
                    self.highlights.cancel(buffer.id());
                }
            }
            AfterSave::ContinueQuit => self.continue_quit(),
        }
    }

    pub(super) fn request_close(&mut self, filename: &str) {
        self.close_buffer(filename, None);
    }

    pub(super) fn close_buffer(&mut self, filename: &str, decision: Option<CloseDecision>) {
        let id = self.state.session.buffer(filename).map(|b| b.id());
        match self
            .state
            .session
            .close(self.storage.as_ref(), filename, decision)
        {
            Ok(CloseOutcome::Closed) => {
                if let Some(id) = id {
                    self.highlights.cancel(id);
                }
                if decision == Some(CloseDecision::SaveThenClose) {
                    self.refresh_file_list();
                }
                self.state.ui.status_message = Some(format!("Closed {filename}"));
            }
            Ok(CloseOutcome::NeedsDecision) => {
                let dialog = &mut self.state.ui.confirm_dialog;
                dialog.reset();
                dialog.visible = true;
                dialog.three_way = true;
                dialog.title = "Unsaved Changes".to_string();
                dialog.message = format!("Save changes to {filename} before closing?");
                dialog.on_confirm = Some(PendingAction::CloseBuffer {
                    filename: filename.to_string(),
                });
            }
            Ok(CloseOutcome::Aborted) => {}
            Ok(CloseOutcome::SavePending(outcome)) => {
                self.handle_save_outcome(filename, outcome, AfterSave::CloseBuffer);
            }
            Err(e) => self.show_error(&e),
        }
    }

    pub(super) fn request_delete(&mut self, filename: &str) {
        let dialog = &mut self.state.ui.confirm_dialog;
        dialog.reset();
        dialog.visible = true;
        dialog.title = "Delete File".to_string();
        dialog.message = format!("Delete {filename}? This cannot be undone.");
        dialog.on_confirm = Some(PendingAction::DeleteFile {
            filename: filename.to_string(),
        });
    }

    pub(super) fn delete_file(&mut self, filename: &str) {
        let id = self.state.session.buffer(filename).map(|b| b.id());
        match self.state.session.delete(self.storage.as_ref(), filename) {
            Ok(closed) => {
                if let (true, Some(id)) = (closed, id) {
                    self.highlights.cancel(id);
                }
                self.state.ui.status_message = Some(format!("Deleted {filename}"));
            }
            Err(e) => self.show_error(&e),
        }
        self.refresh_file_list();
    }

    pub(super) fn request_quit(&mut self) {
        let dirty = self.state.session.dirty_names().len();
        if dirty == 0 {
            self.state.ui.should_quit = true;
            return;
        }

        let dialog = &mut self.state.ui.confirm_dialog;
        dialog.reset();
        dialog.visible = true;
        dialog.three_way = true;
        dialog.title = "Unsaved Changes".to_string();
        dialog.message = if dirty == 1 {
            "1 file has unsaved changes. Save before quitting?".to_string()
        } else {
            format!("{dirty} files have unsaved changes. Save before quitting?")
        };
        dialog.on_confirm = Some(PendingAction::Quit);
    }

    /// 按标签顺序逐个保存脏缓冲区；全部保存后退出，任一步中断则放弃退出
    pub(super) fn continue_quit(&mut self) {
        let Some(name) = self.state.session.dirty_names().into_iter().next() else {
            self.state.ui.should_quit = true;
            return;
        };
        self.state.session.switch_to(&name);
        self.save_buffer(&name, None, false, AfterSave::ContinueQuit);
    }
}
