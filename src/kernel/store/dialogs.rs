use crate::kernel::error::EditorError;
use crate::kernel::session::CloseDecision;
use crate::kernel::{Action, AfterSave, InputDialogKind, PendingAction};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_input_dialog_action(&mut self, action: Action) -> DispatchResult {
        let dialog = &mut self.state.ui.input_dialog;
        if !dialog.visible {
            return DispatchResult::changed(false);
        }

        match action {
            Action::InputDialogAppend(ch) => {
                dialog.error = None;
                if dialog.cursor > dialog.value.len() {
                    dialog.cursor = dialog.value.len();
                }
                dialog.value.insert(dialog.cursor, ch);
                dialog.cursor += ch.len_utf8();
                DispatchResult::changed(true)
            }
            Action::InputDialogBackspace => {
                if dialog.cursor == 0 {
                    return DispatchResult::changed(false);
                }
                dialog.error = None;
                let prev = dialog.value[..dialog.cursor]
                    .char_indices()
                    .last()
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                dialog.value.drain(prev..dialog.cursor);
                dialog.cursor = prev;
                DispatchResult::changed(true)
            }
            Action::InputDialogCursorLeft => {
                if dialog.cursor == 0 {
                    return DispatchResult::changed(false);
                }
                dialog.cursor = dialog.value[..dialog.cursor]
                    .char_indices()
                    .last()
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                DispatchResult::changed(true)
            }
            Action::InputDialogCursorRight => {
                let Some(ch) = dialog.value[dialog.cursor..].chars().next() else {
                    return DispatchResult::changed(false);
                };
                dialog.cursor += ch.len_utf8();
                DispatchResult::changed(true)
            }
            Action::InputDialogCancel => {
                let then = match dialog.kind {
                    Some(InputDialogKind::SaveAs { then, .. }) => then,
                    None => AfterSave::Nothing,
                };
                dialog.reset();
                self.state.ui.status_message = Some(cancelled_message(then));
                DispatchResult::changed(true)
            }
            Action::InputDialogAccept => {
                let taken = std::mem::take(dialog);
                let Some(InputDialogKind::SaveAs { filename, then }) = taken.kind.clone() else {
                    return DispatchResult::changed(true);
                };

                match self.try_save(&filename, Some(&taken.value), false, then) {
                    Ok(()) => {}
                    Err(e @ (EditorError::InvalidName { .. } | EditorError::NameInUse(_))) => {
                        tracing::info!(error = %e, "save name rejected");
                        self.state.ui.input_dialog = taken;
                        self.state.ui.input_dialog.error = Some(e.to_string());
                    }
                    Err(e) => self.show_error(&e),
                }
                DispatchResult::changed(true)
            }
            _ => DispatchResult::changed(false),
        }
    }

    pub(super) fn reduce_confirm_dialog_action(&mut self, action: Action) -> DispatchResult {
        let dialog = &mut self.state.ui.confirm_dialog;
        if !dialog.visible {
            return DispatchResult::changed(false);
        }
        let three_way = dialog.three_way;
        let pending = dialog.on_confirm.take();
        dialog.reset();

        let Some(pending) = pending else {
            return DispatchResult::changed(true);
        };

        // 两选一的对话框没有"否"，Decline 等同取消
        let action = match action {
            Action::ConfirmDialogDecline if !three_way => Action::ConfirmDialogCancel,
            other => other,
        };

        match (pending, action) {
            (PendingAction::CloseBuffer { filename }, Action::ConfirmDialogAccept) => {
                self.close_buffer(&filename, Some(CloseDecision::SaveThenClose));
            }
            (PendingAction::CloseBuffer { filename }, Action::ConfirmDialogDecline) => {
                self.close_buffer(&filename, Some(CloseDecision::Discard));
            }
            (PendingAction::CloseBuffer { filename }, _) => {
                self.close_buffer(&filename, Some(CloseDecision::Abort));
            }
            (
                PendingAction::ConfirmOverwrite {
                    filename,
                    target,
                    then,
                },
                Action::ConfirmDialogAccept,
            ) => {
                self.save_buffer(&filename, Some(&target), true, then);
            }
            (PendingAction::ConfirmOverwrite { then, .. }, _) => {
                self.state.ui.status_message = Some(cancelled_message(then));
            }
            (PendingAction::DeleteFile { filename }, Action::ConfirmDialogAccept) => {
                self.delete_file(&filename);
            }
            (PendingAction::Quit, Action::ConfirmDialogAccept) => self.continue_quit(),
            (PendingAction::Quit, Action::ConfirmDialogDecline) => {
                tracing::info!(dirty = ?self.state.session.dirty_names(), "quit without saving");
                self.state.ui.should_quit = true;
            }
            (PendingAction::DeleteFile { .. } | PendingAction::Quit, _) => {}
        }

        DispatchResult::changed(true)
    }
}

fn cancelled_message(then: AfterSave) -> String {
    match then {
        AfterSave::ContinueQuit => "Quit cancelled".to_string(),
        AfterSave::CloseBuffer => "Close cancelled".to_string(),
        AfterSave::Nothing => "Save cancelled".to_string(),
    }
}
