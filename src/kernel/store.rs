use std::time::Instant;

use crate::core::Command;
use crate::kernel::error::EditorError;
use crate::kernel::highlight::HighlightScheduler;
use crate::kernel::services::ports::StorageProvider;
use crate::kernel::session::EditOutcome;
use crate::models::CursorMotion;

use super::{Action, AppState, Effect, FocusTarget, NoticeLevel};

mod dialogs;
mod run;
mod session;

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }
}

pub struct Store {
    state: AppState,
    storage: Box<dyn StorageProvider>,
    highlights: HighlightScheduler,
}

impl Store {
    pub fn new(state: AppState, storage: Box<dyn StorageProvider>) -> Self {
        let highlights = HighlightScheduler::new(state.config.highlight_debounce());
        let mut store = Self {
            state,
            storage,
            highlights,
        };
        store.refresh_file_list();
        store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &dyn StorageProvider {
        self.storage.as_ref()
    }

    /// 最近一个待执行的高亮时间点，供事件循环计算 poll 超时
    pub fn next_highlight_deadline(&self) -> Option<Instant> {
        self.highlights.next_deadline()
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::RunCommand(cmd) => self.dispatch_command(cmd),
            Action::OpenFile(filename) => DispatchResult::changed(self.open_file(&filename)),
            Action::FileListSetViewHeight { height } => {
                DispatchResult::changed(self.state.file_list.set_view_height(height))
            }
            Action::FileListClickRow { row } => {
                let idx = self.state.file_list.scroll + row;
                let Some(name) = self.state.file_list.entries.get(idx).cloned() else {
                    return DispatchResult::changed(false);
                };
                self.state.file_list.select(&name);
                self.state.ui.focus = FocusTarget::FileList;
                self.open_file(&name);
                DispatchResult::changed(true)
            }
            Action::EditorSetViewSize { width, height } => {
                let ui = &mut self.state.ui;
                let resized = ui.editor_view_width != width || ui.editor_view_height != height;
                ui.editor_view_width = width;
                ui.editor_view_height = height;
                let scrolled = self.follow_cursor();
                DispatchResult::changed(resized || scrolled)
            }
            Action::TabClick { index } => {
                let Some(name) = self
                    .state
                    .session
                    .buffers()
                    .get(index)
                    .map(|b| b.filename().to_string())
                else {
                    return DispatchResult::changed(false);
                };
                let switched = self.state.session.switch_to(&name);
                self.state.ui.focus = FocusTarget::Editor;
                DispatchResult::changed(switched)
            }
            Action::OutputScroll { delta } => {
                let output = &mut self.state.output;
                if !output.visible {
                    return DispatchResult::changed(false);
                }
                let max = output.len().saturating_sub(1);
                let prev = output.scroll;
                output.scroll = (prev as isize + delta).clamp(0, max as isize) as usize;
                DispatchResult::changed(output.scroll != prev)
            }
            Action::InputDialogAppend(_)
            | Action::InputDialogBackspace
            | Action::InputDialogCursorLeft
            | Action::InputDialogCursorRight
            | Action::InputDialogAccept
            | Action::InputDialogCancel => self.reduce_input_dialog_action(action),
            Action::ConfirmDialogAccept
            | Action::ConfirmDialogDecline
            | Action::ConfirmDialogCancel => self.reduce_confirm_dialog_action(action),
            Action::DismissNotice => {
                if !self.state.ui.notice.visible {
                    return DispatchResult::changed(false);
                }
                self.state.ui.notice = Default::default();
                DispatchResult::changed(true)
            }
            Action::HighlightTick { now } => DispatchResult::changed(self.run_due_highlights(now)),
            Action::RunOutput { .. }
            | Action::RunExited { .. }
            | Action::RunLaunchFailed { .. }
            | Action::PreviewOpened { .. }
            | Action::PreviewFailed { .. } => self.reduce_run_action(action),
        }
    }

    fn dispatch_command(&mut self, command: Command) -> DispatchResult {
        if let Some(motion) = self.cursor_motion(&command) {
            return DispatchResult::changed(self.move_cursor(motion));
        }
        if command.is_edit() {
            return DispatchResult::changed(self.apply_edit(&command));
        }

        let mut state_changed = true;
        match command {
            Command::NewFile => {
                let ext = self.state.config.default_extension.clone();
                let name = self
                    .state
                    .session
                    .new_untitled(self.storage.as_ref(), &ext);
                self.state.ui.focus = FocusTarget::Editor;
                self.state.ui.status_message = Some(format!("New file {name}"));
            }
            Command::Save => {
                let Some(name) = self.state.session.current_name().map(str::to_string) else {
                    return DispatchResult::changed(false);
                };
                self.save_buffer(&name, None, false, super::AfterSave::Nothing);
            }
            Command::CloseTab => {
                let Some(name) = self.state.session.current_name().map(str::to_string) else {
                    return DispatchResult::changed(false);
                };
                self.request_close(&name);
            }
            Command::NextTab => state_changed = self.state.session.cycle(1),
            Command::PrevTab => state_changed = self.state.session.cycle(-1),
            Command::RunOrPreview => return self.run_or_preview(),
            Command::RefreshFileList => state_changed = self.refresh_file_list(),
            Command::FileListUp => state_changed = self.state.file_list.move_selection(-1),
            Command::FileListDown => state_changed = self.state.file_list.move_selection(1),
            Command::FileListOpen => {
                let Some(name) = self.state.file_list.selected_name().map(str::to_string) else {
                    return DispatchResult::changed(false);
                };
                state_changed = self.open_file(&name);
            }
            Command::FileListDelete => {
                let Some(name) = self.state.file_list.selected_name().map(str::to_string) else {
                    return DispatchResult::changed(false);
                };
                self.request_delete(&name);
            }
            Command::FocusFileList => self.state.ui.focus = FocusTarget::FileList,
            Command::FocusEditor => self.state.ui.focus = FocusTarget::Editor,
            Command::ToggleOutput => self.state.output.toggle(),
            Command::Escape => {
                if self.state.ui.focus == FocusTarget::FileList {
                    self.state.ui.focus = FocusTarget::Editor;
                } else if self.state.ui.status_message.is_some() {
                    self.state.ui.status_message = None;
                } else {
                    state_changed = false;
                }
            }
            Command::Quit => self.request_quit(),
            Command::Custom(name) => {
                tracing::debug!(command = %name, "unhandled custom command");
                state_changed = false;
            }
            _ => state_changed = false,
        }

        DispatchResult::changed(state_changed)
    }

    fn cursor_motion(&self, command: &Command) -> Option<CursorMotion> {
        let page = self.state.ui.editor_view_height.max(1);
        Some(match command {
            Command::CursorLeft => CursorMotion::Left,
            Command::CursorRight => CursorMotion::Right,
            Command::CursorUp => CursorMotion::Up,
            Command::CursorDown => CursorMotion::Down,
            Command::CursorLineStart => CursorMotion::LineStart,
            Command::CursorLineEnd => CursorMotion::LineEnd,
            Command::CursorFileStart => CursorMotion::FileStart,
            Command::CursorFileEnd => CursorMotion::FileEnd,
            Command::PageUp => CursorMotion::PageUp(page),
            Command::PageDown => CursorMotion::PageDown(page),
            _ => return None,
        })
    }

    /// 让当前缓冲区的视口跟随光标
    fn follow_cursor(&mut self) -> bool {
        let height = self.state.ui.editor_view_height;
        let width = self.state.ui.editor_view_width;
        let tab_width = self.state.config.tab_size.max(1) as usize;
        self.state
            .session
            .current_mut()
            .is_some_and(|b| b.ensure_cursor_visible(height, width, tab_width))
    }

    fn move_cursor(&mut self, motion: CursorMotion) -> bool {
        let Some(buffer) = self.state.session.current_mut() else {
            return false;
        };
        let moved = buffer.move_cursor(motion);
        let scrolled = self.follow_cursor();
        moved || scrolled
    }

    fn apply_edit(&mut self, command: &Command) -> bool {
        let tab = self.state.config.tab_text();
        let Some(buffer) = self.state.session.current_mut() else {
            return false;
        };

        let outcome: EditOutcome = match command {
            Command::InsertChar(c) => buffer.insert_char(*c),
            Command::InsertNewline => buffer.insert_char('\n'),
            Command::InsertTab => buffer.insert_str(&tab),
            Command::DeleteBackward => buffer.delete_backward(),
            Command::DeleteForward => buffer.delete_forward(),
            _ => EditOutcome::default(),
        };
        if !outcome.changed {
            return false;
        }

        let id = buffer.id();
        if outcome.became_dirty {
            tracing::debug!(filename = %buffer.filename(), "buffer became dirty");
        }
        self.follow_cursor();
        self.highlights.schedule(id, Instant::now());
        true
    }

    fn run_due_highlights(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for id in self.highlights.take_due(now) {
            let Some(buffer) = self.state.session.find_by_id(id) else {
                continue;
            };
            if buffer.highlights_stale() {
                buffer.refresh_syntax();
                changed = true;
            }
        }
        changed
    }

    /// 重新读盘；读失败时保留旧列表
    fn refresh_file_list(&mut self) -> bool {
        match self.storage.list() {
            Ok(entries) => self.state.file_list.set_entries(entries),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.storage.root().display(), "list storage failed");
                self.state.ui.status_message = Some(format!("Cannot list files: {e}"));
                true
            }
        }
    }

    fn show_error(&mut self, err: &EditorError) {
        tracing::warn!(error = %err, "{}", err.title());
        self.show_notice(err.title(), err.to_string(), NoticeLevel::Error);
    }

    fn show_notice(&mut self, title: &str, message: String, level: NoticeLevel) {
        let notice = &mut self.state.ui.notice;
        notice.visible = true;
        notice.title = title.to_string();
        notice.message = message;
        notice.level = level;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
