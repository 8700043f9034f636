use super::util;
use super::{InputOutcome, Workbench, MOUSE_SCROLL_STEP};
use crate::core::event::{
    InputEvent, Key, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use crate::core::Command;
use crate::kernel::services::adapters::KeybindingContext;
use crate::kernel::{Action as KernelAction, FocusTarget};

pub(super) fn handle_input(workbench: &mut Workbench, event: &InputEvent) -> InputOutcome {
    match event {
        InputEvent::Key(key_event) => {
            if key_event.kind != KeyEventKind::Press {
                return InputOutcome::Ignored;
            }
            workbench.handle_key_event(key_event)
        }
        InputEvent::Paste(text) => workbench.handle_paste(text),
        InputEvent::Mouse(mouse_event) => workbench.handle_mouse(mouse_event),
        InputEvent::Resize(_, _) => InputOutcome::Consumed,
        InputEvent::Other => InputOutcome::Ignored,
    }
}

impl Workbench {
    fn handle_key_event(&mut self, key_event: &KeyEvent) -> InputOutcome {
        // 模态框优先级：提示 > 确认 > 输入
        if self.store.state().ui.notice.visible {
            if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
                let _ = self.dispatch_kernel(KernelAction::DismissNotice);
            }
            return InputOutcome::Consumed;
        }

        if self.store.state().ui.confirm_dialog.visible {
            let action = match key_event.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    Some(KernelAction::ConfirmDialogAccept)
                }
                KeyCode::Char('n') | KeyCode::Char('N') => Some(KernelAction::ConfirmDialogDecline),
                KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('C') => {
                    Some(KernelAction::ConfirmDialogCancel)
                }
                _ => None,
            };
            if let Some(action) = action {
                let _ = self.dispatch_kernel(action);
            }
            return self.consumed_or_quit();
        }

        if self.store.state().ui.input_dialog.visible {
            let action = match (key_event.code, key_event.modifiers) {
                (KeyCode::Enter, _) => Some(KernelAction::InputDialogAccept),
                (KeyCode::Esc, _) => Some(KernelAction::InputDialogCancel),
                (KeyCode::Backspace, _) => Some(KernelAction::InputDialogBackspace),
                (KeyCode::Left, _) => Some(KernelAction::InputDialogCursorLeft),
                (KeyCode::Right, _) => Some(KernelAction::InputDialogCursorRight),
                (KeyCode::Char(ch), mods) if mods.is_empty() || mods == KeyModifiers::SHIFT => {
                    Some(KernelAction::InputDialogAppend(ch))
                }
                _ => None,
            };
            if let Some(action) = action {
                let _ = self.dispatch_kernel(action);
            }
            return self.consumed_or_quit();
        }

        let context = self.keybinding_context();
        let key: Key = (*key_event).into();

        if let Some(cmd) = self.keybindings.resolve(context, &key).cloned() {
            let _ = self.dispatch_kernel(KernelAction::RunCommand(cmd));
            return self.consumed_or_quit();
        }

        match (context, key_event.code, key_event.modifiers) {
            (KeybindingContext::Editor, KeyCode::Char(ch), mods)
                if mods.is_empty() || mods == KeyModifiers::SHIFT =>
            {
                let _ = self.dispatch_kernel(KernelAction::RunCommand(Command::InsertChar(ch)));
                InputOutcome::Consumed
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn handle_paste(&mut self, text: &str) -> InputOutcome {
        if self.store.state().ui.notice.visible || self.store.state().ui.confirm_dialog.visible {
            return InputOutcome::Consumed;
        }

        if self.store.state().ui.input_dialog.visible {
            for ch in text.chars().filter(|c| !c.is_control()) {
                let _ = self.dispatch_kernel(KernelAction::InputDialogAppend(ch));
            }
            return InputOutcome::Consumed;
        }

        if self.focus() != FocusTarget::Editor || self.store.state().session.is_empty() {
            return InputOutcome::Ignored;
        }

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for ch in normalized.chars() {
            let cmd = match ch {
                '\n' => Command::InsertNewline,
                other => Command::InsertChar(other),
            };
            let _ = self.dispatch_kernel(KernelAction::RunCommand(cmd));
        }
        InputOutcome::Consumed
    }

    fn handle_mouse(&mut self, event: &MouseEvent) -> InputOutcome {
        if self.store.state().ui.has_modal() {
            return InputOutcome::Ignored;
        }

        let (x, y) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_left_click(x, y),
            MouseEventKind::ScrollUp => self.handle_scroll(x, y, -MOUSE_SCROLL_STEP),
            MouseEventKind::ScrollDown => self.handle_scroll(x, y, MOUSE_SCROLL_STEP),
            _ => InputOutcome::Ignored,
        }
    }

    fn handle_left_click(&mut self, x: u16, y: u16) -> InputOutcome {
        if let Some(area) = self.last_file_list_area.filter(|a| util::rect_contains(*a, x, y)) {
            let row = (y - area.y) as usize;
            let _ = self.dispatch_kernel(KernelAction::FileListClickRow { row });
            return InputOutcome::Consumed;
        }

        if let Some(area) = self.last_tabs_area.filter(|a| util::rect_contains(*a, x, y)) {
            let offset = x - area.x;
            let index = self
                .last_tab_ranges
                .iter()
                .position(|(start, end)| offset >= *start && offset < *end);
            if let Some(index) = index {
                let _ = self.dispatch_kernel(KernelAction::TabClick { index });
            }
            return InputOutcome::Consumed;
        }

        if self
            .last_editor_area
            .is_some_and(|a| util::rect_contains(a, x, y))
        {
            let _ = self.dispatch_kernel(KernelAction::RunCommand(Command::FocusEditor));
            return InputOutcome::Consumed;
        }

        InputOutcome::Ignored
    }

    fn handle_scroll(&mut self, x: u16, y: u16, step: isize) -> InputOutcome {
        if self
            .last_output_area
            .is_some_and(|a| util::rect_contains(a, x, y))
        {
            // 输出面板的 scroll 是距末尾的行数，向上滚动增大
            let _ = self.dispatch_kernel(KernelAction::OutputScroll { delta: -step });
            return InputOutcome::Consumed;
        }

        if self
            .last_file_list_area
            .is_some_and(|a| util::rect_contains(a, x, y))
        {
            let cmd = if step < 0 {
                Command::FileListUp
            } else {
                Command::FileListDown
            };
            for _ in 0..step.unsigned_abs() {
                let _ = self.dispatch_kernel(KernelAction::RunCommand(cmd.clone()));
            }
            return InputOutcome::Consumed;
        }

        if self
            .last_editor_area
            .is_some_and(|a| util::rect_contains(a, x, y))
        {
            let cmd = if step < 0 {
                Command::CursorUp
            } else {
                Command::CursorDown
            };
            for _ in 0..step.unsigned_abs() {
                let _ = self.dispatch_kernel(KernelAction::RunCommand(cmd.clone()));
            }
            return InputOutcome::Consumed;
        }

        InputOutcome::Ignored
    }

    fn keybinding_context(&self) -> KeybindingContext {
        match self.focus() {
            FocusTarget::Editor => KeybindingContext::Editor,
            FocusTarget::FileList => KeybindingContext::FileList,
        }
    }

    fn consumed_or_quit(&self) -> InputOutcome {
        if self.should_quit() {
            InputOutcome::Quit
        } else {
            InputOutcome::Consumed
        }
    }
}
