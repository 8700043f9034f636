//! 工作台模块：持有 Store，负责输入分发、effect 执行与渲染

use super::theme::UiTheme;
use crate::core::event::InputEvent;
use crate::kernel::services::adapters::{AppMessage, AsyncRuntime, KeybindingService};
use crate::kernel::services::ports::{Settings, StorageProvider};
use crate::kernel::{Action as KernelAction, AppState, Effect, FocusTarget, Store};
use ratatui::layout::Rect;
use ratatui::Frame;
use std::sync::mpsc::Receiver;

mod input;
mod render;
mod tick;
mod util;

const HEADER_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;
const TABS_HEIGHT: u16 = 1;
const FILE_LIST_WIDTH_PERCENT: u16 = 22;
const FILE_LIST_MIN_WIDTH: u16 = 16;
const MAX_RUNTIME_DRAIN_PER_TICK: usize = 256;
const MOUSE_SCROLL_STEP: isize = 3;

/// 一次输入事件的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Consumed,
    Ignored,
    Quit,
}

impl InputOutcome {
    pub fn is_consumed(self) -> bool {
        self == InputOutcome::Consumed
    }

    pub fn is_quit(self) -> bool {
        self == InputOutcome::Quit
    }

    /// 被忽略的事件不会改变画面
    pub fn needs_redraw(self) -> bool {
        self != InputOutcome::Ignored
    }
}

pub struct Workbench {
    store: Store,
    runtime: AsyncRuntime,
    runtime_rx: Receiver<AppMessage>,
    keybindings: KeybindingService,
    theme: UiTheme,
    last_render_area: Option<Rect>,
    last_file_list_area: Option<Rect>,
    last_tabs_area: Option<Rect>,
    last_tab_ranges: Vec<(u16, u16)>,
    last_editor_area: Option<Rect>,
    last_output_area: Option<Rect>,
}

impl Workbench {
    pub fn new(
        storage: Box<dyn StorageProvider>,
        settings: Settings,
        runtime: AsyncRuntime,
        runtime_rx: Receiver<AppMessage>,
    ) -> Self {
        let mut keybindings = KeybindingService::new();
        keybindings.apply_rules(&settings.keybindings);

        let mut theme = UiTheme::default();
        if !cfg!(test) {
            theme.adapt_to_terminal_capabilities();
        }

        let store = Store::new(AppState::new(settings.editor), storage);
        tracing::info!(
            root = %store.storage().root().display(),
            files = store.state().file_list.entries.len(),
            "workbench ready"
        );

        Self {
            store,
            runtime,
            runtime_rx,
            keybindings,
            theme,
            last_render_area: None,
            last_file_list_area: None,
            last_tabs_area: None,
            last_tab_ranges: Vec::new(),
            last_editor_area: None,
            last_output_area: None,
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn focus(&self) -> FocusTarget {
        self.store.state().ui.focus
    }

    pub fn should_quit(&self) -> bool {
        self.store.state().ui.should_quit
    }

    pub fn title(&self) -> String {
        self.store.state().title()
    }

    pub(super) fn dispatch_kernel(&mut self, action: KernelAction) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RunScript {
                run_id,
                program,
                script,
                cwd,
            } => self.runtime.run_script(run_id, program, script, cwd),
            Effect::RenderPreview { source, target } => {
                self.runtime.render_preview(source, target)
            }
        }
    }
}

impl Workbench {
    pub fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        input::handle_input(self, event)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        render::render(self, frame, area);
    }

    /// 终端光标位置；弹窗或焦点不在编辑区时为 `None`
    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        render::cursor_position(self)
    }
}
