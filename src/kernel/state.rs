use crate::kernel::output::OutputPanel;
use crate::kernel::services::ports::EditorConfig;
use crate::kernel::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Editor,
    FileList,
}

/// 存储目录的文件列表；每次刷新都重新读盘
#[derive(Debug, Clone, Default)]
pub struct FileListState {
    pub entries: Vec<String>,
    pub selected: usize,
    pub scroll: usize,
    pub view_height: usize,
}

impl FileListState {
    /// 替换列表内容，尽量保持原来选中的文件
    pub fn set_entries(&mut self, entries: Vec<String>) -> bool {
        if entries == self.entries {
            return false;
        }
        let prev = self.selected_name().map(str::to_string);
        self.entries = entries;
        self.selected = prev
            .and_then(|name| self.entries.iter().position(|e| *e == name))
            .unwrap_or_else(|| self.selected.min(self.entries.len().saturating_sub(1)));
        self.clamp_scroll();
        true
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.entries.get(self.selected).map(String::as_str)
    }

    pub fn move_selection(&mut self, delta: isize) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let max = self.entries.len() - 1;
        let next = (self.selected as isize + delta).clamp(0, max as isize) as usize;
        if next == self.selected {
            return false;
        }
        self.selected = next;
        self.clamp_scroll();
        true
    }

    pub fn select(&mut self, name: &str) -> bool {
        let Some(idx) = self.entries.iter().position(|e| e == name) else {
            return false;
        };
        let changed = idx != self.selected;
        self.selected = idx;
        self.clamp_scroll();
        changed
    }

    pub fn set_view_height(&mut self, height: usize) -> bool {
        if self.view_height == height {
            return false;
        }
        self.view_height = height;
        self.clamp_scroll();
        true
    }

    fn clamp_scroll(&mut self) {
        let height = self.view_height.max(1);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + height {
            self.scroll = self.selected + 1 - height;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSave {
    Nothing,
    CloseBuffer,
    /// 退出流程中：继续保存下一个脏缓冲区
    ContinueQuit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDialogKind {
    SaveAs { filename: String, then: AfterSave },
}

#[derive(Debug, Clone, Default)]
pub struct InputDialogState {
    pub visible: bool,
    pub title: String,
    pub value: String,
    pub cursor: usize,
    pub error: Option<String>,
    pub kind: Option<InputDialogKind>,
}

impl InputDialogState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// 关闭有未保存修改的缓冲区：保存 / 不保存 / 取消
    CloseBuffer { filename: String },
    ConfirmOverwrite {
        filename: String,
        target: String,
        then: AfterSave,
    },
    DeleteFile { filename: String },
    /// 退出前：全部保存 / 直接退出 / 取消
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmDialogState {
    pub visible: bool,
    pub title: String,
    pub message: String,
    /// 三选一（是 / 否 / 取消）；否则只有确认与取消
    pub three_way: bool,
    pub on_confirm: Option<PendingAction>,
}

impl ConfirmDialogState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeLevel {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeState {
    pub visible: bool,
    pub title: String,
    pub message: String,
    pub level: NoticeLevel,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub focus: FocusTarget,
    pub input_dialog: InputDialogState,
    pub confirm_dialog: ConfirmDialogState,
    pub notice: NoticeState,
    pub status_message: Option<String>,
    pub editor_view_height: usize,
    /// 编辑区去掉行号栏后的文本列数
    pub editor_view_width: usize,
    pub should_quit: bool,
}

impl UiState {
    pub fn has_modal(&self) -> bool {
        self.notice.visible || self.confirm_dialog.visible || self.input_dialog.visible
    }
}

#[derive(Debug)]
pub struct AppState {
    pub session: Session,
    pub file_list: FileListState,
    pub output: OutputPanel,
    pub ui: UiState,
    pub config: EditorConfig,
}

impl AppState {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            session: Session::new(),
            file_list: FileListState::default(),
            output: OutputPanel::default(),
            ui: UiState::default(),
            config,
        }
    }

    /// 窗口标题：`funkide - <当前文件>[*]`
    pub fn title(&self) -> String {
        match self.session.current() {
            Some(buffer) => format!(
                "funkide - {}{}",
                buffer.filename(),
                if buffer.is_dirty() { "*" } else { "" }
            ),
            None => "funkide".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
