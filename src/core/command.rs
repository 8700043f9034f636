//! 命令系统：语义命令定义
//!
//! Command 只描述"做什么"，不关心具体按键；按键映射见 KeybindingService。

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // ==================== 光标移动 ====================
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorLineStart,
    CursorLineEnd,
    CursorFileStart,
    CursorFileEnd,
    PageUp,
    PageDown,

    // ==================== 编辑操作 ====================
    InsertChar(char),
    InsertNewline,
    InsertTab,
    DeleteBackward,
    DeleteForward,

    // ==================== 文件操作 ====================
    NewFile,
    Save,
    CloseTab,
    NextTab,
    PrevTab,
    RunOrPreview,
    RefreshFileList,

    // ==================== 文件列表 ====================
    FileListUp,
    FileListDown,
    FileListOpen,
    FileListDelete,

    // ==================== 视图操作 ====================
    FocusFileList,
    FocusEditor,
    ToggleOutput,
    Escape,

    // ==================== 系统操作 ====================
    Quit,

    // ==================== 扩展点 ====================
    Custom(String),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::CursorLeft => "cursorLeft",
            Command::CursorRight => "cursorRight",
            Command::CursorUp => "cursorUp",
            Command::CursorDown => "cursorDown",
            Command::CursorLineStart => "cursorLineStart",
            Command::CursorLineEnd => "cursorLineEnd",
            Command::CursorFileStart => "cursorFileStart",
            Command::CursorFileEnd => "cursorFileEnd",
            Command::PageUp => "pageUp",
            Command::PageDown => "pageDown",
            Command::InsertChar(_) => "insertChar",
            Command::InsertNewline => "insertNewline",
            Command::InsertTab => "insertTab",
            Command::DeleteBackward => "deleteBackward",
            Command::DeleteForward => "deleteForward",
            Command::NewFile => "newFile",
            Command::Save => "save",
            Command::CloseTab => "closeTab",
            Command::NextTab => "nextTab",
            Command::PrevTab => "prevTab",
            Command::RunOrPreview => "runOrPreview",
            Command::RefreshFileList => "refreshFileList",
            Command::FileListUp => "fileListUp",
            Command::FileListDown => "fileListDown",
            Command::FileListOpen => "fileListOpen",
            Command::FileListDelete => "fileListDelete",
            Command::FocusFileList => "focusFileList",
            Command::FocusEditor => "focusEditor",
            Command::ToggleOutput => "toggleOutput",
            Command::Escape => "escape",
            Command::Quit => "quit",
            Command::Custom(name) => name,
        }
    }

    /// 从名称解析命令；未知名称保留为 Custom
    pub fn from_name(name: &str) -> Command {
        match name {
            "cursorLeft" => Command::CursorLeft,
            "cursorRight" => Command::CursorRight,
            "cursorUp" => Command::CursorUp,
            "cursorDown" => Command::CursorDown,
            "cursorLineStart" => Command::CursorLineStart,
            "cursorLineEnd" => Command::CursorLineEnd,
            "cursorFileStart" => Command::CursorFileStart,
            "cursorFileEnd" => Command::CursorFileEnd,
            "pageUp" => Command::PageUp,
            "pageDown" => Command::PageDown,
            "insertNewline" => Command::InsertNewline,
            "insertTab" => Command::InsertTab,
            "deleteBackward" => Command::DeleteBackward,
            "deleteForward" => Command::DeleteForward,
            "newFile" => Command::NewFile,
            "save" => Command::Save,
            "closeTab" => Command::CloseTab,
            "nextTab" => Command::NextTab,
            "prevTab" => Command::PrevTab,
            "runOrPreview" => Command::RunOrPreview,
            "refreshFileList" => Command::RefreshFileList,
            "fileListUp" => Command::FileListUp,
            "fileListDown" => Command::FileListDown,
            "fileListOpen" => Command::FileListOpen,
            "fileListDelete" => Command::FileListDelete,
            "focusFileList" => Command::FocusFileList,
            "focusEditor" => Command::FocusEditor,
            "toggleOutput" => Command::ToggleOutput,
            "escape" => Command::Escape,
            "quit" => Command::Quit,
            other => Command::Custom(other.to_string()),
        }
    }

    /// 是否会修改缓冲区内容
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Command::InsertChar(_)
                | Command::InsertNewline
                | Command::InsertTab
                | Command::DeleteBackward
                | Command::DeleteForward
        )
    }
}
