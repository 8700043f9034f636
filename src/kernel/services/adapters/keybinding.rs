//! 快捷键：按键 → 命令（支持上下文）

use crate::core::event::Key;
use crate::core::event::{KeyCode, KeyModifiers};
use crate::core::Command;
use crate::kernel::services::ports::KeybindingRule;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeybindingContext {
    Global,
    Editor,
    FileList,
}

impl KeybindingContext {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" => Some(Self::Global),
            "editor" => Some(Self::Editor),
            "filelist" | "file_list" | "files" | "sidebar" => Some(Self::FileList),
            _ => None,
        }
    }
}

pub struct KeybindingService {
    global: FxHashMap<Key, Command>,
    editor: FxHashMap<Key, Command>,
    file_list: FxHashMap<Key, Command>,
}

impl KeybindingService {
    pub fn new() -> Self {
        Self::with_defaults()
    }

    pub fn with_defaults() -> Self {
        Self {
            global: default_global_keybindings(),
            editor: default_editor_keybindings(),
            file_list: default_file_list_keybindings(),
        }
    }

    pub fn resolve(&self, context: KeybindingContext, key: &Key) -> Option<&Command> {
        match context {
            KeybindingContext::Global => self.global.get(key),
            KeybindingContext::Editor => self.editor.get(key).or_else(|| self.global.get(key)),
            KeybindingContext::FileList => {
                self.file_list.get(key).or_else(|| self.global.get(key))
            }
        }
    }

    pub fn bind(&mut self, context: KeybindingContext, key: Key, command: Command) {
        self.map_mut(context).insert(key, command);
    }

    pub fn unbind(&mut self, context: KeybindingContext, key: &Key) -> Option<Command> {
        self.map_mut(context).remove(key)
    }

    /// 应用设置文件里的覆盖规则；空命令表示解绑，无法解析的按键被忽略
    pub fn apply_rules(&mut self, rules: &[KeybindingRule]) {
        for rule in rules {
            let Some(key) = super::settings::parse_keybinding(&rule.key) else {
                tracing::warn!(key = %rule.key, "ignoring unparsable keybinding");
                continue;
            };
            let context = rule
                .context
                .as_deref()
                .and_then(KeybindingContext::parse)
                .unwrap_or(KeybindingContext::Global);
            if rule.command.trim().is_empty() {
                let _ = self.unbind(context, &key);
            } else {
                self.bind(context, key, Command::from_name(rule.command.trim()));
            }
        }
    }

    fn map_mut(&mut self, context: KeybindingContext) -> &mut FxHashMap<Key, Command> {
        match context {
            KeybindingContext::Global => &mut self.global,
            KeybindingContext::Editor => &mut self.editor,
            KeybindingContext::FileList => &mut self.file_list,
        }
    }
}

impl Default for KeybindingService {
    fn default() -> Self {
        Self::new()
    }
}

fn default_global_keybindings() -> FxHashMap<Key, Command> {
    let mut bindings = FxHashMap::default();

    bindings.insert(Key::ctrl(KeyCode::Char('q')), Command::Quit);
    bindings.insert(Key::ctrl(KeyCode::Char('n')), Command::NewFile);
    bindings.insert(Key::ctrl(KeyCode::Char('s')), Command::Save);
    bindings.insert(Key::ctrl(KeyCode::Char('w')), Command::CloseTab);
    bindings.insert(Key::ctrl(KeyCode::Tab), Command::NextTab);
    bindings.insert(Key::ctrl_shift(KeyCode::Tab), Command::PrevTab);
    bindings.insert(Key::alt(KeyCode::Right), Command::NextTab);
    bindings.insert(Key::alt(KeyCode::Left), Command::PrevTab);
    bindings.insert(Key::simple(KeyCode::F(5)), Command::RunOrPreview);
    bindings.insert(Key::ctrl(KeyCode::Char('e')), Command::FocusFileList);
    bindings.insert(Key::ctrl(KeyCode::Char('o')), Command::ToggleOutput);
    bindings.insert(Key::ctrl(KeyCode::Char('r')), Command::RefreshFileList);

    bindings
}

fn default_editor_keybindings() -> FxHashMap<Key, Command> {
    let mut bindings = FxHashMap::default();

    bindings.insert(Key::simple(KeyCode::Left), Command::CursorLeft);
    bindings.insert(Key::simple(KeyCode::Right), Command::CursorRight);
    bindings.insert(Key::simple(KeyCode::Up), Command::CursorUp);
    bindings.insert(Key::simple(KeyCode::Down), Command::CursorDown);
    bindings.insert(Key::simple(KeyCode::Home), Command::CursorLineStart);
    bindings.insert(Key::simple(KeyCode::End), Command::CursorLineEnd);
    bindings.insert(Key::ctrl(KeyCode::Home), Command::CursorFileStart);
    bindings.insert(Key::ctrl(KeyCode::End), Command::CursorFileEnd);
    bindings.insert(Key::simple(KeyCode::PageUp), Command::PageUp);
    bindings.insert(Key::simple(KeyCode::PageDown), Command::PageDown);

    bindings.insert(Key::simple(KeyCode::Enter), Command::InsertNewline);
    bindings.insert(Key::simple(KeyCode::Tab), Command::InsertTab);
    bindings.insert(Key::simple(KeyCode::Backspace), Command::DeleteBackward);
    bindings.insert(Key::simple(KeyCode::Delete), Command::DeleteForward);
    bindings.insert(Key::simple(KeyCode::Esc), Command::Escape);

    bindings
}

fn default_file_list_keybindings() -> FxHashMap<Key, Command> {
    let mut bindings = FxHashMap::default();

    bindings.insert(Key::simple(KeyCode::Up), Command::FileListUp);
    bindings.insert(Key::simple(KeyCode::Down), Command::FileListDown);
    bindings.insert(Key::simple(KeyCode::Enter), Command::FileListOpen);
    bindings.insert(Key::simple(KeyCode::Delete), Command::FileListDelete);
    bindings.insert(Key::simple(KeyCode::Esc), Command::FocusEditor);
    bindings.insert(Key::new(KeyCode::Char('d'), KeyModifiers::NONE), Command::FileListDelete);

    bindings
}
