use super::paths::get_app_dir;
use crate::core::event::Key;
use crate::kernel::services::ports::settings::Settings;
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

pub fn get_settings_path() -> Option<PathBuf> {
    get_app_dir().map(|dir| dir.join(SETTINGS_FILE))
}

pub fn ensure_settings_file() -> std::io::Result<PathBuf> {
    let path = get_settings_path().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine settings directory",
        )
    })?;
    write_default_settings(&path)?;
    Ok(path)
}

fn write_default_settings(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content =
            serde_json::to_string_pretty(&Settings::default()).unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub fn load_settings() -> Option<Settings> {
    load_settings_from(&get_settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
            None
        }
    }
}

pub fn parse_keybinding(value: &str) -> Option<Key> {
    let mut modifiers = KeyModifiers::NONE;
    let mut key_part: Option<&str> = None;
    for part in value.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" | "option" => modifiers |= KeyModifiers::ALT,
            _ => key_part = Some(part),
        }
    }
    let mut code = parse_key_code(key_part?)?;
    if let KeyCode::Char(ch) = code {
        if ch.is_ascii_uppercase() {
            code = KeyCode::Char(ch.to_ascii_lowercase());
            modifiers |= KeyModifiers::SHIFT;
        }
    }
    Some(Key::new(code, modifiers))
}

fn parse_key_code(value: &str) -> Option<KeyCode> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }

    let code = match v.to_ascii_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        lc if lc.len() > 1 && lc.starts_with('f') => KeyCode::F(lc[1..].parse::<u8>().ok()?),
        _ => {
            let mut chars = v.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };

    Some(code)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
