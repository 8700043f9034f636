//! UI 主题：颜色集中管理，渲染代码只通过这里取色。

use crate::kernel::session::HighlightKind;
use crate::kernel::{NoticeLevel, OutputTag};
use ratatui::style::{Color, Style};

#[derive(Debug, Clone)]
pub struct UiTheme {
    pub focus_border: Color,
    pub inactive_border: Color,
    pub accent_fg: Color,
    pub header_fg: Color,
    pub muted_fg: Color,
    pub tab_active_bg: Color,
    pub tab_active_fg: Color,
    pub tab_inactive_fg: Color,
    pub selection_bg: Color,
    pub syntax_comment_fg: Color,
    pub syntax_keyword_fg: Color,
    pub syntax_string_fg: Color,
    pub syntax_number_fg: Color,
    pub syntax_type_fg: Color,
    pub syntax_attribute_fg: Color,
    pub syntax_lifetime_fg: Color,
    pub syntax_function_fg: Color,
    pub output_info_fg: Color,
    pub output_success_fg: Color,
    pub error_fg: Color,
    pub warning_fg: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalColorSupport {
    TrueColor,
    Ansi256,
    Ansi16,
}

pub fn detect_terminal_color_support() -> TerminalColorSupport {
    if let Ok(value) = std::env::var("FUNKIDE_COLOR_SUPPORT") {
        match value.trim().to_ascii_lowercase().as_str() {
            "truecolor" | "24bit" | "rgb" => return TerminalColorSupport::TrueColor,
            "256" | "ansi256" => return TerminalColorSupport::Ansi256,
            "16" | "ansi16" | "basic" => return TerminalColorSupport::Ansi16,
            _ => {}
        }
    }

    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let term = std::env::var("TERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ["truecolor", "24bit", "direct"]
        .iter()
        .any(|needle| colorterm.contains(needle) || term.contains(needle))
    {
        return TerminalColorSupport::TrueColor;
    }

    if term.contains("256color") {
        return TerminalColorSupport::Ansi256;
    }

    TerminalColorSupport::Ansi16
}

impl Default for UiTheme {
    fn default() -> Self {
        Self {
            focus_border: Color::Indexed(6),    // Cyan
            inactive_border: Color::Indexed(8), // DarkGray
            accent_fg: Color::Indexed(3),
            header_fg: Color::Indexed(6),
            muted_fg: Color::Indexed(8),
            tab_active_bg: Color::Indexed(8),
            tab_active_fg: Color::Indexed(15),
            tab_inactive_fg: Color::Indexed(8),
            selection_bg: Color::Indexed(8),
            syntax_comment_fg: Color::Rgb(0x6A, 0x99, 0x55),
            syntax_keyword_fg: Color::Rgb(0x56, 0x9C, 0xD6),
            syntax_string_fg: Color::Rgb(0xCE, 0x91, 0x78),
            syntax_number_fg: Color::Rgb(0xB5, 0xCE, 0xA8),
            syntax_type_fg: Color::Rgb(0x4E, 0xC9, 0xB0),
            syntax_attribute_fg: Color::Rgb(0x4E, 0xC9, 0xB0),
            syntax_lifetime_fg: Color::Rgb(0x56, 0x9C, 0xD6),
            syntax_function_fg: Color::Rgb(0xDC, 0xDC, 0xAA),
            output_info_fg: Color::Indexed(8),
            output_success_fg: Color::Indexed(2), // Green
            error_fg: Color::Indexed(1),          // Red
            warning_fg: Color::Indexed(3),        // Yellow
        }
    }
}

impl UiTheme {
    pub fn adapt_to_terminal_capabilities(&mut self) {
        self.apply_color_support(detect_terminal_color_support());
    }

    fn apply_color_support(&mut self, support: TerminalColorSupport) {
        if support == TerminalColorSupport::TrueColor {
            return;
        }

        for color in [
            &mut self.syntax_comment_fg,
            &mut self.syntax_keyword_fg,
            &mut self.syntax_string_fg,
            &mut self.syntax_number_fg,
            &mut self.syntax_type_fg,
            &mut self.syntax_attribute_fg,
            &mut self.syntax_lifetime_fg,
            &mut self.syntax_function_fg,
        ] {
            *color = map_color_for_support(*color, support);
        }
    }

    pub fn syntax_style(&self, kind: HighlightKind) -> Style {
        let fg = match kind {
            HighlightKind::Comment => self.syntax_comment_fg,
            HighlightKind::String => self.syntax_string_fg,
            HighlightKind::Keyword => self.syntax_keyword_fg,
            HighlightKind::Type => self.syntax_type_fg,
            HighlightKind::Number => self.syntax_number_fg,
            HighlightKind::Attribute => self.syntax_attribute_fg,
            HighlightKind::Lifetime => self.syntax_lifetime_fg,
            HighlightKind::Function => self.syntax_function_fg,
        };
        Style::default().fg(fg)
    }

    pub fn output_style(&self, tag: OutputTag) -> Style {
        let fg = match tag {
            OutputTag::Info => self.output_info_fg,
            OutputTag::Success => self.output_success_fg,
            OutputTag::Error => self.error_fg,
        };
        Style::default().fg(fg)
    }

    pub fn notice_color(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Info => self.focus_border,
            NoticeLevel::Warning => self.warning_fg,
            NoticeLevel::Error => self.error_fg,
        }
    }
}

fn map_color_for_support(color: Color, support: TerminalColorSupport) -> Color {
    match (support, color) {
        (TerminalColorSupport::Ansi256, Color::Rgb(r, g, b)) => {
            Color::Indexed(rgb_to_ansi256_index(r, g, b))
        }
        (TerminalColorSupport::Ansi16, Color::Rgb(r, g, b)) => {
            Color::Indexed(nearest_index(r, g, b, ANSI16_RGB.iter().copied()))
        }
        (_, other) => other,
    }
}

fn rgb_to_ansi256_index(r: u8, g: u8, b: u8) -> u8 {
    nearest_index(r, g, b, (0u16..=255).map(|i| ansi256_index_to_rgb(i as u8)))
}

fn nearest_index(r: u8, g: u8, b: u8, palette: impl Iterator<Item = (u8, u8, u8)>) -> u8 {
    let mut best_index = 0u8;
    let mut best_distance = u32::MAX;
    for (index, (pr, pg, pb)) in palette.enumerate() {
        let dr = i32::from(r) - i32::from(pr);
        let dg = i32::from(g) - i32::from(pg);
        let db = i32::from(b) - i32::from(pb);
        let distance = (dr * dr + dg * dg + db * db) as u32;
        if distance < best_distance {
            best_distance = distance;
            best_index = index as u8;
        }
    }
    best_index
}

fn ansi256_index_to_rgb(index: u8) -> (u8, u8, u8) {
    if index <= 15 {
        return ANSI16_RGB[index as usize];
    }

    if (16..=231).contains(&index) {
        let level = [0u8, 95, 135, 175, 215, 255];
        let offset = index - 16;
        let r = level[(offset / 36) as usize];
        let g = level[((offset / 6) % 6) as usize];
        let b = level[(offset % 6) as usize];
        return (r, g, b);
    }

    let gray = 8u8.saturating_add((index - 232).saturating_mul(10));
    (gray, gray, gray)
}

const ANSI16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];
