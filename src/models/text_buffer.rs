//! 文本缓冲区模型
//!
//! 职责：
//! - 文本存储（Rope）
//! - 光标管理（行 + 字素列）
//! - 行列 ↔ 字符偏移映射

use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use std::io::{self, Write};
use unicode_segmentation::UnicodeSegmentation;

/// 从 RopeSlice 获取字符串，优先零拷贝
pub fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMotion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    FileStart,
    FileEnd,
    PageUp(usize),
    PageDown(usize),
}

#[derive(Clone, Debug)]
pub struct TextBuffer {
    rope: Rope,
    cursor: (usize, usize),
    /// 上下移动时记住的目标列
    preferred_col: Option<usize>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            cursor: (0, 0),
            preferred_col: None,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: (0, 0),
            preferred_col: None,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// 流式写入到 Writer，避免大文件整体拷贝
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for chunk in self.rope.chunks() {
            writer.write_all(chunk.as_bytes())?;
        }
        Ok(())
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// 设置光标，超出范围时夹到最近的合法位置
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        let row = row.min(self.last_row());
        let col = col.min(self.line_grapheme_len(row));
        self.cursor = (row, col);
        self.preferred_col = None;
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn line_slice(&self, row: usize) -> Option<RopeSlice<'_>> {
        (row < self.rope.len_lines()).then(|| self.rope.line(row))
    }

    pub fn pos_to_char(&self, pos: (usize, usize)) -> usize {
        self.rope.line_to_char(pos.0) + self.grapheme_to_char_index(pos.0, pos.1)
    }

    pub fn grapheme_to_char_index(&self, row: usize, grapheme_index: usize) -> usize {
        let line = slice_to_cow(self.rope.line(row));
        line.graphemes(true)
            .take(grapheme_index)
            .map(|g| g.chars().count())
            .sum()
    }

    pub fn line_grapheme_len(&self, row: usize) -> usize {
        if row >= self.rope.len_lines() {
            return 0;
        }
        let line = slice_to_cow(self.rope.line(row));
        strip_line_ending(&line).graphemes(true).count()
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        let mut tmp = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut tmp))
    }

    pub fn insert_str(&mut self, s: &str) -> bool {
        if s.is_empty() {
            return false;
        }
        let char_offset = self.pos_to_char(self.cursor);
        self.rope.insert(char_offset, s);
        self.cursor = self.char_to_pos(char_offset + s.chars().count());
        self.preferred_col = None;
        true
    }

    /// Backspace
    pub fn delete_backward(&mut self) -> bool {
        let (row, col) = self.cursor;
        let (start, end) = if col > 0 {
            (self.pos_to_char((row, col - 1)), self.pos_to_char((row, col)))
        } else if row > 0 {
            let end = self.rope.line_to_char(row);
            let prev = slice_to_cow(self.rope.line(row - 1));
            let ending = prev.chars().count() - strip_line_ending(&prev).chars().count();
            (end - ending.max(1), end)
        } else {
            return false;
        };

        self.rope.remove(start..end);
        self.cursor = self.char_to_pos(start);
        self.preferred_col = None;
        true
    }

    /// Delete
    pub fn delete_forward(&mut self) -> bool {
        let (row, col) = self.cursor;
        let start = self.pos_to_char((row, col));
        let end = if col < self.line_grapheme_len(row) {
            self.pos_to_char((row, col + 1))
        } else if row + 1 < self.rope.len_lines() {
            self.rope.line_to_char(row + 1)
        } else {
            return false;
        };

        self.rope.remove(start..end);
        self.preferred_col = None;
        true
    }

    /// 移动光标，返回光标是否变化
    pub fn move_cursor(&mut self, motion: CursorMotion) -> bool {
        let before = self.cursor;
        let (row, col) = before;
        let last_row = self.last_row();

        match motion {
            CursorMotion::Left => {
                if col > 0 {
                    self.cursor = (row, col - 1);
                } else if row > 0 {
                    self.cursor = (row - 1, self.line_grapheme_len(row - 1));
                }
                self.preferred_col = None;
            }
            CursorMotion::Right => {
                if col < self.line_grapheme_len(row) {
                    self.cursor = (row, col + 1);
                } else if row < last_row {
                    self.cursor = (row + 1, 0);
                }
                self.preferred_col = None;
            }
            CursorMotion::Up => self.move_vertical(row.saturating_sub(1)),
            CursorMotion::Down => self.move_vertical((row + 1).min(last_row)),
            CursorMotion::PageUp(lines) => self.move_vertical(row.saturating_sub(lines.max(1))),
            CursorMotion::PageDown(lines) => {
                self.move_vertical(row.saturating_add(lines.max(1)).min(last_row))
            }
            CursorMotion::LineStart => {
                self.cursor = (row, 0);
                self.preferred_col = None;
            }
            CursorMotion::LineEnd => {
                self.cursor = (row, self.line_grapheme_len(row));
                self.preferred_col = None;
            }
            CursorMotion::FileStart => {
                self.cursor = (0, 0);
                self.preferred_col = None;
            }
            CursorMotion::FileEnd => {
                self.cursor = (last_row, self.line_grapheme_len(last_row));
                self.preferred_col = None;
            }
        }

        self.cursor != before
    }

    fn move_vertical(&mut self, target_row: usize) {
        let want = *self.preferred_col.get_or_insert(self.cursor.1);
        let col = want.min(self.line_grapheme_len(target_row));
        self.cursor = (target_row, col);
    }

    fn last_row(&self) -> usize {
        self.rope.len_lines().saturating_sub(1)
    }

    fn char_to_pos(&self, char_idx: usize) -> (usize, usize) {
        let char_idx = char_idx.min(self.rope.len_chars());
        let row = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(row);
        let prefix = self.rope.slice(line_start..char_idx);
        let col = slice_to_cow(prefix).graphemes(true).count();
        (row, col)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
