//! 编辑会话：文件名 → 缓冲区的有序映射，以及 `current` 指针
//!
//! 不变式：会话非空时 `current` 必定指向一个存活的缓冲区；会话为空时 `current` 为 `None`。
//! 所有磁盘访问都经由 `StorageProvider`。

pub mod naming;
pub mod syntax;

pub use naming::{extension_of, is_untitled, untitled_name, validate_name};
pub use syntax::{HighlightKind, HighlightSpan, LanguageId, SyntaxDocument};

use crate::kernel::error::EditorError;
use crate::kernel::services::ports::StorageProvider;
use crate::models::{slice_to_cow, CursorMotion, TextBuffer};
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// 一次编辑的结果；`became_dirty` 只在 clean → dirty 的那一次为 true
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditOutcome {
    pub changed: bool,
    pub became_dirty: bool,
}

pub struct Buffer {
    id: BufferId,
    filename: String,
    text: TextBuffer,
    dirty: bool,
    edit_version: u64,
    syntax: Option<SyntaxDocument>,
    highlights: Vec<Vec<HighlightSpan>>,
    highlighted_version: u64,
    scroll: usize,
    horiz_offset: usize,
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("dirty", &self.dirty)
            .field("edit_version", &self.edit_version)
            .field("language", &self.syntax.as_ref().map(|s| s.language()))
            .finish_non_exhaustive()
    }
}

impl Buffer {
    fn new(id: BufferId, filename: String, content: &str, dirty: bool) -> Self {
        let mut buffer = Self {
            id,
            filename,
            text: TextBuffer::from_text(content),
            dirty,
            edit_version: 0,
            syntax: None,
            highlights: Vec::new(),
            highlighted_version: 0,
            scroll: 0,
            horiz_offset: 0,
        };
        buffer.rebuild_syntax();
        buffer
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    pub fn content(&self) -> String {
        self.text.text()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn edit_version(&self) -> u64 {
        self.edit_version
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.text.cursor()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// 行首被滚出视口的显示列数
    pub fn horiz_offset(&self) -> usize {
        self.horiz_offset
    }

    /// 光标前的显示宽度；制表符按 `tab_width` 列计
    pub fn cursor_display_col(&self, tab_width: usize) -> usize {
        let (row, col) = self.text.cursor();
        let Some(slice) = self.text.line_slice(row) else {
            return 0;
        };
        slice_to_cow(slice)
            .graphemes(true)
            .take(col)
            .take_while(|g| *g != "\n" && *g != "\r\n")
            .map(|g| if g == "\t" { tab_width } else { g.width() })
            .sum()
    }

    pub fn language(&self) -> Option<LanguageId> {
        self.syntax.as_ref().map(|s| s.language())
    }

    /// 最近一次解析得到的高亮；编辑后、重新解析前可能与文本不一致
    pub fn highlights(&self) -> &[Vec<HighlightSpan>] {
        &self.highlights
    }

    pub fn highlights_stale(&self) -> bool {
        self.syntax.is_some() && self.highlighted_version != self.edit_version
    }

    pub fn insert_char(&mut self, c: char) -> EditOutcome {
        let changed = self.text.insert_char(c);
        self.after_edit(changed)
    }

    pub fn insert_str(&mut self, s: &str) -> EditOutcome {
        let changed = self.text.insert_str(s);
        self.after_edit(changed)
    }

    pub fn delete_backward(&mut self) -> EditOutcome {
        let changed = self.text.delete_backward();
        self.after_edit(changed)
    }

    pub fn delete_forward(&mut self) -> EditOutcome {
        let changed = self.text.delete_forward();
        self.after_edit(changed)
    }

    pub fn move_cursor(&mut self, motion: CursorMotion) -> bool {
        self.text.move_cursor(motion)
    }

    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.text.set_cursor(row, col);
    }

    /// 调整滚动使光标落在 `height` 行、`width` 列的视口内；尺寸为 0 表示尚未布局，对应方向不动
    pub fn ensure_cursor_visible(
        &mut self,
        height: usize,
        width: usize,
        tab_width: usize,
    ) -> bool {
        let (row, _) = self.text.cursor();
        let prev = (self.scroll, self.horiz_offset);
        if height > 0 {
            if row < self.scroll {
                self.scroll = row;
            } else if row >= self.scroll + height {
                self.scroll = row + 1 - height;
            }
        }
        if width > 0 {
            let x = self.cursor_display_col(tab_width);
            if x < self.horiz_offset {
                self.horiz_offset = x;
            } else if x >= self.horiz_offset + width {
                self.horiz_offset = x + 1 - width;
            }
        }
        (self.scroll, self.horiz_offset) != prev
    }

    /// 重新解析并刷新高亮；没有语法的缓冲区什么都不做
    pub fn refresh_syntax(&mut self) {
        let Some(syntax) = self.syntax.as_mut() else {
            self.highlights.clear();
            return;
        };
        syntax.reparse(self.text.rope());
        self.highlights = syntax.highlight_all(self.text.rope());
        self.highlighted_version = self.edit_version;
    }

    /// 按当前扩展名重新选择语法（新建、打开、改名时）
    fn rebuild_syntax(&mut self) {
        let ext = extension_of(&self.filename);
        self.syntax = SyntaxDocument::for_extension(&ext, self.text.rope());
        self.highlights = match &self.syntax {
            Some(syntax) => syntax.highlight_all(self.text.rope()),
            None => Vec::new(),
        };
        self.highlighted_version = self.edit_version;
    }

    fn after_edit(&mut self, changed: bool) -> EditOutcome {
        if !changed {
            return EditOutcome::default();
        }
        self.edit_version += 1;
        let became_dirty = !self.dirty;
        self.dirty = true;
        EditOutcome {
            changed: true,
            became_dirty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// 已经打开，只切换 current
    Switched,
    Opened,
}

#[derive(Debug, Clone, Copy)]
pub struct SaveRequest<'a> {
    pub filename: &'a str,
    pub target: Option<&'a str>,
    pub overwrite_confirmed: bool,
}

impl<'a> SaveRequest<'a> {
    pub fn plain(filename: &'a str) -> Self {
        Self {
            filename,
            target: None,
            overwrite_confirmed: false,
        }
    }

    pub fn named(filename: &'a str, target: &'a str) -> Self {
        Self {
            filename,
            target: Some(target),
            overwrite_confirmed: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.overwrite_confirmed = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 未命名缓冲区需要先给出文件名
    NeedsName { suggested: String },
    /// 目标文件已存在且不是原名，需要确认覆盖
    NeedsOverwrite { target: String },
    Saved {
        filename: String,
        renamed_from: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    SaveThenClose,
    Discard,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// 缓冲区有未保存修改，需要三选一
    NeedsDecision,
    Aborted,
    /// 选择了保存后关闭，但保存还需要进一步输入；缓冲区仍然打开
    SavePending(SaveOutcome),
}

#[derive(Debug, Default)]
pub struct Session {
    buffers: Vec<Buffer>,
    current: Option<String>,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.index_of(filename).is_some()
    }

    pub fn buffer(&self, filename: &str) -> Option<&Buffer> {
        self.buffers.iter().find(|b| b.filename == filename)
    }

    pub fn buffer_mut(&mut self, filename: &str) -> Option<&mut Buffer> {
        self.buffers.iter_mut().find(|b| b.filename == filename)
    }

    pub fn find_by_id(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.buffers.iter_mut().find(|b| b.id == id)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&Buffer> {
        self.buffer(self.current.as_deref()?)
    }

    pub fn current_mut(&mut self) -> Option<&mut Buffer> {
        let name = self.current.clone()?;
        self.buffer_mut(&name)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index_of(self.current.as_deref()?)
    }

    /// 按标签顺序列出有未保存修改的文件名
    pub fn dirty_names(&self) -> Vec<String> {
        self.buffers
            .iter()
            .filter(|b| b.dirty)
            .map(|b| b.filename.clone())
            .collect()
    }

    pub fn has_dirty(&self) -> bool {
        self.buffers.iter().any(|b| b.dirty)
    }

    /// 已打开就切换过去，否则从存储读入一个干净的缓冲区
    pub fn open(
        &mut self,
        storage: &dyn StorageProvider,
        filename: &str,
    ) -> Result<OpenOutcome, EditorError> {
        if self.contains(filename) {
            self.current = Some(filename.to_string());
            return Ok(OpenOutcome::Switched);
        }

        let content = storage.read(filename).map_err(|source| EditorError::Read {
            filename: filename.to_string(),
            source,
        })?;
        let id = self.alloc_id();
        self.buffers
            .push(Buffer::new(id, filename.to_string(), &content, false));
        self.current = Some(filename.to_string());
        tracing::info!(filename, "buffer opened");
        Ok(OpenOutcome::Opened)
    }

    /// 新建 `Untitled-<n>.<ext>`：n 取第一个既不是已打开缓冲区、也不在磁盘上的编号
    pub fn new_untitled(&mut self, storage: &dyn StorageProvider, extension: &str) -> String {
        let mut n = 1;
        let name = loop {
            let candidate = untitled_name(n, extension);
            if !self.contains(&candidate) && !storage.exists(&candidate) {
                break candidate;
            }
            n += 1;
        };

        let id = self.alloc_id();
        self.buffers.push(Buffer::new(id, name.clone(), "", true));
        self.current = Some(name.clone());
        tracing::info!(filename = %name, "untitled buffer created");
        name
    }

    pub fn switch_to(&mut self, filename: &str) -> bool {
        if !self.contains(filename) || self.current.as_deref() == Some(filename) {
            return false;
        }
        self.current = Some(filename.to_string());
        true
    }

    /// 按标签顺序循环切换，首尾相接
    pub fn cycle(&mut self, delta: isize) -> bool {
        let len = self.buffers.len();
        if len < 2 {
            return false;
        }
        let Some(idx) = self.current_index() else {
            return false;
        };
        let next = (idx as isize + delta).rem_euclid(len as isize) as usize;
        self.current = Some(self.buffers[next].filename.clone());
        next != idx
    }

    pub fn save(
        &mut self,
        storage: &dyn StorageProvider,
        request: SaveRequest<'_>,
    ) -> Result<SaveOutcome, EditorError> {
        let idx = self
            .index_of(request.filename)
            .ok_or_else(|| EditorError::UnknownBuffer(request.filename.to_string()))?;

        let target = match request.target {
            Some(raw) => validate_name(raw)?,
            None if is_untitled(request.filename) => {
                return Ok(SaveOutcome::NeedsName {
                    suggested: request.filename.to_string(),
                });
            }
            None => request.filename.to_string(),
        };

        let renamed = target != request.filename;
        if renamed {
            if self.contains(&target) {
                return Err(EditorError::NameInUse(target));
            }
            if storage.exists(&target) && !request.overwrite_confirmed {
                return Ok(SaveOutcome::NeedsOverwrite { target });
            }
        }

        let buffer = &mut self.buffers[idx];
        storage
            .write(&target, &buffer.text.text())
            .map_err(|source| EditorError::Write {
                filename: target.clone(),
                source,
            })?;
        buffer.dirty = false;

        let renamed_from = if renamed {
            let old = std::mem::replace(&mut buffer.filename, target.clone());
            if extension_of(&old) != extension_of(&target) {
                buffer.rebuild_syntax();
            }
            if self.current.as_deref() == Some(old.as_str()) {
                self.current = Some(target.clone());
            }
            Some(old)
        } else {
            None
        };

        tracing::info!(filename = %target, renamed_from = ?renamed_from, "buffer saved");
        Ok(SaveOutcome::Saved {
            filename: target,
            renamed_from,
        })
    }

    pub fn close(
        &mut self,
        storage: &dyn StorageProvider,
        filename: &str,
        decision: Option<CloseDecision>,
    ) -> Result<CloseOutcome, EditorError> {
        let Some(buffer) = self.buffer(filename) else {
            return Err(EditorError::UnknownBuffer(filename.to_string()));
        };

        if !buffer.dirty {
            self.remove_buffer(filename);
            return Ok(CloseOutcome::Closed);
        }

        match decision {
            None => Ok(CloseOutcome::NeedsDecision),
            Some(CloseDecision::Abort) => Ok(CloseOutcome::Aborted),
            Some(CloseDecision::Discard) => {
                self.remove_buffer(filename);
                Ok(CloseOutcome::Closed)
            }
            Some(CloseDecision::SaveThenClose) => {
                match self.save(storage, SaveRequest::plain(filename))? {
                    SaveOutcome::Saved { filename, .. } => {
                        self.remove_buffer(&filename);
                        Ok(CloseOutcome::Closed)
                    }
                    pending => Ok(CloseOutcome::SavePending(pending)),
                }
            }
        }
    }

    /// 先删磁盘文件，成功后才强制关闭对应缓冲区（不询问未保存修改）
    ///
    /// 返回是否关闭了一个打开的缓冲区。
    pub fn delete(
        &mut self,
        storage: &dyn StorageProvider,
        filename: &str,
    ) -> Result<bool, EditorError> {
        storage
            .remove(filename)
            .map_err(|source| EditorError::Delete {
                filename: filename.to_string(),
                source,
            })?;
        let closed = self.remove_buffer(filename).is_some();
        tracing::info!(filename, closed, "file deleted");
        Ok(closed)
    }

    /// 强制移除缓冲区并维护 current
    pub fn remove_buffer(&mut self, filename: &str) -> Option<Buffer> {
        let idx = self.index_of(filename)?;
        let removed = self.buffers.remove(idx);
        if self.current.as_deref() == Some(filename) {
            self.current = self.buffers.first().map(|b| b.filename.clone());
        }
        Some(removed)
    }

    fn index_of(&self, filename: &str) -> Option<usize> {
        self.buffers.iter().position(|b| b.filename == filename)
    }

    fn alloc_id(&mut self) -> BufferId {
        self.next_id += 1;
        BufferId(self.next_id)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/session.rs"]
mod tests;
