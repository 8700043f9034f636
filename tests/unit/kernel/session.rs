use super::*;
use crate::kernel::services::ports::{StorageError, StorageResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Default)]
struct MemoryStorage {
    files: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
    fail_removes: Cell<bool>,
    root: PathBuf,
}

impl MemoryStorage {
    fn with(files: &[(&str, &str)]) -> Self {
        let storage = Self::default();
        for (name, content) in files {
            storage
                .files
                .borrow_mut()
                .insert(name.to_string(), content.to_string());
        }
        storage
    }

    fn get(&self, name: &str) -> Option<String> {
        self.files.borrow().get(name).cloned()
    }
}

impl StorageProvider for MemoryStorage {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self.files.borrow().keys().cloned().collect())
    }

    fn read(&self, name: &str) -> StorageResult<String> {
        self.get(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn write(&self, name: &str, content: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into());
        }
        self.files
            .borrow_mut()
            .insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.files.borrow().contains_key(name)
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        if self.fail_removes.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "busy").into());
        }
        self.files
            .borrow_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}

fn type_text(buffer: &mut Buffer, text: &str) {
    for ch in text.chars() {
        buffer.insert_char(ch);
    }
}

#[test]
fn open_then_close_without_edits_leaves_disk_unchanged() {
    let storage = MemoryStorage::with(&[("a.py", "print(1)\n")]);
    let mut session = Session::new();

    assert_eq!(session.open(&storage, "a.py").unwrap(), OpenOutcome::Opened);
    assert!(!session.current().unwrap().is_dirty());

    let outcome = session.close(&storage, "a.py", None).unwrap();
    assert_eq!(outcome, CloseOutcome::Closed);
    assert!(session.is_empty());
    assert_eq!(session.current_name(), None);
    assert_eq!(storage.get("a.py").as_deref(), Some("print(1)\n"));
}

#[test]
fn open_live_buffer_only_switches() {
    let storage = MemoryStorage::with(&[("a.py", "x"), ("b.py", "y")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    session.open(&storage, "b.py").unwrap();
    type_text(session.buffer_mut("a.py").unwrap(), "!");

    assert_eq!(session.open(&storage, "a.py").unwrap(), OpenOutcome::Switched);
    assert_eq!(session.current_name(), Some("a.py"));
    assert_eq!(session.len(), 2);
    assert_eq!(session.current().unwrap().content(), "!x");
}

#[test]
fn open_missing_file_is_read_error() {
    let storage = MemoryStorage::default();
    let mut session = Session::new();

    let err = session.open(&storage, "gone.py").unwrap_err();
    assert!(matches!(err, EditorError::Read { ref filename, .. } if filename == "gone.py"));
    assert!(session.is_empty());
}

#[test]
fn first_edit_sets_dirty_once_and_save_clears_it() {
    let storage = MemoryStorage::with(&[("a.py", "")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();

    let buffer = session.current_mut().unwrap();
    let first = buffer.insert_char('a');
    let second = buffer.insert_char('b');
    assert_eq!(
        first,
        EditOutcome {
            changed: true,
            became_dirty: true
        }
    );
    assert_eq!(
        second,
        EditOutcome {
            changed: true,
            became_dirty: false
        }
    );
    assert!(buffer.is_dirty());

    session.save(&storage, SaveRequest::plain("a.py")).unwrap();
    assert!(!session.current().unwrap().is_dirty());
    assert_eq!(storage.get("a.py").as_deref(), Some("ab"));
}

#[test]
fn edit_without_text_change_keeps_clean() {
    let storage = MemoryStorage::with(&[("a.py", "x")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();

    let buffer = session.current_mut().unwrap();
    assert_eq!(buffer.delete_backward(), EditOutcome::default());
    assert!(!buffer.is_dirty());
    assert_eq!(buffer.edit_version(), 0);
}

#[test]
fn new_twice_gives_sequential_dirty_untitled_buffers() {
    let storage = MemoryStorage::default();
    let mut session = Session::new();

    assert_eq!(session.new_untitled(&storage, "py"), "Untitled-1.py");
    assert_eq!(session.new_untitled(&storage, "py"), "Untitled-2.py");
    assert!(session.buffers().iter().all(|b| b.is_dirty()));
    assert_eq!(session.current_name(), Some("Untitled-2.py"));
}

#[test]
fn new_skips_names_on_disk_and_open() {
    let storage = MemoryStorage::with(&[("Untitled-1.py", ""), ("Untitled-3.py", "")]);
    let mut session = Session::new();
    session.open(&storage, "Untitled-3.py").unwrap();

    assert_eq!(session.new_untitled(&storage, "py"), "Untitled-2.py");
    assert_eq!(session.new_untitled(&storage, "py"), "Untitled-4.py");
    assert_eq!(session.new_untitled(&storage, "md"), "Untitled-1.md");
}

#[test]
fn scenario_edit_and_save_keeps_file_list_order() {
    let storage = MemoryStorage::with(&[("a.py", "print(1)"), ("b.md", "# b")]);
    let before = storage.list().unwrap();
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();

    let buffer = session.current_mut().unwrap();
    buffer.move_cursor(CursorMotion::LineEnd);
    buffer.delete_backward();
    buffer.delete_backward();
    type_text(buffer, "2)");
    assert!(buffer.is_dirty());

    let outcome = session.save(&storage, SaveRequest::plain("a.py")).unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            filename: "a.py".to_string(),
            renamed_from: None
        }
    );
    assert_eq!(storage.get("a.py").as_deref(), Some("print(2)"));
    assert!(!session.current().unwrap().is_dirty());
    assert_eq!(storage.list().unwrap(), before);
}

#[test]
fn untitled_save_needs_name_then_renames_in_place() {
    let storage = MemoryStorage::with(&[("z.py", "")]);
    let mut session = Session::new();
    session.open(&storage, "z.py").unwrap();
    let untitled = session.new_untitled(&storage, "py");
    session.open(&storage, "z.py").unwrap();
    type_text(session.buffer_mut(&untitled).unwrap(), "print('hi')");

    let outcome = session.save(&storage, SaveRequest::plain(&untitled)).unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::NeedsName {
            suggested: untitled.clone()
        }
    );
    assert!(!storage.exists(&untitled));

    session.switch_to(&untitled);
    let outcome = session
        .save(&storage, SaveRequest::named(&untitled, "  hello.py "))
        .unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            filename: "hello.py".to_string(),
            renamed_from: Some(untitled.clone())
        }
    );
    let names: Vec<_> = session.buffers().iter().map(|b| b.filename()).collect();
    assert_eq!(names, vec!["z.py", "hello.py"]);
    assert_eq!(session.current_name(), Some("hello.py"));
    assert_eq!(storage.get("hello.py").as_deref(), Some("print('hi')"));
}

#[test]
fn save_with_invalid_name_is_rejected() {
    let storage = MemoryStorage::default();
    let mut session = Session::new();
    let untitled = session.new_untitled(&storage, "py");

    for bad in ["", "   ", "dir/x.py", ".."] {
        let err = session
            .save(&storage, SaveRequest::named(&untitled, bad))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidName { .. }), "{bad:?}");
    }
    assert!(session.current().unwrap().is_dirty());
}

#[test]
fn save_over_existing_file_needs_confirmation() {
    let storage = MemoryStorage::with(&[("taken.py", "old")]);
    let mut session = Session::new();
    let untitled = session.new_untitled(&storage, "py");
    type_text(session.current_mut().unwrap(), "new");

    let outcome = session
        .save(&storage, SaveRequest::named(&untitled, "taken.py"))
        .unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::NeedsOverwrite {
            target: "taken.py".to_string()
        }
    );
    assert_eq!(storage.get("taken.py").as_deref(), Some("old"));

    session
        .save(
            &storage,
            SaveRequest::named(&untitled, "taken.py").confirmed(),
        )
        .unwrap();
    assert_eq!(storage.get("taken.py").as_deref(), Some("new"));
}

#[test]
fn save_to_name_of_other_open_buffer_is_name_in_use() {
    let storage = MemoryStorage::with(&[("a.py", "a")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    let untitled = session.new_untitled(&storage, "py");

    let err = session
        .save(
            &storage,
            SaveRequest::named(&untitled, "a.py").confirmed(),
        )
        .unwrap_err();
    assert!(matches!(err, EditorError::NameInUse(ref name) if name == "a.py"));
    assert_eq!(storage.get("a.py").as_deref(), Some("a"));
}

#[test]
fn write_failure_keeps_buffer_dirty() {
    let storage = MemoryStorage::with(&[("a.py", "")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    type_text(session.current_mut().unwrap(), "x");
    storage.fail_writes.set(true);

    let err = session
        .save(&storage, SaveRequest::plain("a.py"))
        .unwrap_err();
    assert!(matches!(err, EditorError::Write { .. }));
    assert!(session.current().unwrap().is_dirty());
}

#[test]
fn rename_to_other_extension_switches_highlighting() {
    let storage = MemoryStorage::default();
    let mut session = Session::new();
    let untitled = session.new_untitled(&storage, "py");
    assert_eq!(session.current().unwrap().language(), Some(LanguageId::Python));

    session
        .save(&storage, SaveRequest::named(&untitled, "notes.md"))
        .unwrap();
    assert_eq!(session.current().unwrap().language(), None);
    assert!(session.current().unwrap().highlights().is_empty());
}

#[test]
fn closing_dirty_buffer_asks_and_abort_keeps_state() {
    let storage = MemoryStorage::with(&[("a.py", "a")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    type_text(session.current_mut().unwrap(), "x");

    assert_eq!(
        session.close(&storage, "a.py", None).unwrap(),
        CloseOutcome::NeedsDecision
    );
    assert_eq!(
        session
            .close(&storage, "a.py", Some(CloseDecision::Abort))
            .unwrap(),
        CloseOutcome::Aborted
    );
    assert!(session.current().unwrap().is_dirty());
    assert_eq!(session.current().unwrap().content(), "xa");
}

#[test]
fn closing_dirty_buffer_with_discard_leaves_disk_untouched() {
    let storage = MemoryStorage::with(&[("a.py", "a")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    type_text(session.current_mut().unwrap(), "x");

    let outcome = session
        .close(&storage, "a.py", Some(CloseDecision::Discard))
        .unwrap();
    assert_eq!(outcome, CloseOutcome::Closed);
    assert!(session.is_empty());
    assert_eq!(storage.get("a.py").as_deref(), Some("a"));
}

#[test]
fn save_then_close_only_closes_after_successful_save() {
    let storage = MemoryStorage::with(&[("a.py", "a")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    type_text(session.current_mut().unwrap(), "x");

    storage.fail_writes.set(true);
    assert!(session
        .close(&storage, "a.py", Some(CloseDecision::SaveThenClose))
        .is_err());
    assert!(session.contains("a.py"));

    storage.fail_writes.set(false);
    assert_eq!(
        session
            .close(&storage, "a.py", Some(CloseDecision::SaveThenClose))
            .unwrap(),
        CloseOutcome::Closed
    );
    assert_eq!(storage.get("a.py").as_deref(), Some("xa"));
}

#[test]
fn save_then_close_untitled_is_pending_a_name() {
    let storage = MemoryStorage::default();
    let mut session = Session::new();
    let untitled = session.new_untitled(&storage, "py");

    let outcome = session
        .close(&storage, &untitled, Some(CloseDecision::SaveThenClose))
        .unwrap();
    assert!(matches!(
        outcome,
        CloseOutcome::SavePending(SaveOutcome::NeedsName { .. })
    ));
    assert!(session.contains(&untitled));
}

#[test]
fn closing_current_moves_to_first_remaining() {
    let storage = MemoryStorage::with(&[("a.py", ""), ("b.py", ""), ("c.py", "")]);
    let mut session = Session::new();
    for name in ["a.py", "b.py", "c.py"] {
        session.open(&storage, name).unwrap();
    }
    session.switch_to("b.py");

    session.close(&storage, "b.py", None).unwrap();
    assert_eq!(session.current_name(), Some("a.py"));

    session.close(&storage, "c.py", None).unwrap();
    assert_eq!(session.current_name(), Some("a.py"));

    session.close(&storage, "a.py", None).unwrap();
    assert_eq!(session.current_name(), None);
}

#[test]
fn deleting_open_dirty_file_does_not_prompt() {
    let storage = MemoryStorage::with(&[("a.py", "a"), ("b.py", "b")]);
    let mut session = Session::new();
    session.open(&storage, "b.py").unwrap();
    session.open(&storage, "a.py").unwrap();
    type_text(session.current_mut().unwrap(), "x");

    assert!(session.delete(&storage, "a.py").unwrap());
    assert!(!session.contains("a.py"));
    assert!(!storage.exists("a.py"));
    assert_eq!(session.current_name(), Some("b.py"));
}

#[test]
fn failed_delete_keeps_buffer_and_edits() {
    let storage = MemoryStorage::with(&[("a.py", "a")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    type_text(session.current_mut().unwrap(), "x");
    storage.fail_removes.set(true);

    let err = session.delete(&storage, "a.py").unwrap_err();
    assert!(matches!(err, EditorError::Delete { .. }));
    assert_eq!(session.current().unwrap().content(), "xa");
    assert!(session.current().unwrap().is_dirty());
}

#[test]
fn deleting_unopened_file_only_touches_disk() {
    let storage = MemoryStorage::with(&[("a.py", "a"), ("b.py", "b")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();

    assert!(!session.delete(&storage, "b.py").unwrap());
    assert_eq!(session.current_name(), Some("a.py"));
    assert!(!storage.exists("b.py"));
}

#[test]
fn cycle_wraps_in_tab_order() {
    let storage = MemoryStorage::with(&[("a.py", ""), ("b.py", ""), ("c.py", "")]);
    let mut session = Session::new();
    for name in ["a.py", "b.py", "c.py"] {
        session.open(&storage, name).unwrap();
    }

    assert!(session.cycle(1));
    assert_eq!(session.current_name(), Some("a.py"));
    assert!(session.cycle(-1));
    assert_eq!(session.current_name(), Some("c.py"));
    assert!(session.cycle(-1));
    assert_eq!(session.current_name(), Some("b.py"));
}

#[test]
fn buffer_ids_survive_rename() {
    let storage = MemoryStorage::default();
    let mut session = Session::new();
    let untitled = session.new_untitled(&storage, "py");
    let id = session.current().unwrap().id();

    session
        .save(&storage, SaveRequest::named(&untitled, "main.py"))
        .unwrap();
    assert_eq!(session.find_by_id(id).unwrap().filename(), "main.py");
}

#[test]
fn highlights_refresh_after_edit() {
    let storage = MemoryStorage::with(&[("a.py", "x = 1\n")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();

    let buffer = session.current_mut().unwrap();
    assert!(!buffer.highlights_stale());
    buffer.insert_str("# c\n");
    assert!(buffer.highlights_stale());

    buffer.refresh_syntax();
    assert!(!buffer.highlights_stale());
    assert!(buffer.highlights()[0]
        .iter()
        .any(|s| s.kind == HighlightKind::Comment));
}

#[test]
fn ensure_cursor_visible_scrolls_both_ways() {
    let storage = MemoryStorage::with(&[("a.py", "1\n2\n3\n4\n5\n6\n")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    let buffer = session.current_mut().unwrap();

    buffer.set_cursor(5, 0);
    assert!(buffer.ensure_cursor_visible(3, 10, 4));
    assert_eq!(buffer.scroll(), 3);

    buffer.set_cursor(1, 0);
    assert!(buffer.ensure_cursor_visible(3, 10, 4));
    assert_eq!(buffer.scroll(), 1);
    assert!(!buffer.ensure_cursor_visible(3, 10, 4));
}

#[test]
fn ensure_cursor_visible_follows_long_lines_horizontally() {
    let line = "x".repeat(30);
    let storage = MemoryStorage::with(&[("a.py", line.as_str())]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    let buffer = session.current_mut().unwrap();

    buffer.set_cursor(0, 30);
    assert!(buffer.ensure_cursor_visible(5, 10, 4));
    assert_eq!(buffer.horiz_offset(), 21);

    buffer.set_cursor(0, 3);
    assert!(buffer.ensure_cursor_visible(5, 10, 4));
    assert_eq!(buffer.horiz_offset(), 3);
}

#[test]
fn ensure_cursor_visible_counts_tabs_and_skips_unknown_size() {
    let storage = MemoryStorage::with(&[("a.py", "\t\tab")]);
    let mut session = Session::new();
    session.open(&storage, "a.py").unwrap();
    let buffer = session.current_mut().unwrap();

    buffer.set_cursor(0, 3);
    assert_eq!(buffer.cursor_display_col(4), 9);
    assert!(!buffer.ensure_cursor_visible(0, 0, 4));
    assert_eq!((buffer.scroll(), buffer.horiz_offset()), (0, 0));

    assert!(buffer.ensure_cursor_visible(1, 4, 4));
    assert_eq!(buffer.horiz_offset(), 6);
}
