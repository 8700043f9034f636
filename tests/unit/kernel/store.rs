use super::*;
use crate::kernel::services::ports::{EditorConfig, StorageError, StorageResult};
use crate::kernel::{AfterSave, InputDialogKind, OutputStream, OutputTag, PendingAction};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Disk {
    files: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
    fail_removes: Cell<bool>,
}

#[derive(Clone)]
struct MemoryStorage {
    disk: Rc<Disk>,
    root: PathBuf,
}

impl MemoryStorage {
    fn with(files: &[(&str, &str)]) -> Self {
        let disk = Disk::default();
        for (name, content) in files {
            disk.files
                .borrow_mut()
                .insert(name.to_string(), content.to_string());
        }
        Self {
            disk: Rc::new(disk),
            root: PathBuf::from("/storage"),
        }
    }

    fn get(&self, name: &str) -> Option<String> {
        self.disk.files.borrow().get(name).cloned()
    }
}

impl StorageProvider for MemoryStorage {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self.disk.files.borrow().keys().cloned().collect())
    }

    fn read(&self, name: &str) -> StorageResult<String> {
        self.get(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn write(&self, name: &str, content: &str) -> StorageResult<()> {
        if self.disk.fail_writes.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into());
        }
        self.disk
            .files
            .borrow_mut()
            .insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.disk.files.borrow().contains_key(name)
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        if self.disk.fail_removes.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "busy").into());
        }
        self.disk
            .files
            .borrow_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}

fn new_store(files: &[(&str, &str)]) -> (Store, MemoryStorage) {
    let storage = MemoryStorage::with(files);
    let mut store = Store::new(
        AppState::new(EditorConfig::default()),
        Box::new(storage.clone()),
    );
    store.dispatch(Action::EditorSetViewSize {
        width: 40,
        height: 20,
    });
    (store, storage)
}

fn command(store: &mut Store, cmd: Command) -> DispatchResult {
    store.dispatch(Action::RunCommand(cmd))
}

fn type_str(store: &mut Store, text: &str) {
    for ch in text.chars() {
        command(store, Command::InsertChar(ch));
    }
}

/// 清空输入框后输入新名字
fn enter_name(store: &mut Store, name: &str) {
    while store.state().ui.input_dialog.cursor > 0 {
        store.dispatch(Action::InputDialogBackspace);
    }
    for ch in name.chars() {
        store.dispatch(Action::InputDialogAppend(ch));
    }
}

fn current_dirty(store: &Store) -> bool {
    store
        .state()
        .session
        .current()
        .is_some_and(|buffer| buffer.is_dirty())
}

#[test]
fn startup_lists_storage_directory() {
    let (store, _) = new_store(&[("b.py", ""), ("a.md", "")]);
    assert_eq!(store.state().file_list.entries, vec!["a.md", "b.py"]);
    assert_eq!(store.state().title(), "funkide");
}

#[test]
fn edit_and_save_scenario() {
    let (mut store, storage) = new_store(&[("a.py", "print(1)"), ("z.md", "")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    assert!(!current_dirty(&store));

    command(&mut store, Command::CursorLineEnd);
    command(&mut store, Command::CursorLeft);
    command(&mut store, Command::DeleteBackward);
    assert!(current_dirty(&store));
    command(&mut store, Command::InsertChar('2'));
    assert_eq!(store.state().title(), "funkide - a.py*");

    command(&mut store, Command::Save);
    assert_eq!(storage.get("a.py").as_deref(), Some("print(2)"));
    assert!(!current_dirty(&store));
    assert_eq!(store.state().file_list.entries, vec!["a.py", "z.md"]);
    assert_eq!(store.state().title(), "funkide - a.py");
}

#[test]
fn open_then_close_leaves_disk_untouched() {
    let (mut store, storage) = new_store(&[("a.py", "x = 1\n")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    command(&mut store, Command::CloseTab);

    assert!(store.state().session.is_empty());
    assert!(!store.state().ui.confirm_dialog.visible);
    assert_eq!(storage.get("a.py").as_deref(), Some("x = 1\n"));
}

#[test]
fn open_missing_file_shows_read_error() {
    let (mut store, _) = new_store(&[]);

    store.dispatch(Action::OpenFile("ghost.py".to_string()));

    let notice = &store.state().ui.notice;
    assert!(notice.visible);
    assert_eq!(notice.title, "Read Error");
    assert!(store.state().session.is_empty());

    store.dispatch(Action::DismissNotice);
    assert!(!store.state().ui.notice.visible);
}

#[test]
fn saving_untitled_prompts_for_name() {
    let (mut store, storage) = new_store(&[]);

    command(&mut store, Command::NewFile);
    type_str(&mut store, "print('hi')");
    command(&mut store, Command::Save);

    let dialog = &store.state().ui.input_dialog;
    assert!(dialog.visible);
    assert_eq!(dialog.value, "Untitled-1.py");
    assert_eq!(
        dialog.kind,
        Some(InputDialogKind::SaveAs {
            filename: "Untitled-1.py".to_string(),
            then: AfterSave::Nothing,
        })
    );

    enter_name(&mut store, "  hello.py ");
    store.dispatch(Action::InputDialogAccept);

    assert!(!store.state().ui.input_dialog.visible);
    assert_eq!(storage.get("hello.py").as_deref(), Some("print('hi')"));
    assert_eq!(store.state().session.current_name(), Some("hello.py"));
    assert!(!current_dirty(&store));
    assert_eq!(store.state().file_list.selected_name(), Some("hello.py"));
}

#[test]
fn invalid_name_keeps_dialog_open_with_error() {
    let (mut store, storage) = new_store(&[]);

    command(&mut store, Command::NewFile);
    command(&mut store, Command::Save);
    enter_name(&mut store, "a/b.py");
    store.dispatch(Action::InputDialogAccept);

    let dialog = &store.state().ui.input_dialog;
    assert!(dialog.visible);
    assert_eq!(dialog.value, "a/b.py");
    assert_eq!(dialog.error.as_deref(), Some("Invalid name: \"a/b.py\""));
    assert!(storage.list().unwrap().is_empty());

    // 继续输入会清掉错误
    store.dispatch(Action::InputDialogBackspace);
    assert_eq!(store.state().ui.input_dialog.error, None);

    store.dispatch(Action::InputDialogCancel);
    assert!(!store.state().ui.input_dialog.visible);
    assert_eq!(
        store.state().ui.status_message.as_deref(),
        Some("Save cancelled")
    );
    assert!(current_dirty(&store));
}

#[test]
fn name_held_by_another_tab_is_rejected_inline() {
    let (mut store, _) = new_store(&[("a.py", "")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    command(&mut store, Command::NewFile);
    command(&mut store, Command::Save);
    enter_name(&mut store, "a.py");
    store.dispatch(Action::InputDialogAccept);

    let dialog = &store.state().ui.input_dialog;
    assert!(dialog.visible);
    assert_eq!(
        dialog.error.as_deref(),
        Some("a.py is already open in another tab")
    );
}

#[test]
fn overwrite_requires_confirmation() {
    let (mut store, storage) = new_store(&[("b.py", "old")]);

    command(&mut store, Command::NewFile);
    type_str(&mut store, "new");
    command(&mut store, Command::Save);
    enter_name(&mut store, "b.py");
    store.dispatch(Action::InputDialogAccept);

    let confirm = &store.state().ui.confirm_dialog;
    assert!(confirm.visible);
    assert!(!confirm.three_way);
    assert!(matches!(
        confirm.on_confirm,
        Some(PendingAction::ConfirmOverwrite { ref target, .. }) if target == "b.py"
    ));

    // 两选一对话框的"否"就是取消
    store.dispatch(Action::ConfirmDialogDecline);
    assert_eq!(storage.get("b.py").as_deref(), Some("old"));
    assert!(current_dirty(&store));

    command(&mut store, Command::Save);
    enter_name(&mut store, "b.py");
    store.dispatch(Action::InputDialogAccept);
    store.dispatch(Action::ConfirmDialogAccept);

    assert_eq!(storage.get("b.py").as_deref(), Some("new"));
    assert_eq!(store.state().session.current_name(), Some("b.py"));
    assert!(!current_dirty(&store));
}

#[test]
fn write_failure_keeps_buffer_dirty() {
    let (mut store, storage) = new_store(&[("a.py", "x")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    type_str(&mut store, "y");
    storage.disk.fail_writes.set(true);
    command(&mut store, Command::Save);

    assert_eq!(store.state().ui.notice.title, "Write Error");
    assert!(current_dirty(&store));
    assert_eq!(storage.get("a.py").as_deref(), Some("x"));
}

#[test]
fn close_dirty_buffer_three_way() {
    let (mut store, storage) = new_store(&[("a.py", "x")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    type_str(&mut store, "y");

    command(&mut store, Command::CloseTab);
    let confirm = &store.state().ui.confirm_dialog;
    assert!(confirm.visible);
    assert!(confirm.three_way);

    // 取消：一切保持原样
    store.dispatch(Action::ConfirmDialogCancel);
    assert!(!store.state().ui.confirm_dialog.visible);
    assert_eq!(store.state().session.len(), 1);
    assert!(current_dirty(&store));

    // 不保存：关闭，磁盘不变
    command(&mut store, Command::CloseTab);
    store.dispatch(Action::ConfirmDialogDecline);
    assert!(store.state().session.is_empty());
    assert_eq!(storage.get("a.py").as_deref(), Some("x"));

    // 保存后关闭
    store.dispatch(Action::OpenFile("a.py".to_string()));
    type_str(&mut store, "z");
    command(&mut store, Command::CloseTab);
    store.dispatch(Action::ConfirmDialogAccept);
    assert!(store.state().session.is_empty());
    assert_eq!(storage.get("a.py").as_deref(), Some("zx"));
}

#[test]
fn close_untitled_with_save_prompts_then_closes() {
    let (mut store, storage) = new_store(&[("a.py", "")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    command(&mut store, Command::NewFile);
    type_str(&mut store, "1");
    command(&mut store, Command::CloseTab);
    store.dispatch(Action::ConfirmDialogAccept);

    let dialog = &store.state().ui.input_dialog;
    assert!(dialog.visible);
    assert!(matches!(
        dialog.kind,
        Some(InputDialogKind::SaveAs {
            then: AfterSave::CloseBuffer,
            ..
        })
    ));
    assert_eq!(store.state().session.len(), 2);

    enter_name(&mut store, "one.py");
    store.dispatch(Action::InputDialogAccept);

    assert_eq!(storage.get("one.py").as_deref(), Some("1"));
    assert_eq!(store.state().session.len(), 1);
    assert_eq!(store.state().session.current_name(), Some("a.py"));
    assert_eq!(store.state().file_list.entries, vec!["a.py", "one.py"]);
}

#[test]
fn delete_open_dirty_file_skips_dirty_prompt() {
    let (mut store, storage) = new_store(&[("a.py", "x"), ("b.py", "y")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    type_str(&mut store, "edited");
    store.dispatch(Action::FileListClickRow { row: 0 });
    command(&mut store, Command::FileListDelete);

    let confirm = &store.state().ui.confirm_dialog;
    assert!(confirm.visible);
    assert_eq!(
        confirm.on_confirm,
        Some(PendingAction::DeleteFile {
            filename: "a.py".to_string()
        })
    );

    store.dispatch(Action::ConfirmDialogAccept);
    assert!(!store.state().ui.confirm_dialog.visible);
    assert_eq!(storage.get("a.py"), None);
    assert!(!store.state().session.contains("a.py"));
    assert_eq!(store.state().file_list.entries, vec!["b.py"]);
}

#[test]
fn delete_failure_keeps_buffer_and_edits() {
    let (mut store, storage) = new_store(&[("a.py", "x")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    type_str(&mut store, "y");
    storage.disk.fail_removes.set(true);
    command(&mut store, Command::FileListDelete);
    store.dispatch(Action::ConfirmDialogAccept);

    assert_eq!(store.state().ui.notice.title, "Delete Error");
    let buffer = store.state().session.buffer("a.py").unwrap();
    assert!(buffer.is_dirty());
    assert_eq!(buffer.content(), "yx");
    assert_eq!(storage.get("a.py").as_deref(), Some("x"));
}

#[test]
fn quit_without_dirty_buffers_is_immediate() {
    let (mut store, _) = new_store(&[("a.py", "")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    command(&mut store, Command::Quit);

    assert!(store.state().ui.should_quit);
    assert!(!store.state().ui.confirm_dialog.visible);
}

#[test]
fn quit_save_all_saves_each_dirty_buffer() {
    let (mut store, storage) = new_store(&[("a.py", ""), ("b.py", "")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    type_str(&mut store, "a");
    store.dispatch(Action::OpenFile("b.py".to_string()));
    type_str(&mut store, "b");

    command(&mut store, Command::Quit);
    assert_eq!(
        store.state().ui.confirm_dialog.message,
        "2 files have unsaved changes. Save before quitting?"
    );
    store.dispatch(Action::ConfirmDialogAccept);

    assert!(store.state().ui.should_quit);
    assert_eq!(storage.get("a.py").as_deref(), Some("a"));
    assert_eq!(storage.get("b.py").as_deref(), Some("b"));
}

#[test]
fn quit_cancelled_when_name_prompt_is_dismissed() {
    let (mut store, storage) = new_store(&[]);

    command(&mut store, Command::NewFile);
    type_str(&mut store, "x");
    command(&mut store, Command::Quit);
    store.dispatch(Action::ConfirmDialogAccept);
    assert!(store.state().ui.input_dialog.visible);

    store.dispatch(Action::InputDialogCancel);
    assert!(!store.state().ui.should_quit);
    assert_eq!(
        store.state().ui.status_message.as_deref(),
        Some("Quit cancelled")
    );
    assert!(storage.list().unwrap().is_empty());

    command(&mut store, Command::Quit);
    store.dispatch(Action::ConfirmDialogDecline);
    assert!(store.state().ui.should_quit);
}

#[test]
fn new_file_twice_gives_two_dirty_untitled_buffers() {
    let (mut store, _) = new_store(&[("Untitled-1.py", "")]);

    command(&mut store, Command::NewFile);
    command(&mut store, Command::NewFile);

    let names: Vec<_> = store
        .state()
        .session
        .buffers()
        .iter()
        .map(|b| (b.filename().to_string(), b.is_dirty()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Untitled-2.py".to_string(), true),
            ("Untitled-3.py".to_string(), true)
        ]
    );
}

#[test]
fn tab_cycling_and_click() {
    let (mut store, _) = new_store(&[("a.py", ""), ("b.py", ""), ("c.py", "")]);
    for name in ["a.py", "b.py", "c.py"] {
        store.dispatch(Action::OpenFile(name.to_string()));
    }

    command(&mut store, Command::NextTab);
    assert_eq!(store.state().session.current_name(), Some("a.py"));
    command(&mut store, Command::PrevTab);
    assert_eq!(store.state().session.current_name(), Some("c.py"));

    assert!(store.dispatch(Action::TabClick { index: 1 }).state_changed);
    assert_eq!(store.state().session.current_name(), Some("b.py"));
    assert!(!store.dispatch(Action::TabClick { index: 9 }).state_changed);
}

#[test]
fn run_refusals_show_notices() {
    let (mut store, _) = new_store(&[("a.py", ""), ("notes.txt", "")]);

    let result = command(&mut store, Command::RunOrPreview);
    assert!(result.effects.is_empty());
    assert_eq!(store.state().ui.notice.message, "No file is open.");

    store.dispatch(Action::DismissNotice);
    store.dispatch(Action::OpenFile("notes.txt".to_string()));
    command(&mut store, Command::RunOrPreview);
    assert_eq!(
        store.state().ui.notice.message,
        "Cannot run or preview .txt files."
    );

    store.dispatch(Action::DismissNotice);
    store.dispatch(Action::OpenFile("a.py".to_string()));
    type_str(&mut store, "1");
    let result = command(&mut store, Command::RunOrPreview);
    assert!(result.effects.is_empty());
    assert_eq!(store.state().ui.notice.title, "Unsaved Changes");
    assert!(!store.state().output.is_running());
}

#[test]
fn run_script_emits_effect_and_streams_output() {
    let (mut store, _) = new_store(&[("a.py", "print(1)\nraise SystemExit(2)\n")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    let result = command(&mut store, Command::RunOrPreview);

    let expected_script = PathBuf::from("/storage").join("a.py");
    assert_eq!(
        result.effects,
        vec![Effect::RunScript {
            run_id: 1,
            program: EditorConfig::default().python,
            script: expected_script.clone(),
            cwd: PathBuf::from("/storage"),
        }]
    );
    let output = &store.state().output;
    assert!(output.visible);
    assert!(output.is_running());
    assert_eq!(
        output.lines()[0].text,
        format!("--- Running: {} ---", expected_script.display())
    );

    store.dispatch(Action::RunOutput {
        run_id: 1,
        stream: OutputStream::Stdout,
        line: "1".to_string(),
    });
    store.dispatch(Action::RunOutput {
        run_id: 1,
        stream: OutputStream::Stderr,
        line: "Traceback (most recent call last):".to_string(),
    });
    store.dispatch(Action::RunExited {
        run_id: 1,
        code: Some(2),
    });

    let tags: Vec<_> = store
        .state()
        .output
        .lines()
        .iter()
        .map(|l| (l.text.as_str(), l.tag))
        .collect();
    assert_eq!(tags[1], ("1", OutputTag::Success));
    assert_eq!(tags[2], ("Traceback (most recent call last):", OutputTag::Error));
    assert_eq!(tags[3], ("--- exited with code 2 ---", OutputTag::Error));
    assert!(!store.state().output.is_running());
}

#[test]
fn stale_run_output_is_ignored() {
    let (mut store, _) = new_store(&[("a.py", "")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    command(&mut store, Command::RunOrPreview);
    command(&mut store, Command::RunOrPreview);
    assert_eq!(store.state().output.run_id(), 2);

    let result = store.dispatch(Action::RunOutput {
        run_id: 1,
        stream: OutputStream::Stdout,
        line: "late".to_string(),
    });
    assert!(!result.state_changed);
    assert_eq!(store.state().output.len(), 1);
}

#[test]
fn launch_failure_is_shown_in_panel_and_notice() {
    let (mut store, _) = new_store(&[("a.py", "")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    command(&mut store, Command::RunOrPreview);
    store.dispatch(Action::RunLaunchFailed {
        run_id: 1,
        program: "python3".to_string(),
        error: "not found".to_string(),
    });

    let lines = store.state().output.lines();
    assert_eq!(lines[1].text, "--- launch failed ---");
    assert_eq!(lines[1].tag, OutputTag::Error);
    assert_eq!(store.state().ui.notice.title, "Run Error");
    assert_eq!(
        store.state().ui.notice.message,
        "Cannot start python3: not found"
    );
}

#[test]
fn markdown_preview_emits_render_effect() {
    let (mut store, storage) = new_store(&[("README.md", "# Hi\n")]);

    store.dispatch(Action::OpenFile("README.md".to_string()));
    let result = command(&mut store, Command::RunOrPreview);
    assert_eq!(
        result.effects,
        vec![Effect::RenderPreview {
            source: PathBuf::from("/storage").join("README.md"),
            target: PathBuf::from("/storage").join("preview.html"),
        }]
    );

    // 预览文件写入后列表要重新读盘
    storage.write("preview.html", "<html></html>").unwrap();
    store.dispatch(Action::PreviewOpened {
        path: PathBuf::from("/storage").join("preview.html"),
    });
    assert_eq!(
        store.state().file_list.entries,
        vec!["README.md", "preview.html"]
    );

    store.dispatch(Action::PreviewFailed {
        path: PathBuf::from("/storage").join("preview.html"),
        error: "no viewer".to_string(),
    });
    assert_eq!(store.state().ui.notice.title, "Preview Error");
}

#[test]
fn highlight_refresh_waits_for_debounce() {
    let (mut store, _) = new_store(&[("a.py", "x = 1\n")]);

    store.dispatch(Action::OpenFile("a.py".to_string()));
    assert!(!store.state().session.current().unwrap().highlights_stale());

    let before = Instant::now();
    command(&mut store, Command::InsertChar('#'));
    assert!(store.state().session.current().unwrap().highlights_stale());
    assert!(store.next_highlight_deadline().is_some());

    let result = store.dispatch(Action::HighlightTick { now: before });
    assert!(!result.state_changed);
    assert!(store.state().session.current().unwrap().highlights_stale());

    let later = Instant::now() + Duration::from_secs(1);
    let result = store.dispatch(Action::HighlightTick { now: later });
    assert!(result.state_changed);
    assert!(!store.state().session.current().unwrap().highlights_stale());
    assert_eq!(store.next_highlight_deadline(), None);
}

#[test]
fn file_list_navigation_and_focus() {
    let (mut store, _) = new_store(&[("a.py", "1"), ("b.py", "2")]);

    command(&mut store, Command::FocusFileList);
    assert_eq!(store.state().ui.focus, FocusTarget::FileList);
    command(&mut store, Command::FileListDown);
    command(&mut store, Command::FileListOpen);

    assert_eq!(store.state().session.current_name(), Some("b.py"));
    assert_eq!(store.state().ui.focus, FocusTarget::Editor);

    command(&mut store, Command::FocusFileList);
    command(&mut store, Command::Escape);
    assert_eq!(store.state().ui.focus, FocusTarget::Editor);
}

#[test]
fn typing_past_view_width_scrolls_horizontally() {
    let (mut store, _) = new_store(&[]);
    command(&mut store, Command::NewFile);
    type_str(&mut store, &"x".repeat(50));

    let buffer = store.state().session.current().unwrap();
    assert_eq!(buffer.horiz_offset(), 11);

    command(&mut store, Command::CursorLineStart);
    assert_eq!(store.state().session.current().unwrap().horiz_offset(), 0);

    store.dispatch(Action::EditorSetViewSize {
        width: 80,
        height: 20,
    });
    command(&mut store, Command::CursorLineEnd);
    assert_eq!(store.state().session.current().unwrap().horiz_offset(), 0);
}
