use super::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn refresh_keeps_selected_file() {
    let mut list = FileListState::default();
    list.set_entries(names(&["a.py", "b.py", "c.py"]));
    list.select("b.py");

    assert!(list.set_entries(names(&["0.md", "a.py", "b.py", "c.py"])));
    assert_eq!(list.selected_name(), Some("b.py"));
    assert!(!list.set_entries(names(&["0.md", "a.py", "b.py", "c.py"])));
}

#[test]
fn refresh_after_delete_clamps_selection() {
    let mut list = FileListState::default();
    list.set_entries(names(&["a.py", "b.py"]));
    list.select("b.py");

    list.set_entries(names(&["a.py"]));
    assert_eq!(list.selected_name(), Some("a.py"));

    list.set_entries(Vec::new());
    assert_eq!(list.selected_name(), None);
    assert!(!list.move_selection(1));
}

#[test]
fn selection_scrolls_view() {
    let mut list = FileListState::default();
    list.set_view_height(2);
    list.set_entries(names(&["a", "b", "c", "d"]));

    assert!(list.move_selection(3));
    assert_eq!(list.selected, 3);
    assert_eq!(list.scroll, 2);
    assert!(!list.move_selection(1));
    assert!(list.move_selection(-3));
    assert_eq!(list.scroll, 0);
}

#[test]
fn title_without_buffers() {
    let state = AppState::new(EditorConfig::default());
    assert_eq!(state.title(), "funkide");
}
