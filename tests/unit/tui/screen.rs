use super::*;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingModes {
    calls: Mutex<Vec<String>>,
    refuse_enter: bool,
}

impl RecordingModes {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl ScreenModes for RecordingModes {
    fn enter(&self) -> io::Result<()> {
        self.record("enter");
        if self.refuse_enter {
            return Err(io::Error::new(io::ErrorKind::Other, "not a tty"));
        }
        Ok(())
    }

    fn leave(&self) -> io::Result<()> {
        self.record("leave");
        Ok(())
    }

    fn set_title(&self, title: &str) -> io::Result<()> {
        self.record(format!("title {title}"));
        Ok(())
    }
}

#[test]
fn screen_leaves_once_across_handles_and_drop() {
    let modes = Arc::new(RecordingModes::default());
    let screen = Screen::with_modes(modes.clone()).unwrap();
    let from_signal = screen.restore_handle();
    let from_panic = from_signal.clone();

    from_signal.restore().unwrap();
    from_panic.restore().unwrap();
    drop(screen);

    assert_eq!(modes.calls(), vec!["enter", "leave"]);
}

#[test]
fn drop_restores_when_nothing_else_did() {
    let modes = Arc::new(RecordingModes::default());
    drop(Screen::with_modes(modes.clone()).unwrap());
    assert_eq!(modes.calls(), vec!["enter", "leave"]);
}

#[test]
fn refused_enter_never_leaves() {
    let modes = Arc::new(RecordingModes {
        refuse_enter: true,
        ..RecordingModes::default()
    });

    assert!(Screen::with_modes(modes.clone()).is_err());
    assert_eq!(modes.calls(), vec!["enter"]);
}

#[test]
fn title_is_written_only_when_it_changes() {
    let modes = Arc::new(RecordingModes::default());
    let mut screen = Screen::with_modes(modes.clone()).unwrap();

    screen.sync_title("funkide").unwrap();
    screen.sync_title("funkide").unwrap();
    screen.sync_title("funkide - a.py*").unwrap();
    drop(screen);

    assert_eq!(
        modes.calls(),
        vec!["enter", "title funkide", "title funkide - a.py*", "leave"]
    );
}

#[test]
fn exit_codes_follow_shell_convention() {
    assert_eq!(TerminationSignal::Hangup.exit_code(), 129);
    assert_eq!(TerminationSignal::Interrupt.exit_code(), 130);
    assert_eq!(TerminationSignal::Terminate.exit_code(), 143);
}
