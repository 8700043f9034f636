//! Headless application core (state/action/effect).

pub mod action;
pub mod effect;
pub mod error;
pub mod highlight;
pub mod output;
pub mod preview;
pub mod run;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use action::Action;
pub use effect::Effect;
pub use error::EditorError;
pub use highlight::HighlightScheduler;
pub use output::{OutputLine, OutputPanel, OutputStream, OutputTag};
pub use session::{Buffer, BufferId, Session};
pub use state::{
    AfterSave, AppState, ConfirmDialogState, FileListState, FocusTarget, InputDialogKind,
    InputDialogState, NoticeLevel, NoticeState, PendingAction, UiState,
};
pub use store::{DispatchResult, Store};
