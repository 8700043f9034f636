//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod keybinding;
pub mod paths;
pub mod runtime;
pub mod settings;
pub mod storage;
pub mod viewer;

pub use keybinding::{KeybindingContext, KeybindingService};
pub use paths::{ensure_log_dir, get_app_dir, get_log_dir};
pub use runtime::{AppMessage, AsyncRuntime};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, parse_keybinding};
pub use storage::{LocalStorage, STORAGE_DIR_NAME};
pub use viewer::SystemViewer;
