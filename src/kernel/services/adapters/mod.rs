//! Service adapters: in-memory host + file-backed settings.

pub mod headless;
pub mod paths;
pub mod settings;

pub use headless::{FunctionCall, HeadlessHost};
pub use paths::{ensure_log_dir, get_cache_dir, get_log_dir, get_settings_path};
pub use settings::{apply_settings, ensure_settings_file, load_settings_from};
