//! Service ports: traits + data contracts.

pub mod host;
pub mod settings;

pub use host::{EditorHost, Modifier, ModifierFlags, RefreshRequest};
pub use settings::{AliasRule, CompletionRule, Settings, WatchRule, WidgetRule};
