//! Headless widget core (binding/dispatch/control).

pub mod binding;
pub mod control;
pub mod dispatch;
pub mod services;

pub use binding::{BuiltinWidget, Registry, HIDDEN_PREFIX};
pub use control::{CommandOutput, ListMode, Operation, Options, Zle};
pub use dispatch::{CallOptions, DispatchScope, MultOverride};
pub use services::ports::{EditorHost, Modifier, ModifierFlags, RefreshRequest};
