//! 数据模型：名字表、widget 表、fd 监听表

pub mod thingy;
pub mod watch;
pub mod widget;

pub use thingy::{Binding, Thingy, ThingyId, ThingyTable};
pub use watch::{WatchFd, WatchTable};
pub use widget::{Widget, WidgetFlags, WidgetFn, WidgetId, WidgetKind, WidgetStore};
