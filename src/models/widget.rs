//! Widget：可执行的编辑动作
//!
//! 一个 widget 由绑定到它的所有名字共同持有，最后一个名字解绑时销毁。

use std::fmt;

use compact_str::CompactString;
use slotmap::{new_key_type, SlotMap};

use super::thingy::ThingyId;
use crate::kernel::control::Zle;
use crate::kernel::services::ports::EditorHost;

new_key_type! { pub struct WidgetId; }

/// 原生 widget 的入口。返回值为退出状态，0 表示成功。
///
/// 执行期间可以通过 `Zle` 重入 `zle` 命令（调用其它 widget、修改名字表）。
pub type WidgetFn = fn(&mut Zle, &mut dyn EditorHost, &[String]) -> i32;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WidgetFlags: u32 {
        /// 可作为 `zle -C` 的基础补全 widget。
        const COMPLETION = 1 << 0;
        const MENU_COMPLETE = 1 << 1;
        const KEEP_SUFFIX = 1 << 2;
        /// 不计入“上一条命令”。
        const NOT_COMMAND = 1 << 3;
        const LINE_MOVE = 1 << 4;
    }
}

#[derive(Clone)]
pub enum WidgetKind {
    /// 模块提供的原生动作。
    Internal(WidgetFn),
    /// 调用解释器中的同名（或指定）函数。
    User { function: CompactString },
    /// 包装一个补全型原生 widget，并在补全过程中调用 `post`。
    Completion {
        function: WidgetFn,
        base: CompactString,
        post: CompactString,
    },
}

impl WidgetKind {
    pub fn is_internal(&self) -> bool {
        matches!(self, WidgetKind::Internal(_))
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, WidgetKind::Completion { .. })
    }
}

impl fmt::Debug for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::Internal(_) => f.write_str("Internal"),
            WidgetKind::User { function } => f.debug_struct("User").field("function", function).finish(),
            WidgetKind::Completion { base, post, .. } => f
                .debug_struct("Completion")
                .field("base", base)
                .field("post", post)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Widget {
    kind: WidgetKind,
    flags: WidgetFlags,
    first: Option<ThingyId>,
}

impl Widget {
    pub fn new(kind: WidgetKind, flags: WidgetFlags) -> Self {
        Self {
            kind,
            flags,
            first: None,
        }
    }

    pub fn internal(function: WidgetFn, flags: WidgetFlags) -> Self {
        Self::new(WidgetKind::Internal(function), flags)
    }

    pub fn user(function: &str) -> Self {
        Self::new(
            WidgetKind::User {
                function: function.into(),
            },
            WidgetFlags::empty(),
        )
    }

    pub fn completion(function: WidgetFn, base: &str, post: &str) -> Self {
        Self::new(
            WidgetKind::Completion {
                function,
                base: base.into(),
                post: post.into(),
            },
            WidgetFlags::MENU_COMPLETE | WidgetFlags::KEEP_SUFFIX,
        )
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    /// 环上任意一个成员；尚未绑定任何名字时为 `None`。
    pub fn first(&self) -> Option<ThingyId> {
        self.first
    }

    pub(crate) fn set_first(&mut self, first: Option<ThingyId>) {
        self.first = first;
    }
}

pub struct WidgetStore {
    arena: SlotMap<WidgetId, Widget>,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, widget: Widget) -> WidgetId {
        self.arena.insert(widget)
    }

    /// 销毁 widget，载荷随之释放；旧的 `WidgetId` 此后查不到任何东西。
    pub fn remove(&mut self, id: WidgetId) -> Option<Widget> {
        self.arena.remove(id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.arena.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.arena.get_mut(id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &Widget)> {
        self.arena.iter()
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/widget.rs"]
mod tests;
