//! Thingy 表：用户可见的名字 → 绑定记录
//!
//! 每个名字一条记录，带引用计数；计数归零时记录从表中移除。
//! 被绑定到 widget 也算一次引用（由 bind 消费调用方持有的那次）。
//! 未绑定（disabled）的记录只用来承载临时引用。

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use super::widget::WidgetId;

new_key_type! { pub struct ThingyId; }

/// 已启用记录的绑定信息：所指的 widget，以及同一 widget 环上的下一个名字。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub widget: WidgetId,
    pub next: ThingyId,
}

#[derive(Debug, Clone)]
pub struct Thingy {
    name: CompactString,
    refcount: u32,
    immortal: bool,
    binding: Option<Binding>,
}

impl Thingy {
    fn new(name: CompactString) -> Self {
        Self {
            name,
            refcount: 0,
            immortal: false,
            binding: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn refcount(&self) -> u32 {
        self.refcount
    }

    pub fn is_enabled(&self) -> bool {
        self.binding.is_some()
    }

    pub fn is_immortal(&self) -> bool {
        self.immortal
    }

    pub fn binding(&self) -> Option<Binding> {
        self.binding
    }

    pub fn widget(&self) -> Option<WidgetId> {
        self.binding.map(|b| b.widget)
    }

    pub fn next_same_widget(&self) -> Option<ThingyId> {
        self.binding.map(|b| b.next)
    }
}

pub struct ThingyTable {
    arena: SlotMap<ThingyId, Thingy>,
    by_name: FxHashMap<CompactString, ThingyId>,
}

impl ThingyTable {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            by_name: FxHashMap::default(),
        }
    }

    /// 查找名字，不存在时新建一条 disabled 记录；总是增加引用计数。
    pub fn lookup_or_create(&mut self, name: &str) -> ThingyId {
        let id = match self.by_name.get(name) {
            Some(&id) => id,
            None => {
                let key = CompactString::from(name);
                let id = self.arena.insert(Thingy::new(key.clone()));
                self.by_name.insert(key, id);
                id
            }
        };
        self.retain(Some(id));
        id
    }

    /// 查找已有记录并增加引用计数，不新建。
    pub fn lookup(&mut self, name: &str) -> Option<ThingyId> {
        let id = self.get(name)?;
        self.retain(Some(id))
    }

    /// 不改变引用计数的查找，只能在不跨越任何可能释放该名字的操作时使用。
    pub fn get(&self, name: &str) -> Option<ThingyId> {
        self.by_name.get(name).copied()
    }

    /// 名字存在且已绑定 widget 时返回。
    pub fn get_enabled(&self, name: &str) -> Option<ThingyId> {
        self.get(name)
            .filter(|&id| self.arena.get(id).is_some_and(Thingy::is_enabled))
    }

    pub fn retain(&mut self, id: Option<ThingyId>) -> Option<ThingyId> {
        if let Some(thingy) = id.and_then(|id| self.arena.get_mut(id)) {
            thingy.refcount += 1;
        }
        id
    }

    /// 释放一次引用；归零时移除记录。
    pub fn release(&mut self, id: ThingyId) {
        let Some(thingy) = self.arena.get_mut(id) else {
            return;
        };
        thingy.refcount = thingy.refcount.saturating_sub(1);
        if thingy.refcount > 0 {
            return;
        }
        debug_assert!(!thingy.is_enabled(), "released a bound thingy");
        if let Some(thingy) = self.arena.remove(id) {
            self.by_name.remove(&thingy.name);
            tracing::trace!(name = %thingy.name, "thingy freed");
        }
    }

    pub fn thingy(&self, id: ThingyId) -> Option<&Thingy> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: ThingyId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn name(&self, id: ThingyId) -> Option<&str> {
        self.arena.get(id).map(Thingy::name)
    }

    pub fn refcount(&self, name: &str) -> Option<u32> {
        self.get(name)
            .and_then(|id| self.arena.get(id))
            .map(Thingy::refcount)
    }

    pub(crate) fn set_binding(&mut self, id: ThingyId, binding: Option<Binding>) {
        if let Some(thingy) = self.arena.get_mut(id) {
            thingy.binding = binding;
        }
    }

    pub(crate) fn set_next(&mut self, id: ThingyId, next: ThingyId) {
        if let Some(binding) = self.arena.get_mut(id).and_then(|t| t.binding.as_mut()) {
            binding.next = next;
        }
    }

    pub(crate) fn set_immortal(&mut self, id: ThingyId, immortal: bool) {
        if let Some(thingy) = self.arena.get_mut(id) {
            thingy.immortal = immortal;
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// 所有已启用记录，顺序不定。
    pub fn enabled(&self) -> impl Iterator<Item = (ThingyId, &Thingy)> {
        self.arena.iter().filter(|(_, t)| t.is_enabled())
    }

    /// 所有已启用记录，按名字排序。
    pub fn enabled_sorted(&self) -> Vec<(ThingyId, &Thingy)> {
        let mut out: Vec<_> = self.enabled().collect();
        out.sort_unstable_by(|a, b| a.1.name.cmp(&b.1.name));
        out
    }
}

impl Default for ThingyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/thingy.rs"]
mod tests;
