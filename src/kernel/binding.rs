//! 绑定引擎：名字 ↔ widget 的多对一关系
//!
//! 同一 widget 的所有名字串成一个环（`Binding::next`），widget 自己记住环上任意一个成员。
//! 所有修改都在返回前把 thingy 表和 widget 表恢复到一致状态，
//! 因为紧接着的重入调用会直接观察到它们。

use crate::core::error::{Result, ZleError};
use crate::models::thingy::{Binding, Thingy, ThingyId, ThingyTable};
use crate::models::widget::{Widget, WidgetFlags, WidgetFn, WidgetId, WidgetKind, WidgetStore};

/// 原生 widget 的隐藏名前缀。
pub const HIDDEN_PREFIX: char = '.';

/// 启动时登记的固定原生 widget。
#[derive(Clone, Copy)]
pub struct BuiltinWidget {
    pub name: &'static str,
    pub function: WidgetFn,
    pub flags: WidgetFlags,
}

pub fn hidden_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    out.push(HIDDEN_PREFIX);
    out.push_str(name);
    out
}

pub struct Registry {
    thingies: ThingyTable,
    widgets: WidgetStore,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            thingies: ThingyTable::new(),
            widgets: WidgetStore::new(),
        }
    }

    pub fn with_builtins(builtins: &[BuiltinWidget]) -> Self {
        let mut registry = Self::new();
        for builtin in builtins {
            if let Err(err) = registry.add_internal(builtin.name, builtin.function, builtin.flags) {
                tracing::warn!(name = builtin.name, error = %err, "builtin widget skipped");
            }
        }
        registry
    }

    pub fn thingies(&self) -> &ThingyTable {
        &self.thingies
    }

    pub fn thingies_mut(&mut self) -> &mut ThingyTable {
        &mut self.thingies
    }

    pub fn widgets(&self) -> &WidgetStore {
        &self.widgets
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    /// 名字当前绑定的 widget。
    pub fn resolve(&self, name: &str) -> Option<WidgetId> {
        self.thingies
            .get(name)
            .and_then(|id| self.thingies.thingy(id))
            .and_then(Thingy::widget)
    }

    /// 把 `thingy` 绑定到 `widget`，消费调用方持有的一次引用。
    ///
    /// 受保护的名字会失败，此时那次引用同样被释放。
    /// 名字原先指向别的 widget 时，先强制解绑。
    pub fn bind(&mut self, widget: WidgetId, thingy: ThingyId) -> Result<()> {
        let Some(t) = self.thingies.thingy(thingy) else {
            return Err(ZleError::NoSuchWidget(String::new()));
        };
        let name = t.name().to_owned();
        let current = t.widget();

        if t.is_immortal() {
            self.thingies.release(thingy);
            tracing::warn!(name = %name, "bind refused: protected name");
            return Err(ZleError::Protected(name));
        }
        if !self.widgets.contains(widget) {
            self.thingies.release(thingy);
            return Err(ZleError::NoSuchWidget(name));
        }
        if let Some(current) = current {
            if current == widget {
                // 名字已经持有一次绑定引用
                self.thingies.release(thingy);
                return Ok(());
            }
            self.unbind(thingy, true)?;
        }

        let first = self.widgets.get(widget).and_then(Widget::first);
        let next = match first {
            Some(first) => {
                let after = self
                    .thingies
                    .thingy(first)
                    .and_then(Thingy::next_same_widget)
                    .unwrap_or(first);
                self.thingies.set_next(first, thingy);
                after
            }
            None => {
                if let Some(w) = self.widgets.get_mut(widget) {
                    w.set_first(Some(thingy));
                }
                thingy
            }
        };
        self.thingies.set_binding(thingy, Some(Binding { widget, next }));
        tracing::debug!(name = %name, "widget bound");
        Ok(())
    }

    /// 解除名字的绑定并释放绑定时消费的那次引用。
    ///
    /// 未绑定的名字视为成功。受保护的名字只有 `force` 时才会被解绑。
    /// 名字是 widget 的最后一个名字时 widget 随之销毁。
    pub fn unbind(&mut self, thingy: ThingyId, force: bool) -> Result<()> {
        let Some(t) = self.thingies.thingy(thingy) else {
            return Ok(());
        };
        let Some(Binding { widget, next }) = t.binding() else {
            return Ok(());
        };
        if t.is_immortal() && !force {
            return Err(ZleError::Protected(t.name().to_owned()));
        }
        tracing::debug!(name = t.name(), force, "widget unbound");

        if next == thingy {
            self.widgets.remove(widget);
        } else {
            let prev = self.predecessor(widget, thingy);
            self.thingies.set_next(prev, next);
            if let Some(w) = self.widgets.get_mut(widget) {
                w.set_first(Some(prev));
            }
        }

        self.thingies.set_immortal(thingy, false);
        self.thingies.set_binding(thingy, None);
        self.thingies.release(thingy);
        Ok(())
    }

    fn predecessor(&self, widget: WidgetId, thingy: ThingyId) -> ThingyId {
        let start = self
            .widgets
            .get(widget)
            .and_then(Widget::first)
            .unwrap_or(thingy);
        let mut p = start;
        for _ in 0..self.thingies.len() {
            match self.thingies.thingy(p).and_then(Thingy::next_same_widget) {
                Some(n) if n == thingy => return p,
                Some(n) => p = n,
                None => break,
            }
        }
        debug_assert!(false, "thingy missing from its widget ring");
        start
    }

    /// 给已存在的 widget 增加一个名字。
    pub fn link(&mut self, widget: WidgetId, name: &str) -> Result<()> {
        let thingy = self.thingies.lookup_or_create(name);
        self.bind(widget, thingy)
    }

    /// 分配一个新 widget 并绑定到 `name`；绑定失败时 widget 直接销毁。
    pub fn create_widget(&mut self, name: &str, widget: Widget) -> Result<WidgetId> {
        let id = self.widgets.insert(widget);
        let thingy = self.thingies.lookup_or_create(name);
        if let Err(err) = self.bind(id, thingy) {
            self.widgets.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    pub fn add_user_widget(&mut self, name: &str, function: &str) -> Result<WidgetId> {
        self.create_widget(name, Widget::user(function))
    }

    /// 以补全型原生 widget `base` 为基础创建补全 widget。
    ///
    /// `base` 不以 `.` 开头时查找其隐藏名，这样用户重绑普通名字不影响结果。
    pub fn add_completion_widget(&mut self, name: &str, base: &str, post: &str) -> Result<WidgetId> {
        let hidden = if base.starts_with(HIDDEN_PREFIX) {
            base.to_owned()
        } else {
            hidden_name(base)
        };
        let base_thingy = self.thingies.lookup_or_create(&hidden);
        let wrapped = self
            .thingies
            .thingy(base_thingy)
            .and_then(Thingy::widget)
            .and_then(|w| self.widgets.get(w))
            .and_then(|w| match w.kind() {
                WidgetKind::Internal(f) if w.flags().contains(WidgetFlags::COMPLETION) => Some(*f),
                _ => None,
            });
        self.thingies.release(base_thingy);

        let Some(function) = wrapped else {
            tracing::warn!(base, "completion base is not a completion widget");
            return Err(ZleError::InvalidWidget(base.to_owned()));
        };
        self.create_widget(name, Widget::completion(function, base, post))
    }

    /// 登记原生 widget：先绑定受保护的隐藏名 `.name`，再绑定可重绑的 `name`。
    pub fn add_internal(&mut self, name: &str, function: WidgetFn, flags: WidgetFlags) -> Result<WidgetId> {
        if name.starts_with(HIDDEN_PREFIX) {
            return Err(ZleError::DottedName(name.to_owned()));
        }
        let dotted = hidden_name(name);
        let taken = self
            .thingies
            .get(&dotted)
            .and_then(|id| self.thingies.thingy(id))
            .is_some_and(Thingy::is_immortal);
        if taken {
            return Err(ZleError::InternalExists(name.to_owned()));
        }

        let widget = self.create_widget(&dotted, Widget::internal(function, flags))?;
        if let Some(hidden) = self.thingies.get(&dotted) {
            self.thingies.set_immortal(hidden, true);
        }
        if let Err(err) = self.link(widget, name) {
            tracing::warn!(name, error = %err, "internal widget left without plain name");
        }
        tracing::debug!(name, "internal widget registered");
        Ok(widget)
    }

    /// 移除原生 widget 及其全部名字（包括受保护的隐藏名）。
    pub fn delete_internal(&mut self, widget: WidgetId) {
        let Some(mut p) = self.widgets.get(widget).and_then(Widget::first) else {
            return;
        };
        loop {
            let Some(n) = self.thingies.thingy(p).and_then(Thingy::next_same_widget) else {
                return;
            };
            let _ = self.unbind(p, true);
            if n == p {
                return;
            }
            p = n;
        }
    }

    /// widget 环上的所有名字，从代表成员开始。
    pub fn names_of(&self, widget: WidgetId) -> Vec<&str> {
        let Some(start) = self.widgets.get(widget).and_then(Widget::first) else {
            return Vec::new();
        };
        let mut names = Vec::new();
        let mut p = start;
        for _ in 0..self.thingies.len() {
            let Some(t) = self.thingies.thingy(p) else {
                break;
            };
            names.push(t.name());
            match t.next_same_widget() {
                Some(n) if n != start => p = n,
                _ => break,
            }
        }
        names
    }

    /// 解绑所有非原生 widget 的名字，原生集合保持不变。
    pub fn teardown(&mut self) {
        let doomed: Vec<ThingyId> = self
            .thingies
            .enabled()
            .filter(|(_, t)| {
                t.widget()
                    .and_then(|w| self.widgets.get(w))
                    .is_some_and(|w| !w.kind().is_internal())
            })
            .map(|(id, _)| id)
            .collect();
        for id in doomed {
            let _ = self.unbind(id, true);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/binding.rs"]
mod tests;
