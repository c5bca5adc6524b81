//! Dispatch gateway：按名字调用 widget
//!
//! 调用方给出的数值前缀和临时 keymap 写入宿主的分发状态，
//! 由 `DispatchScope` 在离开作用域时恢复（包括出错提前返回的路径）。
//! widget 运行时持有 `&mut Zle`，可以重入调用其它 widget 或修改名字表，
//! 包括删除正在运行的 widget 自己的名字。

use crate::core::error::{Result, ZleError};
use crate::kernel::control::Zle;
use crate::kernel::services::ports::{EditorHost, Modifier};
use crate::models::thingy::Thingy;
use crate::models::widget::WidgetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultOverride {
    /// `-n num`
    Set(i32),
    /// `-N`
    Clear,
}

/// `zle widget [-n num] [-N] [-K keymap] [--] args...` 中的选项部分。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub mult: Option<MultOverride>,
    pub keymap: Option<String>,
}

impl CallOptions {
    /// 解析选项，返回剩余的 widget 参数。选项可合并书写（`-Nn3`），`-` 或 `--` 结束选项。
    pub fn parse(args: &[String]) -> Result<(Self, &[String])> {
        let mut options = Self::default();
        let mut i = 0;
        while let Some(arg) = args.get(i) {
            let Some(flags) = arg.strip_prefix('-') else {
                break;
            };
            if flags.is_empty() || flags.starts_with('-') {
                i += 1;
                break;
            }
            for (pos, ch) in flags.char_indices() {
                let rest = &flags[pos + ch.len_utf8()..];
                match ch {
                    'n' => {
                        let value = if rest.is_empty() {
                            i += 1;
                            args.get(i).ok_or(ZleError::NumberExpected('n'))?.as_str()
                        } else {
                            rest
                        };
                        let mult = value
                            .trim()
                            .parse::<i32>()
                            .map_err(|_| ZleError::BadNumber(value.to_owned()))?;
                        options.mult = Some(MultOverride::Set(mult));
                        break;
                    }
                    'N' => options.mult = Some(MultOverride::Clear),
                    'K' => {
                        let value = if rest.is_empty() {
                            i += 1;
                            args.get(i).ok_or(ZleError::KeymapExpected('K'))?.as_str()
                        } else {
                            rest
                        };
                        options.keymap = Some(value.to_owned());
                        break;
                    }
                    _ => return Err(ZleError::UnknownOption(flags[pos..].to_owned())),
                }
            }
            i += 1;
        }
        Ok((options, &args[i.min(args.len())..]))
    }
}

/// 调用期间对宿主分发状态的临时覆盖，drop 时恢复原值。
pub struct DispatchScope<'h> {
    host: &'h mut dyn EditorHost,
    saved_modifier: Option<Modifier>,
    saved_keymap: Option<String>,
}

impl<'h> DispatchScope<'h> {
    pub fn new(host: &'h mut dyn EditorHost) -> Self {
        Self {
            host,
            saved_modifier: None,
            saved_keymap: None,
        }
    }

    pub fn set_modifier(&mut self, modifier: Modifier) {
        if self.saved_modifier.is_none() {
            self.saved_modifier = Some(self.host.modifier());
        }
        self.host.set_modifier(modifier);
    }

    pub fn select_keymap(&mut self, name: &str) -> Result<()> {
        let previous = self.host.current_keymap();
        if !self.host.select_keymap(name) {
            return Err(ZleError::NoSuchKeymap(name.to_owned()));
        }
        if self.saved_keymap.is_none() {
            self.saved_keymap = Some(previous);
        }
        Ok(())
    }

    pub fn apply(&mut self, options: &CallOptions) -> Result<()> {
        match options.mult {
            Some(MultOverride::Set(mult)) => self.set_modifier(Modifier::with_mult(mult)),
            Some(MultOverride::Clear) => self.set_modifier(Modifier::default()),
            None => {}
        }
        if let Some(keymap) = &options.keymap {
            self.select_keymap(keymap)?;
        }
        Ok(())
    }

    pub fn host(&mut self) -> &mut (dyn EditorHost + 'h) {
        &mut *self.host
    }
}

impl Drop for DispatchScope<'_> {
    fn drop(&mut self) {
        if let Some(modifier) = self.saved_modifier.take() {
            self.host.set_modifier(modifier);
        }
        if let Some(keymap) = self.saved_keymap.take() {
            if !self.host.select_keymap(&keymap) {
                tracing::warn!(keymap = %keymap, "restore keymap failed");
            }
        }
    }
}

/// widget 执行期间标记宿主处于 widget 中。
struct WidgetScope<'h> {
    host: &'h mut dyn EditorHost,
}

impl<'h> WidgetScope<'h> {
    fn enter(host: &'h mut dyn EditorHost) -> Self {
        host.begin_widget();
        Self { host }
    }
}

impl Drop for WidgetScope<'_> {
    fn drop(&mut self) {
        self.host.end_widget();
    }
}

/// 补全 widget 执行期间标记宿主处于补全回调中。
struct CompletionScope<'h> {
    host: &'h mut dyn EditorHost,
}

impl<'h> CompletionScope<'h> {
    fn enter(host: &'h mut dyn EditorHost, function: &str) -> Self {
        host.begin_completion(function);
        Self { host }
    }
}

impl Drop for CompletionScope<'_> {
    fn drop(&mut self) {
        self.host.end_completion();
    }
}

/// 执行 widget 本体。
pub fn run_widget(zle: &mut Zle, host: &mut dyn EditorHost, kind: &WidgetKind, args: &[String]) -> i32 {
    let mut widget = WidgetScope::enter(host);
    match kind {
        WidgetKind::Internal(function) => function(zle, &mut *widget.host, args),
        WidgetKind::User { function } => widget.host.call_function(zle, function, args),
        WidgetKind::Completion { function, post, .. } => {
            let mut scope = CompletionScope::enter(&mut *widget.host, post);
            function(zle, &mut *scope.host, args)
        }
    }
}

/// 按名字调用 widget，返回 widget 自身的退出状态。
///
/// 编辑器不可用时返回 `EditorInactive`；名字未绑定时返回 `NoSuchWidget`。
/// 运行期间一直持有名字的引用，widget 即使解绑了自己，记录也要等这里释放后才回收。
pub fn invoke(
    zle: &mut Zle,
    host: &mut dyn EditorHost,
    name: &str,
    options: &CallOptions,
    args: &[String],
) -> Result<i32> {
    if !host.is_usable() {
        return Err(ZleError::EditorInactive);
    }

    let thingy = zle.registry_mut().thingies_mut().lookup_or_create(name);
    let registry = zle.registry();
    let kind = registry
        .thingies()
        .thingy(thingy)
        .and_then(Thingy::widget)
        .and_then(|w| registry.widget(w))
        .map(|w| w.kind().clone());

    let result = match kind {
        None => Err(ZleError::NoSuchWidget(name.to_owned())),
        Some(kind) => {
            let mut scope = DispatchScope::new(host);
            scope.apply(options).map(|()| {
                tracing::debug!(name, "invoke widget");
                run_widget(zle, scope.host(), &kind, args)
            })
        }
    };

    zle.registry_mut().thingies_mut().release(thingy);
    result
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/dispatch.rs"]
mod tests;
