//! `zle -l` 的输出格式

use crate::kernel::binding::Registry;
use crate::models::widget::WidgetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// `name`, `name (func)`, `name -C base func`
    Plain,
    /// `-L`: 可重新输入的 `zle -N` / `zle -C` 命令
    Definitions,
    /// `-a`: 只输出名字，包括原生 widget 与隐藏名
    Raw,
}

/// 按名字排序列出所有已绑定的名字；除 `Raw` 外跳过原生 widget。
pub fn render(registry: &Registry, mode: ListMode) -> Vec<String> {
    let mut lines = Vec::new();
    for (_, thingy) in registry.thingies().enabled_sorted() {
        let Some(widget) = thingy.widget().and_then(|w| registry.widget(w)) else {
            continue;
        };
        let name = thingy.name();
        if mode == ListMode::Raw {
            lines.push(name.to_owned());
            continue;
        }
        let line = match (mode, widget.kind()) {
            (_, WidgetKind::Internal(_)) => continue,
            (ListMode::Definitions, kind) => definition_line(name, kind),
            (_, WidgetKind::User { function }) if function.as_str() != name => {
                format!("{} ({})", nice(name), nice(function))
            }
            (_, WidgetKind::User { .. }) => nice(name),
            (_, WidgetKind::Completion { base, post, .. }) => {
                format!("{} -C {} {}", nice(name), nice(base), nice(post))
            }
        };
        lines.push(line);
    }
    lines
}

fn definition_line(name: &str, kind: &WidgetKind) -> String {
    let flag = if kind.is_completion() { 'C' } else { 'N' };
    let mut line = format!("zle -{flag} ");
    if name.starts_with('-') {
        line.push_str("-- ");
    }
    line.push_str(&quote(name));
    match kind {
        WidgetKind::Completion { base, post, .. } => {
            line.push(' ');
            line.push_str(&quote(base));
            line.push(' ');
            line.push_str(&quote(post));
        }
        WidgetKind::User { function } if function.as_str() != name => {
            line.push(' ');
            line.push_str(&quote(function));
        }
        _ => {}
    }
    line
}

/// 为 shell 重新输入加引号；安全字符组成的单词原样输出。
pub fn quote(word: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "_-./:@%+,".contains(c);
    if !word.is_empty() && word.chars().all(safe) {
        return word.to_owned();
    }
    let mut out = String::with_capacity(word.len() + 2);
    out.push('\'');
    for c in word.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// 把控制字符显示为 `^X` 形式。
pub fn nice(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c as u32 {
            0..=0x1f => {
                out.push('^');
                out.push(char::from(c as u8 + 0x40));
            }
            0x7f => out.push_str("^?"),
            _ if c.is_control() => out.extend(c.escape_default()),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/control/list.rs"]
mod tests;
