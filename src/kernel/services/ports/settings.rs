use serde::{Deserialize, Serialize};

/// 启动时应用的 widget 定义。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub widgets: Vec<WidgetRule>,
    #[serde(default)]
    pub completion_widgets: Vec<CompletionRule>,
    #[serde(default)]
    pub aliases: Vec<AliasRule>,
    #[serde(default)]
    pub watch_fds: Vec<WatchRule>,
}

/// 等价于 `zle -N name [function]`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// 等价于 `zle -C name base function`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRule {
    pub name: String,
    pub base: String,
    pub function: String,
}

/// 等价于 `zle -A from to`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub from: String,
    pub to: String,
}

/// 等价于 `zle -F fd handler`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRule {
    pub fd: i32,
    pub handler: String,
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
