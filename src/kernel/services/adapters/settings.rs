//! 配置文件：读取 JSON 并把其中的定义应用到 `Zle`

use std::io;
use std::path::{Path, PathBuf};

use super::paths::{ensure_dir, get_settings_path, resolve};
use crate::core::error::ZleError;
use crate::kernel::control::Zle;
use crate::kernel::services::ports::settings::Settings;

/// 配置文件不存在时写入默认配置。
pub fn ensure_settings_file() -> io::Result<PathBuf> {
    let path = resolve(get_settings_path(), "settings")?;
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&Settings::default()).map_err(io::Error::other)?;
        std::fs::write(&path, content)?;
    }
    Ok(path)
}

pub fn load_settings_from(path: &Path) -> io::Result<Settings> {
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// 依次应用普通 widget、补全 widget、别名与 fd 监听；单条失败不影响其余条目。
pub fn apply_settings(zle: &mut Zle, settings: &Settings) -> Vec<ZleError> {
    let mut errors = Vec::new();

    for rule in &settings.widgets {
        let function = rule.function.as_deref().unwrap_or(&rule.name);
        if let Err(err) = zle.registry_mut().add_user_widget(&rule.name, function) {
            errors.push(err);
        }
    }
    for rule in &settings.completion_widgets {
        if let Err(err) = zle
            .registry_mut()
            .add_completion_widget(&rule.name, &rule.base, &rule.function)
        {
            errors.push(err);
        }
    }
    for rule in &settings.aliases {
        if let Err(err) = zle.link(&rule.from, &rule.to) {
            errors.push(err);
        }
    }
    for rule in &settings.watch_fds {
        if rule.fd < 0 {
            errors.push(ZleError::BadFd(rule.fd.to_string()));
        } else {
            zle.watches_mut().insert(rule.fd, &rule.handler);
        }
    }

    for err in &errors {
        tracing::warn!(error = %err, "settings rule rejected");
    }
    tracing::info!(
        widgets = settings.widgets.len(),
        completion_widgets = settings.completion_widgets.len(),
        aliases = settings.aliases.len(),
        watch_fds = settings.watch_fds.len(),
        rejected = errors.len(),
        "settings applied"
    );
    errors
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
