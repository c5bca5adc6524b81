//! 路径管理：缓存目录下的配置与日志位置
//!
//! 缓存目录：macOS 为 `~/Library/Caches`，其余平台为 `$XDG_CACHE_HOME` 或 `~/.cache`。

use std::io;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "zline";
const LOG_DIR: &str = "logs";
const SETTINGS_DIR: &str = ".zline";
const SETTINGS_FILE: &str = "setting.json";

fn home_join(rel: &str) -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(rel))
}

pub fn get_cache_dir() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        return home_join("Library/Caches");
    }
    std::env::var_os("XDG_CACHE_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_join(".cache"))
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_cache_dir().map(|p| p.join(APP_NAME).join(LOG_DIR))
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// 无法确定缓存目录时报 `NotFound`。
pub(crate) fn resolve(path: Option<PathBuf>, what: &str) -> io::Result<PathBuf> {
    path.ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("Cannot determine {what} directory"))
    })
}

pub(crate) fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

pub fn ensure_log_dir() -> io::Result<PathBuf> {
    let dir = resolve(get_log_dir(), "log")?;
    ensure_dir(&dir)?;
    Ok(dir)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/paths.rs"]
mod tests;
