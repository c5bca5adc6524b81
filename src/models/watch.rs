//! 文件描述符监听表：(fd, 处理函数名) 列表
//!
//! 只维护登记信息，轮询由外部事件循环负责。

use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFd {
    pub fd: i32,
    pub handler: CompactString,
}

#[derive(Debug, Clone, Default)]
pub struct WatchTable {
    entries: Vec<WatchFd>,
}

impl WatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记处理函数；fd 已存在时替换，返回被替换的旧处理函数。
    pub fn insert(&mut self, fd: i32, handler: &str) -> Option<CompactString> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.fd == fd) {
            return Some(std::mem::replace(&mut entry.handler, handler.into()));
        }
        self.entries.push(WatchFd {
            fd,
            handler: handler.into(),
        });
        None
    }

    /// 移除 fd 的处理函数，其余条目保持原有顺序。
    pub fn remove(&mut self, fd: i32) -> Option<CompactString> {
        let idx = self.entries.iter().position(|e| e.fd == fd)?;
        Some(self.entries.remove(idx).handler)
    }

    pub fn handler(&self, fd: i32) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.fd == fd)
            .map(|e| e.handler.as_str())
    }

    pub fn entries(&self) -> &[WatchFd] {
        &self.entries
    }

    pub fn fds(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|e| e.fd)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/watch.rs"]
mod tests;
