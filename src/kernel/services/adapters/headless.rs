//! 无终端的编辑器宿主：全部状态保存在内存中，供命令行前端和测试使用

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::kernel::control::{CommandOutput, Zle};
use crate::kernel::services::ports::{EditorHost, Modifier, RefreshRequest};

const DEFAULT_KEYMAPS: &[&str] = &[
    "main",
    "emacs",
    "viins",
    "vicmd",
    "isearch",
    "command",
    ".safe",
];

/// 一次解释器函数调用，连同调用时刻生效的分发状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<String>,
    pub modifier: Modifier,
    pub keymap: String,
    pub in_completion: bool,
    pub in_widget: bool,
}

/// 解释器函数：固定的退出状态，加上依次执行的 `zle` 命令。
#[derive(Debug, Clone, Default)]
struct FunctionDef {
    status: i32,
    body: Vec<Vec<String>>,
}

pub struct HeadlessHost {
    active: bool,
    widget_depth: usize,
    completions: Vec<String>,
    modifier: Modifier,
    keymap: String,
    keymaps: FxHashSet<String>,
    functions: FxHashMap<String, FunctionDef>,
    calls: Vec<FunctionCall>,
    nested_outputs: Vec<CommandOutput>,
    completion_log: Vec<String>,
    pending_input: VecDeque<u8>,
    messages: Vec<String>,
    refreshes: Vec<RefreshRequest>,
    trashed: bool,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            active: false,
            widget_depth: 0,
            completions: Vec::new(),
            modifier: Modifier::default(),
            keymap: "main".to_string(),
            keymaps: DEFAULT_KEYMAPS.iter().map(|s| s.to_string()).collect(),
            functions: FxHashMap::default(),
            calls: Vec::new(),
            nested_outputs: Vec::new(),
            completion_log: Vec::new(),
            pending_input: VecDeque::new(),
            messages: Vec::new(),
            refreshes: Vec::new(),
            trashed: false,
        }
    }

    /// 处于编辑会话中的宿主。
    pub fn active() -> Self {
        let mut host = Self::new();
        host.set_active(true);
        host
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if active {
            self.trashed = false;
        }
    }

    /// 定义解释器函数及其返回状态，清空已有的函数体。
    pub fn define_function(&mut self, name: &str, status: i32) {
        self.functions.insert(
            name.to_string(),
            FunctionDef {
                status,
                body: Vec::new(),
            },
        );
    }

    /// 在函数体末尾追加一条 `zle` 命令；函数不存在时以状态 0 新建。
    pub fn add_function_command<S: AsRef<str>>(&mut self, name: &str, argv: &[S]) {
        let argv = argv.iter().map(|s| s.as_ref().to_string()).collect();
        self.functions
            .entry(name.to_string())
            .or_default()
            .body
            .push(argv);
    }

    pub fn add_keymap(&mut self, name: &str) {
        self.keymaps.insert(name.to_string());
    }

    pub fn calls(&self) -> &[FunctionCall] {
        &self.calls
    }

    /// 依次开始过的补全回调函数名。
    pub fn completion_log(&self) -> &[String] {
        &self.completion_log
    }

    /// 函数体内执行的 `zle` 命令的结果，按执行顺序。
    pub fn nested_outputs(&self) -> &[CommandOutput] {
        &self.nested_outputs
    }

    pub fn take_nested_outputs(&mut self) -> Vec<CommandOutput> {
        std::mem::take(&mut self.nested_outputs)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn refreshes(&self) -> &[RefreshRequest] {
        &self.refreshes
    }

    pub fn pending_input(&self) -> Vec<u8> {
        self.pending_input.iter().copied().collect()
    }

    /// 读取下一个待处理的输入字节。
    pub fn read_byte(&mut self) -> Option<u8> {
        self.pending_input.pop_front()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHost for HeadlessHost {
    fn is_active(&self) -> bool {
        self.active
    }

    fn in_completion(&self) -> bool {
        !self.completions.is_empty()
    }

    fn in_widget(&self) -> bool {
        self.widget_depth > 0
    }

    fn begin_widget(&mut self) {
        self.widget_depth += 1;
    }

    fn end_widget(&mut self) {
        self.widget_depth = self.widget_depth.saturating_sub(1);
    }

    fn call_function(&mut self, zle: &mut Zle, name: &str, args: &[String]) -> i32 {
        self.calls.push(FunctionCall {
            name: name.to_string(),
            args: args.to_vec(),
            modifier: self.modifier,
            keymap: self.keymap.clone(),
            in_completion: self.in_completion(),
            in_widget: self.in_widget(),
        });
        let Some(def) = self.functions.get(name).cloned() else {
            tracing::warn!(name, "function definition file not found");
            return 1;
        };
        for argv in &def.body {
            let out = zle.execute(self, argv.as_slice());
            self.nested_outputs.push(out);
        }
        def.status
    }

    fn begin_completion(&mut self, function: &str) {
        self.completions.push(function.to_string());
        self.completion_log.push(function.to_string());
    }

    fn end_completion(&mut self) {
        self.completions.pop();
    }

    fn modifier(&self) -> Modifier {
        self.modifier
    }

    fn set_modifier(&mut self, modifier: Modifier) {
        self.modifier = modifier;
    }

    fn current_keymap(&self) -> String {
        self.keymap.clone()
    }

    fn select_keymap(&mut self, name: &str) -> bool {
        if !self.keymaps.contains(name) {
            return false;
        }
        self.keymap = name.to_string();
        true
    }

    fn refresh(&mut self, request: &RefreshRequest) {
        self.trashed = false;
        self.refreshes.push(request.clone());
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn unget_byte(&mut self, byte: u8) {
        self.pending_input.push_front(byte);
    }

    fn is_trashed(&self) -> bool {
        self.trashed
    }

    fn trash(&mut self) {
        self.trashed = true;
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/headless.rs"]
mod tests;
