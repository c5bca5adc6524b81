//! `zle` 命令：widget 子系统对解释器暴露的管理接口
//!
//! 操作选择符互斥（`-l -D -A -N -C -R -M -U -K -I -F`），都不给时按名字调用 widget。
//! 每个操作有自己的参数个数范围，越界时不执行操作。

pub mod list;

use rustc_hash::FxHashSet;

use crate::core::error::{Result, ZleError};
use crate::kernel::binding::{BuiltinWidget, Registry};
use crate::kernel::dispatch::{self, CallOptions};
use crate::kernel::services::ports::{EditorHost, RefreshRequest};
use crate::models::watch::WatchTable;

pub use list::ListMode;

/// `zle` 接受的选项字母。
const OPTION_LETTERS: &str = "aAcCDFIKlLMNRU";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Delete,
    Link,
    New,
    Complete,
    Refresh,
    Message,
    Unget,
    Keymap,
    Invalidate,
    WatchFd,
    Call,
}

struct OperationSpec {
    op: Operation,
    flag: char,
    min: usize,
    max: Option<usize>,
}

/// 选择顺序即优先顺序；`Call` 没有选择符，放在最后。
const OPERATIONS: &[OperationSpec] = &[
    OperationSpec { op: Operation::List, flag: 'l', min: 0, max: None },
    OperationSpec { op: Operation::Delete, flag: 'D', min: 1, max: None },
    OperationSpec { op: Operation::Link, flag: 'A', min: 2, max: Some(2) },
    OperationSpec { op: Operation::New, flag: 'N', min: 1, max: Some(2) },
    OperationSpec { op: Operation::Complete, flag: 'C', min: 3, max: Some(3) },
    OperationSpec { op: Operation::Refresh, flag: 'R', min: 0, max: None },
    OperationSpec { op: Operation::Message, flag: 'M', min: 1, max: Some(1) },
    OperationSpec { op: Operation::Unget, flag: 'U', min: 1, max: Some(1) },
    OperationSpec { op: Operation::Keymap, flag: 'K', min: 1, max: Some(1) },
    OperationSpec { op: Operation::Invalidate, flag: 'I', min: 0, max: Some(0) },
    OperationSpec { op: Operation::WatchFd, flag: 'F', min: 0, max: Some(2) },
];

const CALL: OperationSpec = OperationSpec {
    op: Operation::Call,
    flag: '\0',
    min: 0,
    max: None,
};

/// 已解析的选项字母集合。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    set: FxHashSet<char>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, flag: char) -> Self {
        self.set.insert(flag);
        self
    }

    pub fn insert(&mut self, flag: char) {
        self.set.insert(flag);
    }

    pub fn is_set(&self, flag: char) -> bool {
        self.set.contains(&flag)
    }
}

/// 把 `zle` 的参数向量拆成选项和普通参数。
///
/// 选项只出现在开头；`-` 或 `--` 之后、以及第一个非选项参数之后全部是普通参数。
pub fn parse_argv<S: AsRef<str>>(argv: &[S]) -> Result<(Options, Vec<String>)> {
    let mut options = Options::new();
    let mut i = 0;
    while let Some(arg) = argv.get(i).map(as_str) {
        let Some(flags) = arg.strip_prefix('-') else {
            break;
        };
        if flags.is_empty() || flags == "-" {
            i += 1;
            break;
        }
        for c in flags.chars() {
            if !OPTION_LETTERS.contains(c) {
                return Err(ZleError::UnknownOption(format!("-{c}")));
            }
            options.insert(c);
        }
        i += 1;
    }
    let args = argv[i..].iter().map(|s| as_str(s).to_owned()).collect();
    Ok((options, args))
}

fn as_str<S: AsRef<str>>(s: &S) -> &str {
    s.as_ref()
}

/// 一次 `zle` 命令的结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 退出状态，0 为成功。
    pub status: i32,
    /// 标准输出的行。
    pub stdout: Vec<String>,
    /// 按发生顺序记录的错误。
    pub diagnostics: Vec<ZleError>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    fn print(&mut self, line: String) {
        self.stdout.push(line);
    }

    fn fail(&mut self, err: ZleError) {
        tracing::debug!(error = %err, "zle command failed");
        self.status = 1;
        self.diagnostics.push(err);
    }

    fn record<T>(&mut self, result: Result<T>) {
        if let Err(err) = result {
            self.fail(err);
        }
    }
}

/// widget 子系统的上下文：名字表、widget 表和 fd 监听表。
pub struct Zle {
    registry: Registry,
    watches: WatchTable,
}

impl Zle {
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    pub fn with_builtins(builtins: &[BuiltinWidget]) -> Self {
        Self::with_registry(Registry::with_builtins(builtins))
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            watches: WatchTable::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn watches(&self) -> &WatchTable {
        &self.watches
    }

    pub fn watches_mut(&mut self) -> &mut WatchTable {
        &mut self.watches
    }

    /// 卸载前调用：解绑所有用户定义的 widget 并清空 fd 监听表。
    pub fn teardown(&mut self) {
        self.registry.teardown();
        self.watches = WatchTable::new();
    }

    /// 解析参数向量并执行。
    pub fn execute<S: AsRef<str>>(&mut self, host: &mut dyn EditorHost, argv: &[S]) -> CommandOutput {
        match parse_argv(argv) {
            Ok((options, args)) => self.run(host, &options, &args),
            Err(err) => {
                let mut out = CommandOutput::default();
                out.fail(err);
                out
            }
        }
    }

    pub fn run(&mut self, host: &mut dyn EditorHost, options: &Options, args: &[String]) -> CommandOutput {
        let mut out = CommandOutput::default();
        let spec = match select_operation(options) {
            Ok(spec) => spec,
            Err(err) => {
                out.fail(err);
                return out;
            }
        };
        if let Err(err) = check_arity(spec, args.len()) {
            out.fail(err);
            return out;
        }

        match spec.op {
            Operation::List => self.list(options, args, &mut out),
            Operation::Delete => self.delete(args, &mut out),
            Operation::Link => {
                let result = self.link(&args[0], &args[1]);
                out.record(result);
            }
            Operation::New => {
                let function = args.get(1).unwrap_or(&args[0]);
                let result = self.registry.add_user_widget(&args[0], function);
                out.record(result);
            }
            Operation::Complete => {
                let result = self.registry.add_completion_widget(&args[0], &args[1], &args[2]);
                out.record(result);
            }
            Operation::Refresh => refresh(host, options, args, &mut out),
            Operation::Message => out.record(message(host, &args[0])),
            Operation::Unget => out.record(unget(host, &args[0])),
            Operation::Keymap => out.record(select_keymap(host, &args[0])),
            Operation::Invalidate => invalidate(host, &mut out),
            Operation::WatchFd => self.watch_fd(options, args, &mut out),
            Operation::Call => self.call(host, args, &mut out),
        }
        out
    }

    fn list(&self, options: &Options, args: &[String], out: &mut CommandOutput) {
        let all = options.is_set('a');
        if args.is_empty() {
            let mode = if all {
                ListMode::Raw
            } else if options.is_set('L') {
                ListMode::Definitions
            } else {
                ListMode::Plain
            };
            for line in list::render(&self.registry, mode) {
                out.print(line);
            }
            return;
        }

        // 只检查存在性，遇到第一个缺失的名字即停止
        let missing = args.iter().any(|name| {
            match self.registry.resolve(name).and_then(|w| self.registry.widget(w)) {
                None => true,
                Some(widget) => !all && widget.kind().is_internal(),
            }
        });
        if missing {
            out.status = 1;
        }
    }

    fn delete(&mut self, args: &[String], out: &mut CommandOutput) {
        for name in args {
            let result = match self.registry.thingies().get_enabled(name) {
                None => Err(ZleError::NoSuchWidget(name.clone())),
                Some(thingy) => self.registry.unbind(thingy, false),
            };
            out.record(result);
        }
    }

    /// 让 `to` 成为 `from` 所指 widget 的又一个名字。
    pub fn link(&mut self, from: &str, to: &str) -> Result<()> {
        let widget = self
            .registry
            .resolve(from)
            .ok_or_else(|| ZleError::NoSuchWidget(from.to_owned()))?;
        self.registry.link(widget, to)
    }

    fn watch_fd(&mut self, options: &Options, args: &[String], out: &mut CommandOutput) {
        let fd = match args.first().map(|s| parse_fd(s)).transpose() {
            Ok(fd) => fd,
            Err(err) => return out.fail(err),
        };

        if options.is_set('L') || fd.is_none() {
            if args.len() > 1 {
                return out.fail(ZleError::TooManyArguments("FL".to_owned()));
            }
            let mut found = false;
            for entry in self.watches.entries() {
                if fd.is_some_and(|fd| fd != entry.fd) {
                    continue;
                }
                found = true;
                out.print(format!("zle -F {} {}", entry.fd, entry.handler));
            }
            if fd.is_some() && !found {
                out.status = 1;
            }
            return;
        }

        let Some(fd) = fd else {
            return;
        };
        match args.get(1) {
            Some(handler) => {
                if let Some(old) = self.watches.insert(fd, handler) {
                    tracing::debug!(fd, old = %old, new = %handler, "watch handler replaced");
                }
            }
            None => {
                if self.watches.remove(fd).is_none() {
                    out.fail(ZleError::NoFdHandler(fd));
                }
            }
        }
    }

    fn call(&mut self, host: &mut dyn EditorHost, args: &[String], out: &mut CommandOutput) {
        let Some((name, rest)) = args.split_first() else {
            // 不带名字：只探测 widget 当前是否可调用
            if !host.is_usable() {
                out.status = 1;
            }
            return;
        };
        if !host.is_usable() {
            return out.fail(ZleError::EditorInactive);
        }
        let result = CallOptions::parse(rest).and_then(|(options, widget_args)| {
            dispatch::invoke(self, host, name, &options, widget_args)
        });
        match result {
            Ok(status) => out.status = status,
            Err(err) => out.fail(err),
        }
    }
}

impl Default for Zle {
    fn default() -> Self {
        Self::new()
    }
}

fn select_operation(options: &Options) -> Result<&'static OperationSpec> {
    let Some(pos) = OPERATIONS.iter().position(|s| options.is_set(s.flag)) else {
        return Ok(&CALL);
    };
    if OPERATIONS[pos + 1..].iter().any(|s| options.is_set(s.flag)) {
        return Err(ZleError::IncompatibleOptions);
    }
    Ok(&OPERATIONS[pos])
}

fn check_arity(spec: &OperationSpec, n: usize) -> Result<()> {
    if n < spec.min {
        return Err(ZleError::NotEnoughArguments(spec.flag.to_string()));
    }
    if spec.max.is_some_and(|max| n > max) {
        return Err(ZleError::TooManyArguments(spec.flag.to_string()));
    }
    Ok(())
}

/// 十进制非负 fd；允许前导空白。
pub fn parse_fd(text: &str) -> Result<i32> {
    text.trim_start()
        .parse::<i32>()
        .ok()
        .filter(|fd| *fd >= 0)
        .ok_or_else(|| ZleError::BadFd(text.to_owned()))
}

fn refresh(host: &mut dyn EditorHost, options: &Options, args: &[String], out: &mut CommandOutput) {
    if !host.is_active() {
        out.status = 1;
        return;
    }
    let clear = options.is_set('c');
    let mut request = RefreshRequest::default();
    match args.split_first() {
        Some((status, list)) => {
            if !status.is_empty() {
                request.status = Some(status.clone());
            }
            if !list.is_empty() {
                request.list = list.to_vec();
            } else {
                request.clear_list = clear;
            }
        }
        None => {
            request.clear_list = clear;
            request.list_shown = clear;
        }
    }
    host.refresh(&request);
}

fn message(host: &mut dyn EditorHost, text: &str) -> Result<()> {
    if !host.is_active() {
        return Err(ZleError::NotInWidget);
    }
    host.show_message(text);
    if !host.in_widget() {
        host.refresh(&RefreshRequest::default());
    }
    Ok(())
}

/// 逆序压回，使读取顺序与原串一致。
fn unget(host: &mut dyn EditorHost, text: &str) -> Result<()> {
    if !host.is_active() {
        return Err(ZleError::NotInWidget);
    }
    for byte in text.bytes().rev() {
        host.unget_byte(byte);
    }
    Ok(())
}

fn select_keymap(host: &mut dyn EditorHost, name: &str) -> Result<()> {
    if !host.is_active() {
        return Err(ZleError::NotInWidget);
    }
    if !host.select_keymap(name) {
        return Err(ZleError::NoSuchKeymap(name.to_owned()));
    }
    Ok(())
}

fn invalidate(host: &mut dyn EditorHost, out: &mut CommandOutput) {
    if !host.is_active() {
        out.status = 1;
        return;
    }
    if !host.is_trashed() {
        host.trash();
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/control.rs"]
mod tests;
