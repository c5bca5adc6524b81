//! zline：从标准输入逐行读取 `zle ...` 命令，在无终端宿主上执行
//!
//! 额外的行命令：`activate` / `deactivate` 切换编辑器活动状态，
//! `function NAME [STATUS]` 定义解释器函数，
//! `function NAME zle ARGS...` 给函数体追加一条 `zle` 命令。

use std::io::{self, BufRead, Write};
use std::path::Path;

use zline::kernel::services::adapters::{
    apply_settings, ensure_settings_file, load_settings_from, HeadlessHost,
};
use zline::kernel::{BuiltinWidget, CommandOutput, EditorHost, Zle};
use zline::models::WidgetFlags;

mod logging;

fn accept_line(_zle: &mut Zle, host: &mut dyn EditorHost, _args: &[String]) -> i32 {
    host.refresh(&Default::default());
    0
}

fn beep(_zle: &mut Zle, host: &mut dyn EditorHost, _args: &[String]) -> i32 {
    host.show_message("\x07");
    0
}

fn complete_word(zle: &mut Zle, host: &mut dyn EditorHost, args: &[String]) -> i32 {
    if host.in_completion() {
        return 0;
    }
    host.call_function(zle, "_main_complete", args)
}

fn redisplay(_zle: &mut Zle, host: &mut dyn EditorHost, _args: &[String]) -> i32 {
    host.refresh(&Default::default());
    0
}

const BUILTINS: &[BuiltinWidget] = &[
    BuiltinWidget {
        name: "accept-line",
        function: accept_line,
        flags: WidgetFlags::empty(),
    },
    BuiltinWidget {
        name: "beep",
        function: beep,
        flags: WidgetFlags::NOT_COMMAND,
    },
    BuiltinWidget {
        name: "complete-word",
        function: complete_word,
        flags: WidgetFlags::COMPLETION.union(WidgetFlags::MENU_COMPLETE),
    },
    BuiltinWidget {
        name: "expand-or-complete",
        function: complete_word,
        flags: WidgetFlags::COMPLETION,
    },
    BuiltinWidget {
        name: "redisplay",
        function: redisplay,
        flags: WidgetFlags::NOT_COMMAND,
    },
];

fn report(stdout: &mut impl Write, out: &CommandOutput) -> io::Result<()> {
    for line in &out.stdout {
        writeln!(stdout, "{line}")?;
    }
    for err in &out.diagnostics {
        eprintln!("zle: {err}");
    }
    if !out.success() {
        writeln!(stdout, "status {}", out.status)?;
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let _logging = logging::init();

    let mut zle = Zle::with_builtins(BUILTINS);
    let mut host = HeadlessHost::new();

    let settings_path = match std::env::args().nth(1) {
        Some(path) => Some(Path::new(&path).to_path_buf()),
        None => match ensure_settings_file() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!(error = %e, "ensure_settings_file failed");
                None
            }
        },
    };
    if let Some(path) = settings_path {
        match load_settings_from(&path) {
            Ok(settings) => {
                for err in apply_settings(&mut zle, &settings) {
                    eprintln!("zle: {err}");
                }
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "load settings failed"),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["activate"] => host.set_active(true),
            ["deactivate"] => host.set_active(false),
            ["function", name, "zle", argv @ ..] => host.add_function_command(name, argv),
            ["function", name] => host.define_function(name, 0),
            ["function", name, status] => match status.parse() {
                Ok(status) => host.define_function(name, status),
                Err(_) => eprintln!("function: bad status `{status}'"),
            },
            ["zle", argv @ ..] => {
                let out = zle.execute(&mut host, argv);
                for nested in host.take_nested_outputs() {
                    report(&mut stdout, &nested)?;
                }
                report(&mut stdout, &out)?;
            }
            [other, ..] => eprintln!("{other}: command not found"),
        }
        stdout.flush()?;
    }

    zle.teardown();
    Ok(())
}
