use super::*;
use crate::core::error::ErrorKind;
use crate::kernel::services::adapters::HeadlessHost;
use crate::kernel::services::ports::Modifier;
use crate::models::widget::WidgetFlags;

fn noop(_zle: &mut Zle, _host: &mut dyn EditorHost, _args: &[String]) -> i32 {
    0
}

fn zle_with_natives() -> Zle {
    let mut zle = Zle::new();
    zle.registry_mut().add_internal("beep", noop, WidgetFlags::empty()).unwrap();
    zle.registry_mut()
        .add_internal("complete-word", noop, WidgetFlags::COMPLETION)
        .unwrap();
    zle
}

fn listing(zle: &mut Zle, host: &mut HeadlessHost, argv: &[&str]) -> Vec<String> {
    let out = zle.execute(host, argv);
    assert!(out.success(), "{argv:?}: {:?}", out.diagnostics);
    out.stdout
}

#[test]
fn parse_argv_splits_leading_options() {
    let (options, args) = parse_argv(&["-lL", "foo", "-D"]).unwrap();
    assert!(options.is_set('l'));
    assert!(options.is_set('L'));
    assert!(!options.is_set('D'));
    assert_eq!(args, vec!["foo", "-D"]);

    let (options, args) = parse_argv(&["--", "-l"]).unwrap();
    assert_eq!(options, Options::new());
    assert_eq!(args, vec!["-l"]);

    assert_eq!(
        parse_argv(&["-lz"]),
        Err(ZleError::UnknownOption("-z".into()))
    );
}

#[test]
fn arity_is_checked_before_running() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();

    let out = zle.execute(&mut host, &["-A", "beep"]);
    assert_eq!(out.status, 1);
    assert_eq!(out.diagnostics, vec![ZleError::NotEnoughArguments("A".into())]);

    let out = zle.execute(&mut host, &["-M", "a", "b"]);
    assert_eq!(out.diagnostics, vec![ZleError::TooManyArguments("M".into())]);
    assert!(host.messages().is_empty());

    let out = zle.execute(&mut host, &["-I", "x"]);
    assert_eq!(out.diagnostics, vec![ZleError::TooManyArguments("I".into())]);

    let out = zle.execute(&mut host, &["-N"]);
    assert_eq!(out.diagnostics, vec![ZleError::NotEnoughArguments("N".into())]);
}

#[test]
fn conflicting_selectors_are_rejected() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();

    let out = zle.execute(&mut host, &["-l", "-D", "beep"]);
    assert_eq!(out.diagnostics, vec![ZleError::IncompatibleOptions]);
    assert!(zle.registry().resolve("beep").is_some());

    let out = zle.execute(&mut host, &["-AN"]);
    assert_eq!(out.diagnostics, vec![ZleError::IncompatibleOptions]);
}

#[test]
fn new_widget_defaults_function_to_name() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();

    assert!(zle.execute(&mut host, &["-N", "w1"]).success());
    assert!(zle.execute(&mut host, &["-N", "w2", "impl"]).success());

    assert_eq!(
        listing(&mut zle, &mut host, &["-l"]),
        vec!["w1".to_string(), "w2 (impl)".to_string()]
    );
}

#[test]
fn new_widget_cannot_take_protected_name() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();

    let out = zle.execute(&mut host, &["-N", ".beep"]);
    assert_eq!(out.diagnostics, vec![ZleError::Protected(".beep".into())]);
    assert_eq!(zle.registry().widgets().len(), 2);
}

#[test]
fn link_creates_alias() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();

    assert!(zle.execute(&mut host, &["-A", "beep", "my-beep"]).success());
    assert_eq!(zle.registry().resolve("my-beep"), zle.registry().resolve(".beep"));
}

#[test]
fn link_from_unknown_name_changes_nothing() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    let before = zle.registry().thingies().len();

    let out = zle.execute(&mut host, &["-A", "ghost", "x"]);
    assert_eq!(out.diagnostics, vec![ZleError::NoSuchWidget("ghost".into())]);
    assert!(zle.registry().thingies().get("x").is_none());
    assert!(zle.registry().thingies().get("ghost").is_none());
    assert_eq!(zle.registry().thingies().len(), before);
}

#[test]
fn delete_continues_past_failures() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    zle.execute(&mut host, &["-N", "w1"]);
    zle.execute(&mut host, &["-N", "w2"]);

    let out = zle.execute(&mut host, &["-D", "w1", "ghost", ".beep", "w2"]);
    assert_eq!(out.status, 1);
    assert_eq!(
        out.diagnostics,
        vec![
            ZleError::NoSuchWidget("ghost".into()),
            ZleError::Protected(".beep".into()),
        ]
    );
    assert!(zle.registry().resolve("w1").is_none());
    assert!(zle.registry().resolve("w2").is_none());
    assert!(zle.registry().resolve(".beep").is_some());
}

#[test]
fn complete_requires_completion_base() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();

    assert!(zle
        .execute(&mut host, &["-C", "my-comp", "complete-word", "_post"])
        .success());
    let out = zle.execute(&mut host, &["-C", "bad", "beep", "_post"]);
    assert_eq!(out.diagnostics, vec![ZleError::InvalidWidget("beep".into())]);
    assert_eq!(out.diagnostics[0].kind(), ErrorKind::UnsupportedWidget);
    assert!(zle.registry().resolve("bad").is_none());
}

#[test]
fn list_with_names_only_sets_status() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    zle.execute(&mut host, &["-N", "w1"]);

    let out = zle.execute(&mut host, &["-l", "w1"]);
    assert!(out.success());
    assert!(out.stdout.is_empty());

    let out = zle.execute(&mut host, &["-l", "w1", "beep"]);
    assert_eq!(out.status, 1);
    assert!(out.diagnostics.is_empty());

    assert!(zle.execute(&mut host, &["-la", "beep", ".beep"]).success());
    assert_eq!(zle.execute(&mut host, &["-la", "ghost"]).status, 1);
}

#[test]
fn list_modes() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    zle.execute(&mut host, &["-N", "w1", "f"]);
    zle.execute(&mut host, &["-C", "c1", "complete-word", "_post"]);

    assert_eq!(
        listing(&mut zle, &mut host, &["-lL"]),
        vec![
            "zle -C c1 complete-word _post".to_string(),
            "zle -N w1 f".to_string(),
        ]
    );
    let raw = listing(&mut zle, &mut host, &["-la"]);
    assert_eq!(raw.len(), 6);
    assert!(raw.contains(&".beep".to_string()));
    assert!(raw.contains(&"w1".to_string()));
}

#[test]
fn call_runs_widget_and_returns_its_status() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    host.define_function("f", 3);
    zle.execute(&mut host, &["-N", "w", "f"]);

    let out = zle.execute(&mut host, &["w", "-n", "4", "--", "x"]);
    assert_eq!(out.status, 3);
    assert!(out.diagnostics.is_empty());

    let call = &host.calls()[0];
    assert_eq!(call.args, vec!["x".to_string()]);
    assert_eq!(call.modifier, Modifier::with_mult(4));
    assert_eq!(host.modifier(), Modifier::default());
}

#[test]
fn call_errors() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();

    let out = zle.execute(&mut host, &["ghost"]);
    assert_eq!(out.diagnostics, vec![ZleError::NoSuchWidget("ghost".into())]);

    let out = zle.execute(&mut host, &["beep", "-n"]);
    assert_eq!(out.diagnostics, vec![ZleError::NumberExpected('n')]);

    let mut inactive = HeadlessHost::new();
    let out = zle.execute(&mut inactive, &["beep"]);
    assert_eq!(out.diagnostics, vec![ZleError::EditorInactive]);
}

#[test]
fn call_without_name_probes_editor() {
    let mut zle = zle_with_natives();

    let mut host = HeadlessHost::active();
    let empty: [&str; 0] = [];
    assert!(zle.execute(&mut host, &empty).success());

    let mut inactive = HeadlessHost::new();
    let out = zle.execute(&mut inactive, &empty);
    assert_eq!(out.status, 1);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn refresh_builds_request() {
    let mut zle = Zle::new();
    let mut host = HeadlessHost::active();

    zle.execute(&mut host, &["-R", "status", "a", "b"]);
    zle.execute(&mut host, &["-Rc"]);
    zle.execute(&mut host, &["-R", ""]);

    let refreshes = host.refreshes();
    assert_eq!(refreshes[0].status.as_deref(), Some("status"));
    assert_eq!(refreshes[0].list, vec!["a".to_string(), "b".to_string()]);
    assert!(refreshes[1].clear_list);
    assert!(refreshes[1].list_shown);
    assert_eq!(refreshes[1].status, None);
    assert_eq!(refreshes[2], RefreshRequest::default());

    zle.execute(&mut host, &["-Rc", "status"]);
    let last = &host.refreshes()[3];
    assert!(last.clear_list);
    assert!(!last.list_shown);
    assert_eq!(last.status.as_deref(), Some("status"));

    let mut inactive = HeadlessHost::new();
    let out = zle.execute(&mut inactive, &["-R"]);
    assert_eq!(out.status, 1);
    assert!(out.diagnostics.is_empty());
    assert!(inactive.refreshes().is_empty());
}

#[test]
fn message_refreshes_outside_widget() {
    let mut zle = Zle::new();
    let mut host = HeadlessHost::active();

    assert!(zle.execute(&mut host, &["-M", "hello"]).success());
    assert_eq!(host.messages(), ["hello".to_string()]);
    assert_eq!(host.refreshes().len(), 1);

    host.define_function("show", 0);
    host.add_function_command("show", &["-M", "again"]);
    zle.execute(&mut host, &["-N", "show"]);
    assert!(zle.execute(&mut host, &["show"]).success());
    assert_eq!(host.messages().len(), 2);
    assert_eq!(host.refreshes().len(), 1);
    assert!(host.nested_outputs()[0].success());
    assert!(!host.in_widget());

    let mut inactive = HeadlessHost::new();
    let out = zle.execute(&mut inactive, &["-M", "x"]);
    assert_eq!(out.diagnostics, vec![ZleError::NotInWidget]);
}

#[test]
fn unget_preserves_reading_order() {
    let mut zle = Zle::new();
    let mut host = HeadlessHost::active();

    zle.execute(&mut host, &["-U", "abc"]);
    zle.execute(&mut host, &["-U", "xy"]);
    assert_eq!(host.pending_input(), b"xyabc".to_vec());

    let mut inactive = HeadlessHost::new();
    let out = zle.execute(&mut inactive, &["-U", "x"]);
    assert_eq!(out.diagnostics, vec![ZleError::NotInWidget]);
}

#[test]
fn keymap_selection() {
    let mut zle = Zle::new();
    let mut host = HeadlessHost::active();

    assert!(zle.execute(&mut host, &["-K", "vicmd"]).success());
    assert_eq!(host.current_keymap(), "vicmd");

    let out = zle.execute(&mut host, &["-K", "nope"]);
    assert_eq!(out.diagnostics, vec![ZleError::NoSuchKeymap("nope".into())]);
    assert_eq!(host.current_keymap(), "vicmd");

    let mut inactive = HeadlessHost::new();
    let out = zle.execute(&mut inactive, &["-K", "vicmd"]);
    assert_eq!(out.diagnostics, vec![ZleError::NotInWidget]);
}

#[test]
fn invalidate_trashes_display() {
    let mut zle = Zle::new();
    let mut host = HeadlessHost::active();

    assert!(zle.execute(&mut host, &["-I"]).success());
    assert!(host.is_trashed());
    assert!(zle.execute(&mut host, &["-I"]).success());
    assert!(host.is_trashed());

    let mut inactive = HeadlessHost::new();
    let out = zle.execute(&mut inactive, &["-I"]);
    assert_eq!(out.status, 1);
    assert!(out.diagnostics.is_empty());
    assert!(!inactive.is_trashed());
}

#[test]
fn watch_fd_install_replace_and_list() {
    let mut zle = Zle::new();
    let mut host = HeadlessHost::new();

    assert!(zle.execute(&mut host, &["-F", "5", "h1"]).success());
    assert!(zle.execute(&mut host, &["-F", "7", "h3"]).success());
    assert!(zle.execute(&mut host, &["-F", "5", "h2"]).success());

    assert_eq!(
        listing(&mut zle, &mut host, &["-F"]),
        vec!["zle -F 5 h2".to_string(), "zle -F 7 h3".to_string()]
    );
    assert_eq!(
        listing(&mut zle, &mut host, &["-FL", "7"]),
        vec!["zle -F 7 h3".to_string()]
    );
    assert_eq!(zle.execute(&mut host, &["-FL", "9"]).status, 1);
}

#[test]
fn watch_fd_errors() {
    let mut zle = Zle::new();
    let mut host = HeadlessHost::new();
    zle.execute(&mut host, &["-F", "5", "h1"]);

    let out = zle.execute(&mut host, &["-FL", "5", "extra"]);
    assert_eq!(out.diagnostics, vec![ZleError::TooManyArguments("FL".into())]);

    let out = zle.execute(&mut host, &["-F", "abc", "h"]);
    assert_eq!(out.diagnostics, vec![ZleError::BadFd("abc".into())]);
    let out = zle.execute(&mut host, &["-F", "--", "-1", "h"]);
    assert_eq!(out.diagnostics, vec![ZleError::BadFd("-1".into())]);

    assert!(zle.execute(&mut host, &["-F", "5"]).success());
    assert!(zle.watches().is_empty());
    let out = zle.execute(&mut host, &["-F", "5"]);
    assert_eq!(out.diagnostics, vec![ZleError::NoFdHandler(5)]);
}

#[test]
fn parse_fd_accepts_leading_space() {
    assert_eq!(parse_fd(" 12"), Ok(12));
    assert_eq!(parse_fd("0"), Ok(0));
    assert_eq!(parse_fd("12 "), Err(ZleError::BadFd("12 ".into())));
    assert_eq!(parse_fd(""), Err(ZleError::BadFd(String::new())));
}

#[test]
fn teardown_drops_user_state() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    zle.execute(&mut host, &["-N", "w1"]);
    zle.execute(&mut host, &["-F", "3", "h"]);

    zle.teardown();

    assert!(zle.registry().resolve("w1").is_none());
    assert!(zle.registry().resolve("beep").is_some());
    assert!(zle.watches().is_empty());
}

#[test]
fn widget_can_delete_its_own_name_while_running() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    host.define_function("vanish", 4);
    host.add_function_command("vanish", &["-D", "vanish"]);
    host.add_function_command("vanish", &["-l", "vanish"]);
    zle.execute(&mut host, &["-N", "vanish"]);

    let out = zle.execute(&mut host, &["vanish"]);
    assert_eq!(out.status, 4);

    let nested = host.nested_outputs();
    assert!(nested[0].success());
    assert_eq!(nested[1].status, 1);
    assert!(zle.registry().resolve("vanish").is_none());
    assert!(zle.registry().thingies().get("vanish").is_none());
    assert_eq!(zle.registry().widgets().len(), 2);
}

#[test]
fn widget_can_call_other_widgets() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    host.define_function("outer", 0);
    host.add_function_command("outer", &["inner", "-n", "7", "x"]);
    host.define_function("inner", 2);
    zle.execute(&mut host, &["-N", "outer"]);
    zle.execute(&mut host, &["-N", "inner"]);

    assert!(zle.execute(&mut host, &["outer"]).success());

    assert_eq!(host.nested_outputs()[0].status, 2);
    let calls = host.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].name, "inner");
    assert_eq!(calls[1].args, vec!["x".to_string()]);
    assert_eq!(calls[1].modifier, Modifier::with_mult(7));
    assert!(calls[1].in_widget);
    assert_eq!(host.modifier(), Modifier::default());
    assert_eq!(zle.registry().thingies().refcount("inner"), Some(1));
    assert_eq!(zle.registry().thingies().refcount("outer"), Some(1));
}

#[test]
fn widget_can_rebind_itself_while_running() {
    let mut zle = zle_with_natives();
    let mut host = HeadlessHost::active();
    host.define_function("swap", 0);
    host.add_function_command("swap", &["-A", "beep", "swap"]);
    zle.execute(&mut host, &["-N", "swap"]);

    assert!(zle.execute(&mut host, &["swap"]).success());
    assert_eq!(zle.registry().resolve("swap"), zle.registry().resolve(".beep"));
    assert_eq!(zle.registry().thingies().refcount("swap"), Some(1));
    assert_eq!(zle.registry().widgets().len(), 2);
}
