use super::*;
use crate::kernel::control::Zle;
use crate::kernel::services::adapters::HeadlessHost;

fn noop(_zle: &mut Zle, _host: &mut dyn EditorHost, _args: &[String]) -> i32 {
    0
}

#[test]
fn user_widget_carries_function_name() {
    let widget = Widget::user("my-func");
    match widget.kind() {
        WidgetKind::User { function } => assert_eq!(function.as_str(), "my-func"),
        other => panic!("unexpected kind {other:?}"),
    }
    assert!(widget.flags().is_empty());
    assert_eq!(widget.first(), None);
}

#[test]
fn completion_widget_sets_menu_flags() {
    let widget = Widget::completion(noop, "complete-word", "_post");
    assert!(widget.kind().is_completion());
    assert!(widget.flags().contains(WidgetFlags::MENU_COMPLETE));
    assert!(widget.flags().contains(WidgetFlags::KEEP_SUFFIX));
    assert!(!widget.flags().contains(WidgetFlags::COMPLETION));
}

#[test]
fn internal_widget_runs_native_function() {
    let widget = Widget::internal(noop, WidgetFlags::COMPLETION);
    let mut host = HeadlessHost::new();
    match widget.kind() {
        WidgetKind::Internal(f) => assert_eq!(f(&mut Zle::new(), &mut host, &[]), 0),
        other => panic!("unexpected kind {other:?}"),
    }
    assert!(widget.kind().is_internal());
}

#[test]
fn removed_widget_is_unreachable() {
    let mut store = WidgetStore::new();
    let id = store.insert(Widget::user("f"));
    assert!(store.contains(id));

    let removed = store.remove(id).unwrap();
    assert!(matches!(removed.kind(), WidgetKind::User { .. }));
    assert!(store.get(id).is_none());
    assert!(store.is_empty());

    let other = store.insert(Widget::user("g"));
    assert_ne!(id, other);
    assert!(store.get(id).is_none());
}
