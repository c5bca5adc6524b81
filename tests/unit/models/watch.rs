use super::*;

#[test]
fn insert_appends_new_fds_in_order() {
    let mut table = WatchTable::new();
    assert_eq!(table.insert(5, "h1"), None);
    assert_eq!(table.insert(3, "h2"), None);

    assert_eq!(table.fds().collect::<Vec<_>>(), vec![5, 3]);
    assert_eq!(table.handler(3), Some("h2"));
}

#[test]
fn insert_replaces_existing_fd() {
    let mut table = WatchTable::new();
    table.insert(5, "h1");
    let old = table.insert(5, "h2");

    assert_eq!(old.as_deref(), Some("h1"));
    assert_eq!(table.len(), 1);
    assert_eq!(table.handler(5), Some("h2"));
}

#[test]
fn remove_compacts_remaining_entries() {
    let mut table = WatchTable::new();
    table.insert(1, "a");
    table.insert(2, "b");
    table.insert(3, "c");

    assert_eq!(table.remove(2).as_deref(), Some("b"));
    assert_eq!(table.fds().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(table.remove(2), None);

    table.remove(1);
    table.remove(3);
    assert!(table.is_empty());
}
