//! Create, update, toggle and delete groups through the service.

mod common;

#[test]
fn create_assigns_id_and_timestamps() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");

    let g = service
        .create_group("dev", "127.0.0.1 api.dev", false, None)
        .unwrap();

    assert!(!g.id.is_empty());
    assert!(!g.is_active);
    assert_eq!(g.created_at, g.last_updated);
    assert!(g.tags.is_empty());
    assert!(g.parent.is_none());
    assert_eq!(service.list_groups(), vec![g]);
}

#[test]
fn ids_are_unique() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");

    let a = service.create_group("same", "", false, None).unwrap();
    let b = service.create_group("same", "", false, None).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn remote_group_keeps_url() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");

    let g = service
        .create_group("ads", "", true, Some("https://example.test/hosts"))
        .unwrap();
    assert!(g.is_remote);
    assert_eq!(g.remote_url.as_deref(), Some("https://example.test/hosts"));
}

#[test]
fn update_replaces_fields_and_bumps_timestamp() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");
    let g = service.create_group("old", "1.1.1.1 a", false, None).unwrap();

    service
        .update_group(&g.id, "new", "2.2.2.2 b", true)
        .unwrap();

    let updated = service.get_group(&g.id).unwrap();
    assert_eq!(updated.title, "new");
    assert_eq!(updated.content, "2.2.2.2 b");
    assert!(updated.is_active);
    assert_eq!(updated.created_at, g.created_at);
    assert!(updated.last_updated >= updated.created_at);
}

#[test]
fn toggle_flips_activation() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");
    let g = service.create_group("t", "", false, None).unwrap();

    service.toggle_group(&g.id).unwrap();
    assert!(service.get_group(&g.id).unwrap().is_active);
    service.toggle_group(&g.id).unwrap();
    assert!(!service.get_group(&g.id).unwrap().is_active);
}

#[test]
fn unknown_id_is_not_found_and_changes_nothing() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");
    service.create_group("keep", "x", false, None).unwrap();
    let before = service.list_groups();

    assert!(service.update_group("missing", "t", "c", true).unwrap_err().is_not_found());
    assert!(service.toggle_group("missing").unwrap_err().is_not_found());
    assert!(service.delete_group("missing").unwrap_err().is_not_found());
    assert!(service.get_group("missing").unwrap_err().is_not_found());

    let err = service.toggle_group("missing").unwrap_err();
    assert!(err.to_string().contains("missing"));
    assert_eq!(service.list_groups(), before);
}

#[test]
fn delete_leaves_orphaned_children() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");
    let parent = service.create_group("parent", "", false, None).unwrap();
    let child = service.create_group("child", "", false, None).unwrap();
    service.set_group_parent(&child.id, Some(&parent.id)).unwrap();

    service.delete_group(&parent.id).unwrap();

    let groups = service.list_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].parent.as_deref(), Some(parent.id.as_str()));
}

#[test]
fn tags_are_a_set() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");
    let g = service.create_group("t", "", false, None).unwrap();

    let tags = vec!["work".to_string(), "dev".to_string(), "work".to_string(), " ".to_string()];
    service.set_group_tags(&g.id, &tags).unwrap();

    let tags: Vec<String> = service.get_group(&g.id).unwrap().tags.into_iter().collect();
    assert_eq!(tags, vec!["dev".to_string(), "work".to_string()]);
}

#[test]
fn delete_does_not_touch_hosts_file() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "127.0.0.1 localhost\n");
    let g = service.create_group("a", "1.2.3.4 foo", false, None).unwrap();
    service.toggle_group(&g.id).unwrap();
    service.update_system_hosts().unwrap();
    let applied = common::read_hosts(dir.path());

    service.delete_group(&g.id).unwrap();
    assert_eq!(common::read_hosts(dir.path()), applied);

    service.update_system_hosts().unwrap();
    assert!(!common::read_hosts(dir.path()).contains("1.2.3.4 foo"));
}
