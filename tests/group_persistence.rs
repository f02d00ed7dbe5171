//! groups.json layout, reload, and failure handling.

mod common;

use hostswitch::config::DataPaths;
use hostswitch::store::GroupRepository;
use std::fs;

#[test]
fn missing_store_starts_empty() {
    let dir = common::temp_home();
    let paths = DataPaths::for_test(dir.path());
    let repo = GroupRepository::open(&paths).unwrap();
    assert!(repo.list().is_empty());
}

#[test]
fn malformed_store_is_parse_error() {
    let dir = common::temp_home();
    let paths = DataPaths::for_test(dir.path());
    fs::write(&paths.groups_file, "[{not json").unwrap();

    let err = GroupRepository::open(&paths).unwrap_err();
    assert!(err.is_parse());
    assert!(err.to_string().contains("groups.json"));
}

#[test]
fn unreadable_store_is_persistence_error() {
    let dir = common::temp_home();
    let paths = DataPaths::for_test(dir.path());
    fs::write(&paths.groups_file, b"[\xff]").unwrap();

    let err = GroupRepository::open(&paths).unwrap_err();
    assert!(err.is_persistence());
    assert!(!err.is_io());
    assert!(err.to_string().contains("groups.json"));
}

#[test]
fn store_uses_camel_case_fields() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");
    let g = service
        .create_group("remote", "1.2.3.4 x", true, Some("https://example.test/h"))
        .unwrap();
    service
        .set_group_tags(&g.id, &["lab".to_string()])
        .unwrap();

    let raw = fs::read_to_string(dir.path().join("data").join("groups.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let obj = &json[0];
    assert_eq!(obj["id"], g.id.as_str());
    assert_eq!(obj["isActive"], false);
    assert_eq!(obj["isRemote"], true);
    assert_eq!(obj["remoteURL"], "https://example.test/h");
    assert_eq!(obj["tags"][0], "lab");
    assert!(obj["createdAt"].is_string());
    assert!(obj["lastUpdated"].is_string());
    assert!(obj.get("parent").is_none());
}

#[test]
fn loads_legacy_remote_url_key() {
    let dir = common::temp_home();
    let paths = DataPaths::for_test(dir.path());
    let raw = r#"[{
        "id": "g1",
        "title": "legacy",
        "content": "1.2.3.4 x",
        "isActive": true,
        "isRemote": true,
        "remoteUrl": "https://example.test/legacy",
        "createdAt": "2024-01-01T00:00:00Z",
        "lastUpdated": "2024-01-02T00:00:00Z"
    }]"#;
    fs::write(&paths.groups_file, raw).unwrap();

    let repo = GroupRepository::open(&paths).unwrap();
    let g = repo.get("g1").unwrap();
    assert_eq!(g.remote_url.as_deref(), Some("https://example.test/legacy"));
    assert!(g.tags.is_empty());
    assert_eq!(repo.active().count(), 1);
}

#[test]
fn failed_write_keeps_memory_and_disk() {
    let dir = common::temp_home();
    let service = common::service_in(dir.path(), "");
    let g = service.create_group("a", "1.1.1.1 a", false, None).unwrap();
    let groups_file = dir.path().join("data").join("groups.json");
    let on_disk = fs::read_to_string(&groups_file).unwrap();

    // A directory where the file should go makes the rename fail.
    fs::remove_file(&groups_file).unwrap();
    fs::create_dir(&groups_file).unwrap();
    fs::write(groups_file.join("block"), "").unwrap();

    let err = service.toggle_group(&g.id).unwrap_err();
    assert!(err.is_persistence());
    assert!(!service.get_group(&g.id).unwrap().is_active);

    let err = service.create_group("b", "", false, None).unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(service.list_groups().len(), 1);

    fs::remove_dir_all(&groups_file).unwrap();
    fs::write(&groups_file, on_disk).unwrap();
    service.toggle_group(&g.id).unwrap();
    assert!(service.get_group(&g.id).unwrap().is_active);
}
