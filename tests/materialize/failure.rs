//! Failures leave the target in its pre-call state and no staging file behind.

use provisioner::errors::ErrorId;
use provisioner::types::{ApplyMode, Step};
use provisioner::{ApiError, Overrides};

use crate::helpers::{api, api_with, entries, TestEmitter, TestRoot};

#[test]
fn denied_ownership_change_keeps_absent_target_absent() {
    let root = TestRoot::new();
    std::fs::create_dir(root.host("/etc")).unwrap();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/example.conf", b"key=value\n", 0o600);

    let err = api_with(&em, Overrides::fail_at(Step::Chown))
        .materialize(&spec, ApplyMode::Commit)
        .unwrap_err();

    assert!(matches!(err, ApiError::PermissionDenied { step: Step::Chown, .. }));
    assert_eq!(err.id(), ErrorId::E_PERMISSION);
    assert!(!root.host("/etc/example.conf").exists());
    assert!(entries(&root.host("/etc")).is_empty());
}

#[test]
fn denied_mode_change_keeps_previous_content() {
    let root = TestRoot::new();
    std::fs::create_dir(root.host("/etc")).unwrap();
    std::fs::write(root.host("/etc/example.conf"), b"previous\n").unwrap();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/example.conf", b"key=value\n", 0o600);

    let err = api_with(&em, Overrides::fail_at(Step::Chmod))
        .materialize(&spec, ApplyMode::Commit)
        .unwrap_err();

    assert_eq!(err.step(), Some(Step::Chmod));
    assert_eq!(std::fs::read(root.host("/etc/example.conf")).unwrap(), b"previous\n");
    assert_eq!(entries(&root.host("/etc")), vec!["example.conf"]);
}

#[test]
fn write_failure_is_a_resource_error() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/big", b"payload", 0o644);

    let err = api_with(&em, Overrides::fail_at(Step::Write))
        .materialize(&spec, ApplyMode::Commit)
        .unwrap_err();

    assert_eq!(err.id(), ErrorId::E_RESOURCE);
    assert!(entries(&root.host("/etc")).is_empty());
}

#[test]
fn cross_device_rename_is_a_publish_error() {
    let root = TestRoot::new();
    std::fs::create_dir(root.host("/etc")).unwrap();
    std::fs::write(root.host("/etc/fstab"), b"old").unwrap();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/fstab", b"new", 0o644);

    let err = api_with(&em, Overrides::exdev(true))
        .materialize(&spec, ApplyMode::Commit)
        .unwrap_err();

    assert!(matches!(err, ApiError::Publish { .. }));
    assert_eq!(err.id(), ErrorId::E_EXDEV);
    assert_eq!(std::fs::read(root.host("/etc/fstab")).unwrap(), b"old");
    assert_eq!(entries(&root.host("/etc")), vec!["fstab"]);
}

#[test]
fn directory_target_is_rejected_before_anything_is_created() {
    let root = TestRoot::new();
    std::fs::create_dir_all(root.host("/etc/conf.d")).unwrap();
    std::fs::write(root.host("/etc/conf.d/keep"), b"x").unwrap();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/conf.d", b"x", 0o644);

    let err = api(&em).materialize(&spec, ApplyMode::Commit).unwrap_err();

    assert_eq!(err.step(), Some(Step::Preflight));
    assert_eq!(err.id(), ErrorId::E_STRUCTURAL);
    assert_eq!(entries(&root.host("/etc")), vec!["conf.d"]);
    assert_eq!(entries(&root.host("/etc/conf.d")), vec!["keep"]);
}

#[test]
fn root_itself_is_not_a_file_target() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root.spec("/", b"x", 0o644);
    let err = api(&em).materialize(&spec, ApplyMode::Commit).unwrap_err();
    assert_eq!(err.step(), Some(Step::Preflight));
}

#[test]
fn unprivileged_give_away_is_refused() {
    let (uid, _) = crate::helpers::me();
    if uid == 0 {
        // root may assign any numeric owner
        return;
    }
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root
        .spec("/etc/shadow", b"secret", 0o600)
        .with_owner(0, 0);

    let err = api(&em).materialize(&spec, ApplyMode::Commit).unwrap_err();

    assert_eq!(err.id(), ErrorId::E_PERMISSION);
    assert_eq!(err.step(), Some(Step::Chown));
    assert!(entries(&root.host("/etc")).is_empty());
}

#[test]
fn file_name_over_the_length_limit_is_structural() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root.spec(&format!("/{}", "a".repeat(256)), b"x", 0o644);

    let err = api(&em).materialize(&spec, ApplyMode::Commit).unwrap_err();

    assert_eq!(err.step(), Some(Step::Preflight));
    assert_eq!(err.id(), ErrorId::E_STRUCTURAL);
    assert!(entries(root.path()).is_empty());
}

#[test]
fn escaping_entry_is_rejected_before_touching_disk() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let entry = provisioner::types::FileEntry {
        path: "/etc/../../outside".into(),
        contents: "x".into(),
        ..Default::default()
    };

    let err = api(&em)
        .materialize_entry(root.path(), &entry, ApplyMode::Commit)
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidPath(_)));
    assert_eq!(err.id(), ErrorId::E_POLICY);
    assert_eq!(err.step(), None);
    assert!(entries(root.path()).is_empty());
    assert!(em.named("materialize.attempt").is_empty());
}
