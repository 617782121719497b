//! Dry runs validate without touching the filesystem.

use provisioner::types::{ApplyMode, Step};

use crate::helpers::{api, entries, TestEmitter, TestRoot};

#[test]
fn dry_run_creates_nothing() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/ssh/sshd_config.d/10-provision.conf", b"PasswordAuthentication no\n", 0o600);

    let report = api(&em).materialize(&spec, ApplyMode::DryRun).unwrap();

    assert!(report.dry_run);
    assert!(report.created_dirs.is_empty());
    assert!(entries(root.path()).is_empty());
}

#[test]
fn dry_run_leaves_existing_content_alone() {
    let root = TestRoot::new();
    std::fs::create_dir(root.host("/etc")).unwrap();
    std::fs::write(root.host("/etc/hostname"), b"old\n").unwrap();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/hostname", b"new\n", 0o644);

    let report = api(&em).materialize(&spec, ApplyMode::DryRun).unwrap();

    assert!(report.replaced);
    assert_eq!(std::fs::read(root.host("/etc/hostname")).unwrap(), b"old\n");
}

#[test]
fn dry_run_still_rejects_a_directory_target() {
    let root = TestRoot::new();
    std::fs::create_dir_all(root.host("/etc/hostname")).unwrap();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/hostname", b"x", 0o644);

    let err = api(&em).materialize(&spec, ApplyMode::DryRun).unwrap_err();
    assert_eq!(err.step(), Some(Step::Preflight));
}

#[test]
fn dry_run_facts_are_redacted() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/hostname", b"node\n", 0o644);
    api(&em).materialize(&spec, ApplyMode::DryRun).unwrap();

    let results = em.named("materialize.result");
    assert_eq!(results.len(), 1);
    let (_, fields) = &results[0];
    assert_eq!(fields["ts"], "1970-01-01T00:00:00Z");
    assert_eq!(fields["dry_run"], true);
    assert!(fields.get("duration_ms").is_none());
    assert!(fields.get("after_hash").is_none());
}
