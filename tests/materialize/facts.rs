//! Facts describe each materialization without ever carrying file contents.

use provisioner::types::{ApplyMode, Step};
use provisioner::Overrides;

use crate::helpers::{api, api_with, TestEmitter, TestRoot};

const SECRET: &str = "hunter2-provisioning-token";

#[test]
fn success_emits_attempt_and_result_with_hashes_only() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/token", SECRET.as_bytes(), 0o600);

    let report = api(&em).materialize(&spec, ApplyMode::Commit).unwrap();

    let attempts = em.named("materialize.attempt");
    let results = em.named("materialize.result");
    assert_eq!(attempts.len(), 1);
    assert_eq!(results.len(), 1);
    let (decision, fields) = &results[0];
    assert_ne!(decision, "failure");
    assert_eq!(fields["schema_version"], 1);
    assert_eq!(fields["dry_run"], false);
    assert_eq!(fields["action_id"], report.action_id.as_str());
    assert_eq!(fields["after_hash"], report.after_hash.as_str());
    assert_eq!(fields["hash_alg"], "sha256");
    assert_eq!(attempts[0].1["mode"], "0600");
    assert_eq!(attempts[0].1["bytes"], SECRET.len());

    let all = em.events.lock().unwrap();
    for (_, _, _, f) in all.iter() {
        assert!(!f.to_string().contains(SECRET), "contents leaked into facts");
    }
}

#[test]
fn failure_fact_names_step_and_error_id() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let spec = root.spec("/etc/token", SECRET.as_bytes(), 0o600);

    api_with(&em, Overrides::fail_at(Step::Sync))
        .materialize(&spec, ApplyMode::Commit)
        .unwrap_err();

    let results = em.named("materialize.result");
    let (decision, fields) = &results[0];
    assert_eq!(decision, "failure");
    assert_eq!(fields["step"], "sync");
    assert_eq!(fields["error_id"], "E_RESOURCE");
    assert_eq!(fields["exit_code"], 20);
    assert_eq!(fields["created_dirs"].as_array().unwrap().len(), 1);
}
