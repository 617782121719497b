//! Readers never observe a partial file.

use std::sync::atomic::{AtomicBool, Ordering};

use provisioner::types::ApplyMode;

use crate::helpers::{api, entries, TestEmitter, TestRoot};

#[test]
fn concurrent_reader_sees_only_whole_versions() {
    let root = TestRoot::new();
    let em = TestEmitter::default();
    let api = api(&em);
    let old = vec![b'a'; 64 * 1024];
    let new = vec![b'b'; 96 * 1024];
    let spec_old = root.spec("/etc/big.conf", &old, 0o644);
    let spec_new = root.spec("/etc/big.conf", &new, 0o644);
    api.materialize(&spec_old, ApplyMode::Commit).unwrap();

    let target = root.host("/etc/big.conf");
    let done = AtomicBool::new(false);
    std::thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                let got = std::fs::read(&target).unwrap();
                assert!(got == old || got == new, "torn read of {} bytes", got.len());
            }
        });
        for i in 0..50 {
            let spec = if i % 2 == 0 { &spec_new } else { &spec_old };
            api.materialize(spec, ApplyMode::Commit).unwrap();
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(entries(&root.host("/etc")), vec!["big.conf"]);
}
