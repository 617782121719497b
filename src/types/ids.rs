//! Deterministic UUIDv5 identifiers for runs and actions.
//!
//! The namespace is derived from `NS_TAG`, and inputs use only the root-relative
//! path, so the same set of files yields the same ids under any destination root.
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::file::FileSpec;
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Serialize a spec into a stable string; contents enter only as a digest.
fn serialize_spec(spec: &FileSpec) -> String {
    let digest = hex::encode(Sha256::digest(&spec.contents));
    format!(
        "F:{}:{:o}:{}:{}:{digest}",
        spec.path.rel().to_string_lossy(),
        spec.mode,
        spec.uid,
        spec.gid
    )
}

/// Deterministic id for a batch of specs, in order.
#[must_use]
pub fn run_id(specs: &[FileSpec]) -> Uuid {
    let mut s = String::new();
    for spec in specs {
        s.push_str(&serialize_spec(spec));
        s.push('\n');
    }
    Uuid::new_v5(&namespace(), s.as_bytes())
}

/// Deterministic id for one spec within a run.
#[must_use]
pub fn action_id(run_id: &Uuid, spec: &FileSpec) -> Uuid {
    Uuid::new_v5(run_id, serialize_spec(spec).as_bytes())
}
