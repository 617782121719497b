//! Per-file handler: wraps the atomic write mechanism with facts and error mapping.
use std::time::Instant;

use log::Level;
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::{exit_code_for, id_str, ApiError};
use crate::api::Provisioner;
use crate::constants::FSYNC_WARN_MS;
use crate::fs::{kind_of, preflight, sha256_hex, sha256_hex_of, write_file_atomic, WriteOptions};
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{action_id, ApplyMode, FileSpec, MaterializeReport};

fn elapsed_ms(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn handle<E: FactsEmitter, A: AuditSink>(
    api: &Provisioner<E, A>,
    slog: &StageLogger<'_>,
    run_id: &Uuid,
    spec: &FileSpec,
    mode: ApplyMode,
) -> Result<MaterializeReport, ApiError> {
    let t0 = Instant::now();
    let target = spec.path.as_path();
    let shown = target.display().to_string();
    let aid = action_id(run_id, spec).to_string();
    let dry = mode == ApplyMode::DryRun;

    let current_kind = kind_of(&target);
    let before_hash = if current_kind == "file" {
        sha256_hex_of(&target)
    } else {
        None
    };
    let after_hash = sha256_hex(&spec.contents);

    slog.materialize_attempt()
        .action(aid.clone())
        .path(shown.clone())
        .merge(&json!({
            "current_kind": current_kind,
            "mode": format!("{:04o}", spec.mode),
            "uid": spec.uid,
            "gid": spec.gid,
            "bytes": spec.contents.len(),
        }))
        .emit_success();

    let mut report = MaterializeReport {
        path: target.clone(),
        action_id: aid.clone(),
        bytes: spec.contents.len(),
        mode: spec.mode,
        uid: spec.uid,
        gid: spec.gid,
        before_hash: before_hash.clone(),
        after_hash: after_hash.clone(),
        dry_run: dry,
        ..MaterializeReport::default()
    };

    let outcome = if dry {
        preflight(&target).map(|(_, _, existed)| (Vec::new(), existed, 0))
    } else {
        let opts = WriteOptions {
            fsync_file: api.policy.durability.fsync_file,
            fsync_parent: api.policy.durability.fsync_parent,
            force_exdev: api.overrides.force_exdev.unwrap_or(false),
            fail_at: api.overrides.fail_at,
        };
        write_file_atomic(&target, &spec.contents, spec.mode, spec.uid, spec.gid, &opts)
            .map(|out| (out.created_dirs, out.replaced, out.fsync_ms))
    };

    match outcome {
        Ok((created_dirs, replaced, fsync_ms)) => {
            report.created_dirs = created_dirs;
            report.replaced = replaced;
            report.fsync_ms = fsync_ms;
            report.duration_ms = elapsed_ms(t0);
            let ev = slog
                .materialize_result()
                .action(aid)
                .path(shown.clone())
                .merge(&json!({
                    "created_dirs": report.created_dirs.iter().map(|d| d.display().to_string()).collect::<Vec<_>>(),
                    "replaced": replaced,
                    "before_hash": before_hash,
                    "after_hash": after_hash,
                    "hash_alg": "sha256",
                    "fsync_ms": fsync_ms,
                    "duration_ms": report.duration_ms,
                }));
            if fsync_ms > FSYNC_WARN_MS {
                ev.field("severity", json!("warn")).emit_warn();
            } else {
                ev.emit_success();
            }
            api.audit.log(
                Level::Info,
                &format!("materialize: {} {shown}", if dry { "would write" } else { "wrote" }),
            );
            Ok(report)
        }
        Err(step_err) => {
            let created: Vec<String> = step_err
                .created_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect();
            let err = ApiError::from(step_err);
            let id = err.id();
            slog.materialize_result()
                .action(aid)
                .path(shown.clone())
                .merge(&json!({
                    "step": err.step().map(|s| s.as_str()),
                    "error": err.to_string(),
                    "error_id": id_str(id),
                    "exit_code": exit_code_for(id),
                    "created_dirs": created,
                    "duration_ms": elapsed_ms(t0),
                }))
                .emit_failure();
            api.audit
                .log(Level::Warn, &format!("materialize: failed {shown}: {err}"));
            Err(err)
        }
    }
}
