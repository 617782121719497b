//! Batch stage: materializes files in order and emits a summary fact.
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::api::errors::{exit_code_for_report, id_str};
use crate::api::{materialize, Provisioner};
use crate::logging::audit::{AuditCtx, AuditMode};
use crate::logging::{ts_for_mode, AuditSink, FactsEmitter, StageLogger};
use crate::types::{run_id, ApplyMode, ApplyReport, FileSpec};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Provisioner<E, A>,
    specs: &[FileSpec],
    mode: ApplyMode,
) -> ApplyReport {
    let t0 = Instant::now();
    let dry = mode == ApplyMode::DryRun;
    let rid = run_id(specs);
    let tctx = AuditCtx::new(
        &api.facts,
        rid.to_string(),
        ts_for_mode(mode),
        AuditMode {
            dry_run: dry,
            redact: dry,
        },
    );
    let slog = StageLogger::new(&tctx);
    api.audit.log(
        Level::Info,
        &format!("apply: starting, {} file(s)", specs.len()),
    );

    let mut report = ApplyReport {
        run_id: rid.to_string(),
        ..ApplyReport::default()
    };
    for spec in specs {
        match materialize::handle(api, &slog, &rid, spec, mode) {
            Ok(r) => report.written.push(r),
            Err(e) => {
                report.errors.push(e.to_string());
                let id = id_str(e.id());
                if !report.error_ids.contains(&id) {
                    report.error_ids.push(id);
                }
                if !api.policy.apply.continue_on_error {
                    break;
                }
            }
        }
    }
    report.duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);

    let ev = slog.apply_summary().merge(&json!({
        "total": specs.len(),
        "written": report.written.len(),
        "failed": report.errors.len(),
        "error_ids": report.error_ids,
        "exit_code": exit_code_for_report(&report),
        "duration_ms": report.duration_ms,
    }));
    if report.is_success() {
        ev.emit_success();
    } else {
        ev.emit_failure();
    }
    api.audit.log(Level::Info, "apply: finished");
    report
}
