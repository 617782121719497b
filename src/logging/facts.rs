use log::Level;
use serde_json::Value;

/// Receiver of structured facts (one JSON object per event).
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Receiver of human-readable audit lines.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Sink that forwards both facts and audit lines to the `log` facade.
///
/// Facts are rendered as single-line JSON under the `provisioner::facts` target,
/// so a JSON-lines stream can be obtained by routing that target to a file.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let level = match decision {
            "failure" => Level::Warn,
            _ => Level::Info,
        };
        log::log!(target: "provisioner::facts", level, "{subsystem} {event} {fields}");
    }
}

impl AuditSink for JsonlSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "provisioner::audit", level, "{msg}");
    }
}
