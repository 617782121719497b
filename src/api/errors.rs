use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::fs::StepError;
use crate::types::{ApplyReport, Step};

/// Errors surfaced by the provisioner API, one variant per failure class.
///
/// Every materialization error names the failing step and the target path.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Parent directories could not be created, or the target is unusable.
    #[error("structural error at {step} for {}: {source}", path.display())]
    Structural {
        step: Step,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Disk, inode or quota limits hit while staging.
    #[error("resource exhausted at {step} for {}: {source}", path.display())]
    ResourceExhausted {
        step: Step,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The process may not create, write, chown or chmod as requested.
    #[error("permission denied at {step} for {}: {source}", path.display())]
    PermissionDenied {
        step: Step,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The atomic rename onto the target failed.
    #[error("publish failed for {}: {source}", path.display())]
    Publish {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl ApiError {
    /// Stable identifier of this error.
    #[must_use]
    pub fn id(&self) -> ErrorId {
        match self {
            ApiError::Structural { .. } => ErrorId::E_STRUCTURAL,
            ApiError::ResourceExhausted { .. } => ErrorId::E_RESOURCE,
            ApiError::PermissionDenied { .. } => ErrorId::E_PERMISSION,
            ApiError::Publish { source, .. } if source.raw_os_error() == Some(libc::EXDEV) => {
                ErrorId::E_EXDEV
            }
            ApiError::Publish { .. } => ErrorId::E_PUBLISH,
            ApiError::InvalidPath(_) => ErrorId::E_POLICY,
        }
    }

    /// The step that failed, when the error came from a materialization.
    #[must_use]
    pub fn step(&self) -> Option<Step> {
        match self {
            ApiError::Structural { step, .. }
            | ApiError::ResourceExhausted { step, .. }
            | ApiError::PermissionDenied { step, .. } => Some(*step),
            ApiError::Publish { .. } => Some(Step::Rename),
            ApiError::InvalidPath(_) => None,
        }
    }
}

impl From<StepError> for ApiError {
    fn from(e: StepError) -> Self {
        let StepError {
            step, path, source, ..
        } = e;
        match classify(step, &source) {
            ErrorId::E_RESOURCE => ApiError::ResourceExhausted { step, path, source },
            ErrorId::E_PERMISSION => ApiError::PermissionDenied { step, path, source },
            ErrorId::E_PUBLISH | ErrorId::E_EXDEV => ApiError::Publish { path, source },
            _ => ApiError::Structural { step, path, source },
        }
    }
}

impl From<crate::types::errors::Error> for ApiError {
    fn from(e: crate::types::errors::Error) -> Self {
        ApiError::InvalidPath(e.msg)
    }
}

/// Classify an IO error raised during `step`.
///
/// The errno decides when it is specific (space, permissions, cross-device);
/// otherwise the step does: parents and preflight are structural, staging and
/// writing are resource problems, ownership and mode are permission problems,
/// and the rename is a publish problem.
#[must_use]
pub fn classify(step: Step, e: &io::Error) -> ErrorId {
    match e.raw_os_error() {
        Some(libc::EXDEV) if step == Step::Rename => return ErrorId::E_EXDEV,
        Some(libc::ENOSPC | libc::EDQUOT | libc::EFBIG | libc::ENFILE | libc::EMFILE) => {
            return ErrorId::E_RESOURCE
        }
        Some(libc::EACCES | libc::EPERM | libc::EROFS) => return ErrorId::E_PERMISSION,
        Some(libc::ENAMETOOLONG | libc::ENOTDIR | libc::EISDIR) => return ErrorId::E_STRUCTURAL,
        _ => {}
    }
    match step {
        Step::Preflight | Step::CreateParents => ErrorId::E_STRUCTURAL,
        Step::CreateStaging | Step::Write | Step::Sync => ErrorId::E_RESOURCE,
        Step::Chown | Step::Chmod => ErrorId::E_PERMISSION,
        Step::Rename => ErrorId::E_PUBLISH,
    }
}

// We intentionally keep SCREAMING_SNAKE_CASE to match emitted IDs.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_STRUCTURAL,
    E_RESOURCE,
    E_PERMISSION,
    E_PUBLISH,
    E_EXDEV,
    E_POLICY,
    E_GENERIC,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_STRUCTURAL => "E_STRUCTURAL",
        ErrorId::E_RESOURCE => "E_RESOURCE",
        ErrorId::E_PERMISSION => "E_PERMISSION",
        ErrorId::E_PUBLISH => "E_PUBLISH",
        ErrorId::E_EXDEV => "E_EXDEV",
        ErrorId::E_POLICY => "E_POLICY",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_STRUCTURAL => 10,
        ErrorId::E_RESOURCE => 20,
        ErrorId::E_PERMISSION => 30,
        ErrorId::E_PUBLISH => 40,
        ErrorId::E_EXDEV => 50,
        ErrorId::E_POLICY => 60,
        ErrorId::E_GENERIC => 1,
    }
}

#[must_use]
pub fn exit_code_for_id_str(s: &str) -> Option<i32> {
    [
        ErrorId::E_STRUCTURAL,
        ErrorId::E_RESOURCE,
        ErrorId::E_PERMISSION,
        ErrorId::E_PUBLISH,
        ErrorId::E_EXDEV,
        ErrorId::E_POLICY,
        ErrorId::E_GENERIC,
    ]
    .into_iter()
    .find(|id| id_str(*id) == s)
    .map(exit_code_for)
}

/// Process exit code for a batch: 0 on success, otherwise the code of the first
/// error id recorded.
#[must_use]
pub fn exit_code_for_report(report: &ApplyReport) -> i32 {
    match report.error_ids.first() {
        None => 0,
        Some(id) => exit_code_for_id_str(id).unwrap_or(exit_code_for(ErrorId::E_GENERIC)),
    }
}
