use std::path::PathBuf;

/// Outcome of one materialization.
#[derive(Clone, Debug, Default)]
pub struct MaterializeReport {
    pub path: PathBuf,
    pub action_id: String,
    pub bytes: usize,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Directories created for the parent chain, outermost first.
    pub created_dirs: Vec<PathBuf>,
    /// SHA-256 of the content replaced, when the target existed as a regular file.
    pub before_hash: Option<String>,
    pub after_hash: String,
    pub replaced: bool,
    pub fsync_ms: u64,
    pub duration_ms: u64,
    pub dry_run: bool,
}

/// Outcome of a batch of materializations.
#[derive(Clone, Debug, Default)]
pub struct ApplyReport {
    pub run_id: String,
    pub written: Vec<MaterializeReport>,
    pub errors: Vec<String>,
    pub error_ids: Vec<&'static str>,
    pub duration_ms: u64,
}

impl ApplyReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
