// Facade for API module; delegates to submodules under src/api/

use std::path::Path;
use std::slice;

use crate::distro::SystemPaths;
use crate::logging::audit::{AuditCtx, AuditMode};
use crate::logging::{ts_for_mode, AuditSink, FactsEmitter, StageLogger};
use crate::policy::Policy;
use crate::types::{run_id, ApplyMode, ApplyReport, FileEntry, FileSpec, MaterializeReport};

mod apply;
mod builder;
pub mod errors;
mod materialize;
mod overrides;

pub use builder::ApiBuilder;
pub use errors::ApiError;
pub use overrides::Overrides;

pub struct Provisioner<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    paths: SystemPaths,
    overrides: Overrides,
}

impl<E: FactsEmitter, A: AuditSink> Provisioner<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            paths: SystemPaths::default(),
            overrides: Overrides::default(),
        }
    }

    /// Inject the path/tool registry shared with sibling subsystems.
    #[must_use]
    pub fn with_system_paths(mut self, paths: SystemPaths) -> Self {
        self.paths = paths;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// The registry this instance was built with. Materialization never consults it.
    pub fn system_paths(&self) -> &SystemPaths {
        &self.paths
    }

    /// Materialize one file.
    ///
    /// In `Commit` mode the target ends up with exactly the requested contents, mode
    /// and ownership, or keeps its previous state and an error naming the failing
    /// step is returned. Parent directories created along the way are kept.
    /// `DryRun` only validates the target.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    pub fn materialize(
        &self,
        spec: &FileSpec,
        mode: ApplyMode,
    ) -> Result<MaterializeReport, ApiError> {
        let rid = run_id(slice::from_ref(spec));
        let dry = mode == ApplyMode::DryRun;
        let tctx = AuditCtx::new(
            &self.facts,
            rid.to_string(),
            ts_for_mode(mode),
            AuditMode {
                dry_run: dry,
                redact: dry,
            },
        );
        materialize::handle(self, &StageLogger::new(&tctx), &rid, spec, mode)
    }

    /// Resolve a configured file description under `root` and materialize it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidPath`] when the configured path cannot be
    /// re-rooted under `root`, otherwise as [`Provisioner::materialize`].
    pub fn materialize_entry(
        &self,
        root: &Path,
        entry: &FileEntry,
        mode: ApplyMode,
    ) -> Result<MaterializeReport, ApiError> {
        let spec = FileSpec::render(root, entry).map_err(|e| {
            self.audit.log(
                log::Level::Warn,
                &format!("materialize: rejected {}: {e}", entry.path),
            );
            ApiError::from(e)
        })?;
        self.materialize(&spec, mode)
    }

    /// Materialize `specs` in order. Stops at the first failure unless
    /// `policy.apply.continue_on_error` is set.
    pub fn apply(&self, specs: &[FileSpec], mode: ApplyMode) -> ApplyReport {
        apply::run(self, specs, mode)
    }
}
