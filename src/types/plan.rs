use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApplyMode {
    #[default]
    DryRun,
    Commit,
}

/// The ordered steps of materializing one file. Errors and injected failures name one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Validate the target before anything is created.
    Preflight,
    CreateParents,
    CreateStaging,
    Write,
    Chown,
    Chmod,
    Sync,
    /// Publish point.
    Rename,
}

impl Step {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Step::Preflight => "preflight",
            Step::CreateParents => "create_parents",
            Step::CreateStaging => "create_staging",
            Step::Write => "write",
            Step::Chown => "chown",
            Step::Chmod => "chmod",
            Step::Sync => "sync",
            Step::Rename => "rename",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
