//! Per-instance simulation overrides used for test-only or controlled scenarios.
use crate::types::Step;

/// Overrides for simulation in tests and controlled environments.
#[derive(Clone, Debug, Default, Copy)]
pub struct Overrides {
    /// Fail the rename with `EXDEV`, as if the staging file were on another filesystem.
    pub force_exdev: Option<bool>,
    /// Fail deliberately just before this step of every materialization.
    pub fail_at: Option<Step>,
}

impl Overrides {
    #[must_use]
    /// Construct an overrides struct with `force_exdev` set.
    pub fn exdev(v: bool) -> Self {
        Self {
            force_exdev: Some(v),
            ..Default::default()
        }
    }
    #[must_use]
    /// Construct an overrides struct with `fail_at` set.
    pub fn fail_at(step: Step) -> Self {
        Self {
            fail_at: Some(step),
            ..Default::default()
        }
    }
}
