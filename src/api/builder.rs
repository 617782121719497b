use crate::distro::SystemPaths;
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;

use super::overrides::Overrides;

/// Builder for constructing a Provisioner with ergonomic chaining.
pub struct ApiBuilder<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    paths: SystemPaths,
    overrides: Overrides,
}

impl<E: FactsEmitter, A: AuditSink> ApiBuilder<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            paths: SystemPaths::default(),
            overrides: Overrides::default(),
        }
    }

    #[must_use]
    pub fn system_paths(mut self, paths: SystemPaths) -> Self {
        self.paths = paths;
        self
    }

    #[must_use]
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn build(self) -> super::Provisioner<E, A> {
        super::Provisioner::new(self.facts, self.audit, self.policy)
            .with_system_paths(self.paths)
            .with_overrides(self.overrides)
    }
}
