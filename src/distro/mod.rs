//! System path and helper-tool registry shared by provisioning subsystems
//! (partitioning, RAID assembly, filesystem creation).
//!
//! Built once at start-up from compiled-in defaults, an optional YAML overlay and
//! `PROVISIONER_*` environment variables, then passed to consumers read-only.
pub mod paths;

pub use paths::{FsType, SystemPaths};
