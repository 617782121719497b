#![forbid(unsafe_code)]
//! Provisioner: first-boot file materialization.
//!
//! Safety model highlights:
//! - A file is written to a hidden staging file in its final directory, given its
//!   ownership and mode, and only then renamed over the target, so the target is
//!   never observable with partial content or wrong attributes.
//! - Targets are `SafePath`s confined to a destination root.
//! - Path and helper-tool locations used by sibling subsystems live in an explicit,
//!   injected `distro::SystemPaths` registry.
//! - This crate forbids `unsafe` and uses `rustix` for syscalls.

pub mod api;
pub mod constants;
pub mod distro;
pub mod fs;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;
