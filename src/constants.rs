//! Shared crate-wide constants for the provisioner.
//!
//! Centralizes magic values used across modules. The two permission defaults are
//! part of the on-disk contract and must not change.

/// Permission bits for directories created while materializing a file's parent chain.
pub const DEFAULT_DIRECTORY_PERMISSIONS: u32 = 0o755;

/// Fallback permission bits for a file whose description carries no mode.
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o644;

/// Mode a staging file is created with, before the requested mode is applied.
pub const STAGING_CREATE_MODE: u32 = 0o600;

/// Permission bits honoured from a caller-supplied mode (rwx for all classes plus set-id/sticky).
pub const MODE_MASK: u32 = 0o7777;

/// Staging filename suffix. The full name is `.{fname}.{pid}.{ctr}{TMP_SUFFIX}`;
/// e.g., `.example.conf.4242.0.provisioner.tmp`.
pub const TMP_SUFFIX: &str = ".provisioner.tmp";

/// Longest single path component accepted by Linux filesystems (`NAME_MAX`).
/// Staging names are cut to fit within it.
pub const NAME_MAX: usize = 255;

/// How many staging names are tried before giving up on `EEXIST`.
pub const STAGING_CREATE_ATTEMPTS: u32 = 8;

/// Threshold in milliseconds above which an fsync duration is reported with WARN severity.
pub const FSYNC_WARN_MS: u64 = 50;

/// UUIDv5 namespace tag for deterministic run/action IDs.
pub const NS_TAG: &str = "https://provisioner/materialize";

/// Prefix of environment variables that override registry entries,
/// e.g. `PROVISIONER_MDADM_CMD=/opt/bin/mdadm`.
pub const ENV_PREFIX: &str = "PROVISIONER_";
