//! Directory-handle primitives used by the materializer.
//!
//! Everything below a parent directory is addressed relative to an open handle on
//! that directory (`openat`, `renameat`, `unlinkat`), so the staging file and the
//! final name are guaranteed to live in the same directory, and thus on the same
//! filesystem, for the whole operation.
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rustix::fd::OwnedFd;
use rustix::fs::{openat, renameat, Mode, OFlags, CWD};
use rustix::io::Errno;

use crate::constants::{NAME_MAX, TMP_SUFFIX};

pub(crate) fn errno_to_io(e: Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e.raw_os_error())
}

// Global counter to produce unique staging names within a process.
static NEXT_TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Open a directory handle for `*at` operations.
///
/// Symlinks in the directory path itself are followed, the same way the parent
/// chain was created; the final component of a target is never followed.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be opened.
pub fn open_dir(dir: &Path) -> std::io::Result<OwnedFd> {
    openat(
        CWD,
        dir,
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
        Mode::empty(),
    )
    .map_err(errno_to_io)
}

/// Fsync a directory through an already-open handle, returning the elapsed milliseconds.
///
/// # Errors
///
/// Returns an IO error if the fsync fails.
pub fn fsync_dirfd(dirfd: &OwnedFd) -> std::io::Result<u64> {
    let t0 = Instant::now();
    rustix::fs::fsync(dirfd).map_err(errno_to_io)?;
    Ok(u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX))
}

/// Produce a fresh hidden staging name for `fname`: `.{fname}.{pid}.{ctr}.provisioner.tmp`.
///
/// The `fname` part is shortened so the whole name never exceeds `NAME_MAX`;
/// uniqueness comes from the pid and counter alone.
pub(crate) fn staging_name(fname: &OsStr) -> OsString {
    let pid = std::process::id();
    let ctr = NEXT_TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tail = format!(".{pid}.{ctr}{TMP_SUFFIX}");
    let room = NAME_MAX.saturating_sub(1 + tail.len());
    let stem = fname.as_bytes();
    let mut name = OsString::from(".");
    name.push(OsStr::from_bytes(&stem[..stem.len().min(room)]));
    name.push(tail);
    name
}

/// Rename `from` onto `to` inside one directory.
///
/// `force_exdev` simulates a cross-filesystem rename (`EXDEV`) without touching
/// the filesystem, for exercising publish failures.
///
/// # Errors
///
/// Returns an IO error if the rename fails.
pub fn rename_in_dir(
    dirfd: &OwnedFd,
    from: &OsStr,
    to: &OsStr,
    force_exdev: bool,
) -> std::io::Result<()> {
    if force_exdev {
        return Err(errno_to_io(Errno::XDEV));
    }
    renameat(dirfd, from, dirfd, to).map_err(errno_to_io)
}
