//! Atomic file materialization. Pure mechanism: emits no facts.
//!
//! Sequence, relative to an open handle on the parent directory:
//! `create parents -> openat(O_EXCL, staging) -> write -> fchown -> fchmod -> fsync -> renameat(staging, final) -> fsync(dirfd)`.
//!
//! Ownership and mode are fixed before the rename, so the final name never
//! refers to a file with partial content or the wrong attributes. Any failure
//! before the rename removes the staging file; created directories are kept.
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::atomic::{fsync_dirfd, open_dir};
use super::mkdir::create_dir_chain;
use super::staging::StagingFile;
use crate::constants::{DEFAULT_DIRECTORY_PERMISSIONS, NAME_MAX};
use crate::types::Step;

/// Knobs for one atomic write.
#[derive(Clone, Copy, Debug)]
pub struct WriteOptions {
    pub fsync_file: bool,
    pub fsync_parent: bool,
    /// Simulate `EXDEV` at the rename.
    pub force_exdev: bool,
    /// Fail deliberately just before the named step runs.
    pub fail_at: Option<Step>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            fsync_file: true,
            fsync_parent: true,
            force_exdev: false,
            fail_at: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WriteOutcome {
    pub created_dirs: Vec<PathBuf>,
    /// Whether an existing entry was replaced at the target name.
    pub replaced: bool,
    pub fsync_ms: u64,
}

/// A failed write: which step, on which target, and the underlying IO error.
#[derive(Debug, Error)]
#[error("{step} failed for {}: {source}", path.display())]
pub struct StepError {
    pub step: Step,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
    /// Directories created before the failure; they are not removed.
    pub created_dirs: Vec<PathBuf>,
}

/// Validate `target` without touching the filesystem.
///
/// Returns the parent directory, the final file name, and whether an entry
/// currently exists at the target.
///
/// # Errors
///
/// Fails when the target has no file name, its name exceeds `NAME_MAX`, or it
/// currently is a directory.
pub fn preflight(target: &Path) -> Result<(PathBuf, std::ffi::OsString, bool), StepError> {
    let fail = |source: io::Error| StepError {
        step: Step::Preflight,
        path: target.to_path_buf(),
        source,
        created_dirs: Vec::new(),
    };
    let fname = target
        .file_name()
        .ok_or_else(|| fail(io::Error::new(io::ErrorKind::InvalidInput, "target has no file name")))?;
    if fname.len() > NAME_MAX {
        return Err(fail(io::Error::from_raw_os_error(libc::ENAMETOOLONG)));
    }
    let parent = target
        .parent()
        .ok_or_else(|| fail(io::Error::new(io::ErrorKind::InvalidInput, "target has no parent")))?;
    let existed = match std::fs::symlink_metadata(target) {
        Ok(md) if md.is_dir() => return Err(fail(io::Error::from_raw_os_error(libc::EISDIR))),
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        // ENOTDIR and friends surface again, with context, when the parents are created.
        Err(_) => false,
    };
    Ok((parent.to_path_buf(), fname.to_os_string(), existed))
}

/// Materialize `contents` at `target` with exactly `mode`, `uid` and `gid`.
///
/// # Errors
///
/// Returns a [`StepError`] naming the failing step. On error the target keeps
/// its previous state and no staging file remains.
pub fn write_file_atomic(
    target: &Path,
    contents: &[u8],
    mode: u32,
    uid: u32,
    gid: u32,
    opts: &WriteOptions,
) -> Result<WriteOutcome, StepError> {
    let mut created_dirs = Vec::new();
    match run_steps(target, contents, mode, uid, gid, opts, &mut created_dirs) {
        Ok((replaced, fsync_ms)) => Ok(WriteOutcome {
            created_dirs,
            replaced,
            fsync_ms,
        }),
        Err((step, source)) => Err(StepError {
            step,
            path: target.to_path_buf(),
            source,
            created_dirs,
        }),
    }
}

fn injected(opts: &WriteOptions, step: Step) -> io::Result<()> {
    if opts.fail_at == Some(step) {
        return Err(io::Error::other(format!("injected failure at {step}")));
    }
    Ok(())
}

fn run_steps(
    target: &Path,
    contents: &[u8],
    mode: u32,
    uid: u32,
    gid: u32,
    opts: &WriteOptions,
    created_dirs: &mut Vec<PathBuf>,
) -> Result<(bool, u64), (Step, io::Error)> {
    let at = |step: Step| move |e: io::Error| (step, e);

    injected(opts, Step::Preflight).map_err(at(Step::Preflight))?;
    let (parent, fname, existed) = preflight(target).map_err(|e| (e.step, e.source))?;

    injected(opts, Step::CreateParents).map_err(at(Step::CreateParents))?;
    create_dir_chain(&parent, DEFAULT_DIRECTORY_PERMISSIONS, created_dirs)
        .map_err(at(Step::CreateParents))?;
    let dirfd = open_dir(&parent).map_err(at(Step::CreateParents))?;

    injected(opts, Step::CreateStaging).map_err(at(Step::CreateStaging))?;
    let mut staging = StagingFile::create_in(&dirfd, &fname).map_err(at(Step::CreateStaging))?;

    injected(opts, Step::Write).map_err(at(Step::Write))?;
    staging.write_all(contents).map_err(at(Step::Write))?;

    injected(opts, Step::Chown).map_err(at(Step::Chown))?;
    staging.set_owner(uid, gid).map_err(at(Step::Chown))?;

    injected(opts, Step::Chmod).map_err(at(Step::Chmod))?;
    staging.set_mode(mode).map_err(at(Step::Chmod))?;

    injected(opts, Step::Sync).map_err(at(Step::Sync))?;
    if opts.fsync_file {
        staging.sync().map_err(at(Step::Sync))?;
    }

    injected(opts, Step::Rename).map_err(at(Step::Rename))?;
    staging
        .commit(&fname, opts.force_exdev)
        .map_err(at(Step::Rename))?;

    // Published; a failed directory fsync cannot be rolled back, so it is not an error.
    let fsync_ms = if opts.fsync_parent {
        fsync_dirfd(&dirfd).unwrap_or(0)
    } else {
        0
    };
    Ok((existed, fsync_ms))
}
