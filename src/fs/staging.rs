//! Same-directory staging file with rollback on drop.
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, Write};
use std::os::unix::fs::MetadataExt;

use rustix::fd::OwnedFd;
use rustix::fs::{fchmod, openat, unlinkat, AtFlags, Mode, OFlags};
use rustix::io::Errno;

use super::atomic::{errno_to_io, rename_in_dir, staging_name};
use crate::constants::{MODE_MASK, STAGING_CREATE_ATTEMPTS, STAGING_CREATE_MODE};

/// An unpublished file next to its final target.
///
/// Until [`StagingFile::commit`] succeeds the file is only reachable under its
/// hidden staging name; dropping the guard uncommitted unlinks it.
pub struct StagingFile<'d> {
    dirfd: &'d OwnedFd,
    name: OsString,
    file: Option<File>,
    committed: bool,
}

impl<'d> StagingFile<'d> {
    /// Exclusively create a fresh staging file for `target_name` inside `dirfd`.
    ///
    /// # Errors
    ///
    /// Returns an IO error when no staging file could be created.
    pub fn create_in(dirfd: &'d OwnedFd, target_name: &OsStr) -> io::Result<Self> {
        let mut last = errno_to_io(Errno::EXIST);
        for _ in 0..STAGING_CREATE_ATTEMPTS {
            let name = staging_name(target_name);
            match openat(
                dirfd,
                name.as_os_str(),
                OFlags::WRONLY | OFlags::CREATE | OFlags::EXCL | OFlags::NOFOLLOW | OFlags::CLOEXEC,
                Mode::from_bits_truncate(STAGING_CREATE_MODE),
            ) {
                Ok(fd) => {
                    return Ok(Self {
                        dirfd,
                        name,
                        file: Some(File::from(fd)),
                        committed: false,
                    })
                }
                Err(e) if e == Errno::EXIST => last = errno_to_io(e),
                Err(e) => return Err(errno_to_io(e)),
            }
        }
        Err(last)
    }

    #[must_use]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    fn file(&self) -> io::Result<&File> {
        self.file
            .as_ref()
            .ok_or_else(|| io::Error::other("staging file already closed"))
    }

    /// Write the complete contents.
    ///
    /// # Errors
    ///
    /// Returns an IO error on a short or failed write.
    pub fn write_all(&mut self, contents: &[u8]) -> io::Result<()> {
        let mut f = self.file()?;
        f.write_all(contents)?;
        f.flush()
    }

    /// Set ownership through the open descriptor.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the process may not give the file away.
    pub fn set_owner(&self, uid: u32, gid: u32) -> io::Result<()> {
        std::os::unix::fs::fchown(self.file()?, Some(uid), Some(gid))
    }

    /// Set permission bits through the open descriptor. Must follow [`Self::set_owner`]:
    /// an ownership change clears set-id bits.
    ///
    /// The kernel may silently drop `S_ISGID` (group not among the caller's groups),
    /// so the resulting mode is read back and compared.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the mode cannot be changed or did not stick.
    pub fn set_mode(&self, mode: u32) -> io::Result<()> {
        let f = self.file()?;
        fchmod(f, Mode::from_bits_truncate(mode & MODE_MASK)).map_err(errno_to_io)?;
        mode_applied(mode, f.metadata()?.mode())
    }

    /// Flush file data and metadata to stable storage.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the fsync fails.
    pub fn sync(&self) -> io::Result<()> {
        self.file()?.sync_all()
    }

    /// Close the staging file and rename it onto `target_name`. This is the publish point.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the rename fails; the staging file is removed.
    pub fn commit(mut self, target_name: &OsStr, force_exdev: bool) -> io::Result<()> {
        drop(self.file.take());
        rename_in_dir(self.dirfd, &self.name, target_name, force_exdev)?;
        self.committed = true;
        Ok(())
    }
}

fn mode_applied(requested: u32, actual: u32) -> io::Result<()> {
    let (want, got) = (requested & MODE_MASK, actual & MODE_MASK);
    if want == got {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("mode {want:04o} requested but {got:04o} applied"),
    ))
}

impl Drop for StagingFile<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.file.take());
        match unlinkat(self.dirfd, self.name.as_os_str(), AtFlags::empty()) {
            Ok(()) => {}
            Err(e) if e == Errno::NOENT => {}
            Err(e) => log::warn!(
                "failed to remove staging file {}: {e}",
                self.name.to_string_lossy()
            ),
        }
    }
}
