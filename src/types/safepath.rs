use std::path::{Component, Path, PathBuf};

use super::errors::{Error, ErrorKind, Result};

/// A path confined to a destination root.
///
/// Provisioning writes into a root that is usually not `/` (the future system root
/// mounted somewhere in the initramfs), so every target is kept as `root` + `rel`
/// with no `..` components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafePath {
    /// The root path that this safe path is relative to
    root: PathBuf,
    /// The relative path component
    rel: PathBuf,
}

impl SafePath {
    /// Creates a new SafePath from a root and a candidate that must already lie
    /// inside it (when absolute) or be relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error when `root` is not absolute, the candidate escapes `root`,
    /// or it contains `..` or another unsupported component.
    pub fn from_rooted(root: &Path, candidate: &Path) -> Result<Self> {
        ensure_absolute_root(root)?;
        let effective = if candidate.is_absolute() {
            match candidate.strip_prefix(root) {
                Ok(p) => p.to_path_buf(),
                Err(_) => return Err(Error::new(ErrorKind::Policy, "path escapes root")),
            }
        } else {
            candidate.to_path_buf()
        };
        Self::build(root, &effective)
    }

    /// Re-roots a configured path under `root`.
    ///
    /// Configuration names files by their final absolute location (`/etc/hostname`);
    /// while provisioning, that location lives below the destination root, so the
    /// leading `/` is dropped and the rest is joined onto `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when `root` is not absolute or the path contains `..`.
    pub fn join_rooted(root: &Path, configured: &Path) -> Result<Self> {
        ensure_absolute_root(root)?;
        let rel: PathBuf = configured
            .components()
            .filter(|c| !matches!(c, Component::RootDir))
            .collect();
        Self::build(root, &rel)
    }

    fn build(root: &Path, effective: &Path) -> Result<Self> {
        let mut rel = PathBuf::new();
        for seg in effective.components() {
            match seg {
                Component::CurDir => {}
                Component::Normal(p) => rel.push(p),
                Component::ParentDir => return Err(Error::new(ErrorKind::Policy, "dotdot")),
                _ => {
                    return Err(Error::new(
                        ErrorKind::InvalidPath,
                        "unsupported component",
                    ))
                }
            }
        }
        Ok(SafePath {
            root: root.to_path_buf(),
            rel,
        })
    }

    /// Returns the full path by joining the root and relative components.
    pub fn as_path(&self) -> PathBuf {
        self.root.join(&self.rel)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rel(&self) -> &Path {
        &self.rel
    }
}

fn ensure_absolute_root(root: &Path) -> Result<()> {
    if root.is_absolute() {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::InvalidPath, "root must be absolute"))
    }
}
