//! File descriptions consumed by the materializer.
use std::path::Path;

use serde::Deserialize;

use super::errors::Result;
use super::safepath::SafePath;
use crate::constants::DEFAULT_FILE_PERMISSIONS;

/// A fully resolved file: where it goes, what it holds, and who owns it.
///
/// Mode and ownership are concrete integers; symbolic user/group names must be
/// resolved by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSpec {
    pub path: SafePath,
    pub contents: Vec<u8>,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl FileSpec {
    /// A root-owned file with the default file mode. Callers are expected to set an
    /// explicit mode with [`FileSpec::with_mode`].
    pub fn new(path: SafePath, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            contents: contents.into(),
            mode: DEFAULT_FILE_PERMISSIONS,
            uid: 0,
            gid: 0,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// Resolve a logical file description against the destination `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured path cannot be re-rooted under `root`.
    pub fn render(root: &Path, entry: &FileEntry) -> Result<Self> {
        let path = SafePath::join_rooted(root, Path::new(&entry.path))?;
        Ok(Self {
            path,
            contents: entry.contents.as_bytes().to_vec(),
            mode: entry.mode.unwrap_or(DEFAULT_FILE_PERMISSIONS),
            uid: entry.uid.unwrap_or(0),
            gid: entry.gid.unwrap_or(0),
        })
    }
}

/// A file as written in provisioning configuration, before resolution.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    /// Absolute path on the provisioned system.
    pub path: String,
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub mode: Option<u32>,
    #[serde(default)]
    pub uid: Option<u32>,
    #[serde(default)]
    pub gid: Option<u32>,
}
