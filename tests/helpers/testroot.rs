// A per-test destination root with FileSpec builders.

use std::path::{Path, PathBuf};

use provisioner::types::{FileSpec, SafePath};

#[derive(Debug)]
pub struct TestRoot {
    td: tempfile::TempDir,
}

impl TestRoot {
    pub fn new() -> Self {
        Self {
            td: tempfile::TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.td.path()
    }

    /// Host path of a configured absolute path, e.g. `/etc/x` -> `<root>/etc/x`.
    pub fn host(&self, configured: &str) -> PathBuf {
        self.path().join(configured.trim_start_matches('/'))
    }

    /// A spec for `configured` owned by the test process.
    pub fn spec(&self, configured: &str, contents: &[u8], mode: u32) -> FileSpec {
        let (uid, gid) = super::me();
        let p = SafePath::join_rooted(self.path(), Path::new(configured)).expect("safe path");
        FileSpec::new(p, contents).with_mode(mode).with_owner(uid, gid)
    }
}
