//! Parent-chain creation for materialized files.
use std::fs::{self, DirBuilder, Permissions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};

/// Create every missing directory of `dir`, outermost first, each with exactly `mode`.
///
/// Existing directories are left untouched. The mode is applied explicitly after
/// creation so the process umask cannot alter it. A directory that appears
/// concurrently is treated as already existing. Each directory is pushed onto
/// `created` as soon as it exists, so a failure further down still leaves the
/// directories made so far recorded there.
///
/// # Errors
///
/// Returns an IO error when a component exists but is not a directory, or a
/// directory cannot be created.
pub fn create_dir_chain(dir: &Path, mode: u32, created: &mut Vec<PathBuf>) -> io::Result<()> {
    create_chain_with(dir, created, |p| {
        DirBuilder::new().mode(mode).create(p)?;
        fs::set_permissions(p, Permissions::from_mode(mode))
    })
}

fn create_chain_with<F>(dir: &Path, created: &mut Vec<PathBuf>, mut mkdir: F) -> io::Result<()>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut missing = Vec::new();
    let mut cur = Some(dir);
    while let Some(p) = cur {
        if p.as_os_str().is_empty() {
            break;
        }
        match fs::metadata(p) {
            Ok(md) if md.is_dir() => break,
            Ok(_) => {
                return Err(io::Error::other(format!(
                    "{} exists and is not a directory",
                    p.display()
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                missing.push(p.to_path_buf());
                cur = p.parent();
            }
            Err(e) => return Err(e),
        }
    }

    for p in missing.into_iter().rev() {
        match mkdir(&p) {
            Ok(()) => created.push(p),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && p.is_dir() => {}
            Err(e) => {
                // mkdir succeeded but the chmod did not
                if p.is_dir() {
                    created.push(p);
                }
                return Err(e);
            }
        }
    }
    Ok(())
}
