//! Atomic in-place file replacement
//!
//! New content is written to a hidden sibling temp file and renamed over the
//! target. When the platform refuses the rename, the temp file is copied over
//! the target instead. The temp file never outlives the call.

use crate::types::*;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::TempPath;

/// Filesystem steps used to move the temp file into place
pub trait ReplaceOps {
    /// Atomically move `from` onto `to`
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Overwrite `to` with the contents of `from`, clearing read-only first.
    ///
    /// Not atomic: a copy that fails part way can leave `to` truncated.
    fn copy_over(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`ReplaceOps`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReplace;

impl ReplaceOps for FsReplace {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn copy_over(&self, from: &Path, to: &Path) -> io::Result<()> {
        let original = fs::metadata(to)
            .map(|metadata| metadata.permissions())
            .ok()
            .filter(|permissions| permissions.readonly());

        if let Some(permissions) = &original {
            let mut writable = permissions.clone();
            #[allow(clippy::permissions_set_readonly_false)]
            writable.set_readonly(false);
            fs::set_permissions(to, writable)?;
        }

        let copied = fs::copy(from, to);
        if let (Err(_), Some(permissions)) = (&copied, original) {
            if let Err(err) = fs::set_permissions(to, permissions) {
                log::debug!("Failed to restore permissions on {}: {}", to.display(), err);
            }
        }
        copied.map(|_| ())
    }
}

/// Replace `target` with `bytes` using the real filesystem
pub fn replace_file(target: &Path, bytes: &[u8]) -> Result<()> {
    replace_file_with(&FsReplace, target, bytes)
}

/// Replace `target` with `bytes`, moving the temp file with `ops`
pub fn replace_file_with<O: ReplaceOps + ?Sized>(ops: &O, target: &Path, bytes: &[u8]) -> Result<()> {
    let temp = write_temp_sibling(target, bytes)?;

    match ops.rename(&temp, target) {
        Ok(()) => {
            // Already moved; nothing left to delete
            let _ = temp.keep();
            Ok(())
        }
        Err(err) if allows_fallback(&err) => {
            log::debug!(
                "Rename onto {} refused ({}), copying instead",
                target.display(),
                err
            );
            let copied = ops.copy_over(&temp, target);
            discard(temp);
            copied.map_err(StampError::from)
        }
        Err(err) => {
            discard(temp);
            Err(err.into())
        }
    }
}

/// Rename failures that a plain copy may still get past
fn allows_fallback(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Unsupported
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::ResourceBusy
            | io::ErrorKind::CrossesDevices
            | io::ErrorKind::Other
    )
}

fn write_temp_sibling(target: &Path, bytes: &[u8]) -> Result<TempPath> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = target
        .file_name()
        .ok_or_else(|| StampError::Config(format!("Not a file path: {}", target.display())))?
        .to_string_lossy();

    let mut file = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    Ok(file.into_temp_path())
}

fn discard(temp: TempPath) {
    let path = temp.to_path_buf();
    if let Err(err) = temp.close() {
        log::debug!("Failed to remove temp file {}: {}", path.display(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Rename always fails with `kind`; copy can be made to fail too
    struct Refusing {
        kind: io::ErrorKind,
        copy_fails: bool,
        copies: Cell<usize>,
    }

    impl Refusing {
        fn new(kind: io::ErrorKind, copy_fails: bool) -> Self {
            Self {
                kind,
                copy_fails,
                copies: Cell::new(0),
            }
        }
    }

    impl ReplaceOps for Refusing {
        fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
            Err(io::Error::new(self.kind, "refused"))
        }

        fn copy_over(&self, from: &Path, to: &Path) -> io::Result<()> {
            self.copies.set(self.copies.get() + 1);
            if self.copy_fails {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "copy refused"));
            }
            FsReplace.copy_over(from, to)
        }
    }

    fn setup() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("doc.pdf");
        fs::write(&target, b"original").unwrap();
        (dir, target)
    }

    fn leftovers(dir: &TempDir) -> Vec<String> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_rename_replaces_content() {
        let (dir, target) = setup();
        replace_file(&target, b"stamped").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"stamped");
        assert!(leftovers(&dir).is_empty());
    }

    #[test]
    fn test_fallback_copies_and_cleans_up() {
        let (dir, target) = setup();
        let ops = Refusing::new(io::ErrorKind::PermissionDenied, false);
        replace_file_with(&ops, &target, b"stamped").unwrap();

        assert_eq!(ops.copies.get(), 1);
        assert_eq!(fs::read(&target).unwrap(), b"stamped");
        assert!(leftovers(&dir).is_empty());
    }

    #[test]
    fn test_failed_fallback_leaves_original() {
        let (dir, target) = setup();
        let ops = Refusing::new(io::ErrorKind::CrossesDevices, true);
        let err = replace_file_with(&ops, &target, b"stamped").unwrap_err();

        assert!(matches!(err, StampError::Io(_)));
        assert_eq!(fs::read(&target).unwrap(), b"original");
        assert!(leftovers(&dir).is_empty());
    }

    #[test]
    fn test_unrecoverable_rename_skips_fallback() {
        let (dir, target) = setup();
        let ops = Refusing::new(io::ErrorKind::NotFound, false);
        assert!(replace_file_with(&ops, &target, b"stamped").is_err());

        assert_eq!(ops.copies.get(), 0);
        assert_eq!(fs::read(&target).unwrap(), b"original");
        assert!(leftovers(&dir).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_keeps_read_only() {
        let (dir, target) = setup();
        let mut permissions = fs::metadata(&target).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&target, permissions).unwrap();

        let missing = dir.path().join("missing.bin");
        assert!(FsReplace.copy_over(&missing, &target).is_err());
        assert!(fs::metadata(&target).unwrap().permissions().readonly());
        assert_eq!(fs::read(&target).unwrap(), b"original");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_over_clears_read_only() {
        let (dir, target) = setup();
        let mut permissions = fs::metadata(&target).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&target, permissions).unwrap();

        let source = dir.path().join("new.bin");
        fs::write(&source, b"stamped").unwrap();
        FsReplace.copy_over(&source, &target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"stamped");
    }
}
