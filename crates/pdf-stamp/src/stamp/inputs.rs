//! Input discovery and output naming

use crate::types::*;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One document to stamp
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct InputFile {
    pub path: PathBuf,
    /// Directory relative to the scanned root, empty for explicit files
    pub relative_dir: PathBuf,
}

impl InputFile {
    /// Where the stamped copy goes in output directory mode
    pub fn output_path(&self, output_dir: &Path, suffix: &str) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        output_dir
            .join(&self.relative_dir)
            .join(format!("{}{}.pdf", stem, suffix))
    }
}

/// Expand files and directories into a sorted, de-duplicated list of PDFs.
///
/// Directories are scanned one level deep, or fully when `recursive` is set.
/// Files named explicitly are taken as they are.
pub fn collect_inputs(paths: &[PathBuf], recursive: bool) -> Result<Vec<InputFile>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_file() {
            inputs.push(InputFile {
                path: path.clone(),
                relative_dir: PathBuf::new(),
            });
        } else if path.is_dir() {
            scan_directory(path, recursive, &mut inputs)?;
        } else {
            return Err(StampError::NotFound(path.clone()));
        }
    }

    inputs.sort();
    inputs.dedup_by(|a, b| a.path == b.path);
    Ok(inputs)
}

fn scan_directory(root: &Path, recursive: bool, inputs: &mut Vec<InputFile>) -> Result<()> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(if recursive { usize::MAX } else { 1 });

    for entry in walker {
        let entry = entry.map_err(|err| match err.io_error() {
            Some(io_err) => StampError::Io(io::Error::new(io_err.kind(), io_err.to_string())),
            None => StampError::Io(io::Error::other(err.to_string())),
        })?;

        if !entry.file_type().is_file() || !is_pdf(entry.path()) {
            continue;
        }

        let relative_dir = entry
            .path()
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        inputs.push(InputFile {
            path: entry.into_path(),
            relative_dir,
        });
    }

    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
