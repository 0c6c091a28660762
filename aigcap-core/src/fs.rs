//! Filesystem abstractions used by the scanner.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::Result;

/// Filesystem operations the scanner depends on.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Whether the path is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// List all files under `root`, never descending into a directory whose
    /// name is in `exclude`.
    fn list_files(&self, root: &Path, exclude: &BTreeSet<String>) -> Result<Vec<PathBuf>>;
    /// Read a file into a string, replacing invalid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// [`FileSystem`] over the local disk.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create the adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, root: &Path, exclude: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        let mut at_root = true;

        while let Some(dir) = pending.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if !at_root => {
                    warn!("skipping unreadable directory {}: {err}", dir.display());
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            at_root = false;

            let mut children = Vec::new();
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("skipping unreadable entry in {}: {err}", dir.display());
                        continue;
                    }
                };
                let path = entry.path();
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if file_type.is_dir() {
                    if !is_excluded(&path, exclude) {
                        children.push(path);
                    }
                } else if file_type.is_file() {
                    files.push(path);
                } else if file_type.is_symlink() {
                    // Linked files are scanned; linked directories are not followed.
                    if std::fs::metadata(&path).is_ok_and(|meta| meta.is_file()) {
                        files.push(path);
                    }
                }
            }
            children.sort();
            pending.extend(children.into_iter().rev());
        }

        files.sort();
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn is_excluded(path: &Path, exclude: &BTreeSet<String>) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| exclude.contains(name))
        .unwrap_or(false)
}
