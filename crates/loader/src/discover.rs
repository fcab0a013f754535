//! Resource file discovery under a resolved path template.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use lingua_core::DEFAULT_NAMESPACE;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{LoadError, Result};
use crate::template::CaptureRegex;

/// A discovered resource file and what its path says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    /// Absolute (or base-relative) path of the file.
    pub filename: PathBuf,
    /// Base directory the file was discovered under.
    pub dir: PathBuf,
    pub lang: String,
    pub namespace: String,
    pub ext: String,
}

/// Merge order: language, then namespace (`default` first), then extension.
pub fn compare_files(a: &ResourceFile, b: &ResourceFile) -> Ordering {
    a.lang
        .cmp(&b.lang)
        .then_with(|| compare_namespaces(&a.namespace, &b.namespace))
        .then_with(|| a.ext.cmp(&b.ext))
}

fn compare_namespaces(a: &str, b: &str) -> Ordering {
    match (a == DEFAULT_NAMESPACE, b == DEFAULT_NAMESPACE) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Walk `root` and collect every file whose path matches `pattern`, sorted in
/// merge order. A missing root yields no files.
pub fn discover(root: &Path, pattern: &CaptureRegex, dir: &Path) -> Result<Vec<ResourceFile>> {
    if !root.exists() {
        debug!(root = %root.display(), "resource root does not exist, skipping");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            LoadError::Io { path, source }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(captured) = pattern.captures(path) else {
            continue;
        };

        files.push(ResourceFile {
            filename: path.to_path_buf(),
            dir: dir.to_path_buf(),
            lang: captured.lang,
            namespace: captured.namespace,
            ext: captured.ext,
        });
    }

    files.sort_by(compare_files);
    debug!(root = %root.display(), files = files.len(), "discovered resource files");
    Ok(files)
}
