//! Default base directory: the consuming project's root.

use std::env;
use std::path::{Path, PathBuf};

/// Manifest file marking a project root.
pub const MANIFEST: &str = "Cargo.toml";

/// Nearest ancestor of `start` (inclusive) containing `name`, as the file path.
pub fn find_up(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Directory of the nearest manifest above `start`, else `fallback`.
pub fn project_root_from(start: &Path, fallback: &Path) -> PathBuf {
    find_up(start, MANIFEST)
        .and_then(|manifest| manifest.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| fallback.to_path_buf())
}

/// Resolve the consuming project's root directory.
///
/// Searches upward from the working directory, so `cargo run` and the built
/// binary started from the same directory agree. Falls back to the working
/// directory when no manifest is found.
pub fn project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    project_root_from(&cwd, &cwd)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn finds_nearest_manifest_directory() {
        let dir = TempDir::new().expect("create tempdir");
        let nested = dir.path().join("app").join("src").join("bin");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("app").join(MANIFEST), "[package]").unwrap();

        let root = project_root_from(&nested, Path::new("/fallback"));
        assert_eq!(root, dir.path().join("app"));
    }

    #[test]
    fn falls_back_when_no_manifest() {
        let dir = TempDir::new().expect("create tempdir");
        let fallback = dir.path().join("fallback");
        // tempdirs live outside any cargo project on CI runners, but guard anyway
        if find_up(dir.path(), MANIFEST).is_some() {
            return;
        }
        assert_eq!(project_root_from(dir.path(), &fallback), fallback);
    }

    #[test]
    fn project_root_searches_from_the_working_directory() {
        let cwd = env::current_dir().unwrap();
        let root = project_root();
        assert!(cwd.starts_with(&root), "{} is not above {}", root.display(), cwd.display());
        // cargo runs tests from the package directory
        assert!(root.join(MANIFEST).is_file());
    }
}
