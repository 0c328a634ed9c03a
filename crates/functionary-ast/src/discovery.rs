//! Locate package directories below a root
//!
//! A package directory is any directory holding a `functions.js`. Dependency
//! and VCS directories are not descended into.

use functionary_config::SOURCE_FILE_NAME;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_ignored_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }

    matches!(
        entry.file_name().to_string_lossy().as_ref(),
        ".git" | ".hg" | ".svn" | "node_modules" | "target" | "dist" | "build" | "coverage"
    )
}

/// Every directory at or below `root` that contains a `functions.js`,
/// sorted by path
pub fn find_source_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == SOURCE_FILE_NAME)
        .filter_map(|e| e.path().parent().map(Path::to_path_buf))
        .collect();

    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use crate::discovery::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nested_packages() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for dir in ["calc", "tools/strings", "node_modules/dep", "empty"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("calc/functions.js"), "").unwrap();
        fs::write(root.join("tools/strings/functions.js"), "").unwrap();
        fs::write(root.join("node_modules/dep/functions.js"), "").unwrap();
        fs::write(root.join("empty/other.js"), "").unwrap();

        let found = find_source_dirs(root);
        assert_eq!(found, [root.join("calc"), root.join("tools/strings")]);
    }

    #[test]
    fn test_root_itself_is_a_package() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("functions.js"), "").unwrap();
        assert_eq!(find_source_dirs(temp.path()), [temp.path().to_path_buf()]);
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(find_source_dirs(&temp.path().join("nope")).is_empty());
    }
}
