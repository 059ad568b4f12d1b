use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Depth-first search under `root` for a directory named `target`.
///
/// Children are visited in name order, each subtree fully before its next sibling, and the first
/// match wins. The comparison is case-sensitive. `root` itself is never a match.
pub fn find_folder_in_tree(root: &Path, target: &str) -> Option<PathBuf> {
    if !root.is_dir() {
        warn!("Search root {} is not a directory", root.display());
        return None;
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        if dir != root && dir.file_name().is_some_and(|name| name == target) {
            return Some(dir);
        }
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping unreadable directory {}: {e}", dir.display());
                continue;
            }
        };
        let mut children: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.path())
            .collect();
        // reversed so the smallest name is popped first
        children.sort_by(|a, b| b.cmp(a));
        stack.extend(children);
    }
    None
}

/// Final segment of a dot-separated package name: `org.example.util` -> `util`.
pub fn package_leaf(package: &str) -> &str {
    package.rsplit('.').next().unwrap_or(package)
}

/// True if a directory named after the leaf of `package` exists anywhere under `root`.
pub fn package_exists(root: &Path, package: &str) -> bool {
    find_folder_in_tree(root, package_leaf(package)).is_some()
}

/// Moves `path` recorded under `old_root` to the same relative location under `new_root`.
/// Paths outside `old_root` are returned unchanged.
pub fn rebase_path(path: &Path, old_root: &Path, new_root: &Path) -> PathBuf {
    match path.strip_prefix(old_root) {
        Ok(relative) => new_root.join(relative),
        Err(_) => path.to_path_buf(),
    }
}
