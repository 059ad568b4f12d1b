use std::path::Path;
use std::process::Command;

use log::{debug, warn};

/// Answers which sources changed since a baseline revision.
///
/// Implementations must be shareable across the worker threads that evaluate challenges.
pub trait SourceDiffOracle: Send + Sync {
    /// Changed files under `package` between `baseline` and the current revision, as
    /// dot-separated names without extension (`org.example.Feature`). `None` when the answer is
    /// unknown.
    fn changed_files(&self, workspace: &Path, baseline: &str, package: &str)
    -> Option<Vec<String>>;

    /// Identifier of the revision currently checked out.
    fn current_revision(&self, workspace: &Path) -> Option<String>;

    fn current_branch(&self, workspace: &Path) -> Option<String>;
}

/// [`SourceDiffOracle`] backed by the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct GitDiffOracle;

impl GitDiffOracle {
    pub fn new() -> Self {
        Self
    }

    fn git(&self, workspace: &Path, args: &[&str]) -> Option<String> {
        debug!("git {} (in {})", args.join(" "), workspace.display());
        let output = match Command::new("git").args(args).current_dir(workspace).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run git: {e}");
                return None;
            }
        };
        if !output.status.success() {
            warn!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SourceDiffOracle for GitDiffOracle {
    fn changed_files(
        &self,
        workspace: &Path,
        baseline: &str,
        package: &str,
    ) -> Option<Vec<String>> {
        let package_dir = package.replace('.', "/");
        let pathspec = if package_dir.is_empty() {
            "*".to_string()
        } else {
            format!("*{package_dir}/*")
        };
        let stdout = self.git(
            workspace,
            &["diff", "--name-only", baseline, "HEAD", "--", &pathspec],
        )?;
        Some(
            stdout
                .lines()
                .filter_map(|line| normalize_changed_path(line.trim(), &package_dir))
                .collect(),
        )
    }

    fn current_revision(&self, workspace: &Path) -> Option<String> {
        let stdout = self.git(workspace, &["rev-parse", "HEAD"])?;
        Some(stdout.trim().to_string()).filter(|s| !s.is_empty())
    }

    fn current_branch(&self, workspace: &Path) -> Option<String> {
        let stdout = self.git(workspace, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Some(stdout.trim().to_string()).filter(|s| !s.is_empty())
    }
}

/// Turns `src/main/java/org/example/Feature.java` into `org.example.Feature` given the package
/// directory `org/example`. Paths that do not contain the package directory as whole segments
/// are dropped. With an empty package directory (the default package) only the file stem is kept.
pub fn normalize_changed_path(path: &str, package_dir: &str) -> Option<String> {
    let path = path.replace('\\', "/");
    let tail = if package_dir.is_empty() {
        path.rsplit('/').next().unwrap_or(&path)
    } else {
        let start = path
            .match_indices(package_dir)
            .map(|(i, _)| i)
            .find(|&i| {
                (i == 0 || path[..i].ends_with('/'))
                    && path[i + package_dir.len()..].starts_with('/')
            })?;
        &path[start..]
    };
    let stem = match tail.rfind('.') {
        Some(dot) if dot > tail.rfind('/').unwrap_or(0) => &tail[..dot],
        _ => tail,
    };
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace('/', "."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_source_paths() {
        assert_eq!(
            normalize_changed_path("src/main/java/org/example/Feature.java", "org/example"),
            Some("org.example.Feature".to_string())
        );
        assert_eq!(
            normalize_changed_path("org/example/sub/Util.kt", "org/example"),
            Some("org.example.sub.Util".to_string())
        );
        assert_eq!(normalize_changed_path("src/other/Thing.java", "org/example"), None);
    }

    #[test]
    fn default_package_keeps_only_the_file_stem() {
        assert_eq!(
            normalize_changed_path("src/main/java/Feature.java", ""),
            Some("Feature".to_string())
        );
        assert_eq!(normalize_changed_path("Feature.java", ""), Some("Feature".to_string()));
    }

    #[test]
    fn package_dir_must_end_a_segment() {
        assert_eq!(
            normalize_changed_path("a/org/examples/x/org/example/A.java", "org/example"),
            Some("org.example.A".to_string())
        );
        assert_eq!(normalize_changed_path("src/org/examples/A.java", "org/example"), None);
    }

    #[test]
    fn package_dir_must_start_a_segment() {
        assert_eq!(normalize_changed_path("src/xorg/example/A.java", "org/example"), None);
    }
}
