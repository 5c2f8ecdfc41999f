//! Project ignore rules: the root `.gitignore` plus built-in directories.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use tracing::{debug, warn};

/// Directories never indexed, wherever they appear.
pub const BUILTIN_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "dist",
    "build",
    "out",
    "coverage",
    ".next",
    ".nuxt",
    ".turbo",
    ".cache",
];

pub fn is_builtin_excluded_dir(name: &str) -> bool {
    BUILTIN_EXCLUDED_DIRS.contains(&name)
}

/// Whether any directory segment of a relative file path is built-in
/// excluded. The file name itself is not checked.
pub fn in_builtin_excluded_dir(rel_path: &str) -> bool {
    match rel_path.rsplit_once('/') {
        Some((dirs, _)) => dirs.split('/').any(is_builtin_excluded_dir),
        None => false,
    }
}

/// Ignore rules for one project root.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    gitignore: Option<Gitignore>,
}

impl IgnoreRules {
    /// Load the root `.gitignore`, if present. A malformed file is logged
    /// and whatever lines parsed are kept.
    pub fn load(root: &Path) -> Self {
        let path = root.join(".gitignore");
        if !path.is_file() {
            return Self { gitignore: None };
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(&path) {
            warn!(path = ?path, error = %err, "Problem reading .gitignore");
        }
        match builder.build() {
            Ok(gitignore) => {
                debug!(rules = gitignore.num_ignores(), "Loaded .gitignore");
                Self {
                    gitignore: Some(gitignore),
                }
            }
            Err(err) => {
                warn!(path = ?path, error = %err, "Ignoring unusable .gitignore");
                Self { gitignore: None }
            }
        }
    }

    /// Whether a relative file path is ignored.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        if in_builtin_excluded_dir(rel_path) {
            return true;
        }
        self.gitignore.as_ref().is_some_and(|gi| {
            gi.matched_path_or_any_parents(rel_path, false).is_ignore()
        })
    }

    /// Whether a relative directory path is ignored, so the walk can skip it.
    pub fn is_dir_ignored(&self, rel_dir: &str) -> bool {
        if rel_dir.rsplit('/').next().is_some_and(is_builtin_excluded_dir) {
            return true;
        }
        self.gitignore.as_ref().is_some_and(|gi| {
            gi.matched_path_or_any_parents(rel_dir, true).is_ignore()
        })
    }
}
