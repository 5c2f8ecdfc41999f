//! Sequential file system walker.

use crate::patterns::IgnoreRules;
use crate::IndexWarning;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Files found under a root, before include/exclude evaluation.
#[derive(Debug, Default)]
pub struct WalkOutput {
    /// Relative, `/`-separated, sorted paths of regular files
    pub files: Vec<String>,
    /// Entries that could not be visited
    pub errors: Vec<IndexWarning>,
}

/// Walks a project root without following symlinks, pruning ignored
/// directories as it goes.
pub struct Walker {
    root: PathBuf,
    rules: IgnoreRules,
}

impl Walker {
    /// Create a new walker for the given root directory.
    pub fn new(root: &Path, rules: IgnoreRules) -> Self {
        Self {
            root: root.to_path_buf(),
            rules,
        }
    }

    /// Walk the directory tree and return all regular files.
    pub fn walk(&self) -> WalkOutput {
        let prune_root = self.root.clone();
        let prune_rules = self.rules.clone();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                if !entry.file_type().is_some_and(|ft| ft.is_dir()) || entry.depth() == 0 {
                    return true;
                }
                match relative_path(&prune_root, entry.path()) {
                    Some(rel) => !prune_rules.is_dir_ignored(&rel),
                    None => true,
                }
            })
            .build();

        let mut output = WalkOutput::default();
        for result in walker {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }
                    match relative_path(&self.root, entry.path()) {
                        Some(rel) => output.files.push(rel),
                        None => output.errors.push(IndexWarning::WalkFailed {
                            path: entry.path().to_string_lossy().into_owned(),
                            message: "path is not valid UTF-8".to_string(),
                        }),
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Walk error");
                    output.errors.push(walk_warning(&self.root, &e));
                }
            }
        }

        // Sort by path for deterministic ordering
        output.files.sort();
        output.files.dedup();
        output
    }
}

fn walk_warning(root: &Path, err: &ignore::Error) -> IndexWarning {
    let path = match err {
        ignore::Error::WithPath { path, .. } => {
            relative_path(root, path).unwrap_or_else(|| path.to_string_lossy().into_owned())
        }
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            return walk_warning(root, err);
        }
        _ => String::new(),
    };
    IndexWarning::WalkFailed {
        path,
        message: err.to_string(),
    }
}

/// `path` relative to `root`, `/`-separated. `None` when `path` is not under
/// `root`, equals it, or is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
