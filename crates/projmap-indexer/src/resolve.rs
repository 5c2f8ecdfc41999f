//! Dependency resolution for relative import specifiers.
//!
//! A specifier is resolved against the importing file's directory and then
//! matched against the known file set: first the exact path, then the path
//! plus each resolution extension, then `<path>/index` plus each extension.
//! Package specifiers and anything that escapes the project root are
//! dropped.

use crate::index::{is_relative_specifier, FileId, ImportInfo, KnownFiles};
use crate::scanner::{INDEX_FILE_STEM, RESOLUTION_EXTENSIONS};

/// Resolves specifiers against a read-only set of known files.
pub struct DependencyResolver<'a, K: KnownFiles + ?Sized> {
    known: &'a K,
}

impl<'a, K: KnownFiles + ?Sized> DependencyResolver<'a, K> {
    pub fn new(known: &'a K) -> Self {
        Self { known }
    }

    /// Sorted, unique in-project dependencies of `importer`.
    pub fn resolve(&self, importer: &str, imports: &[ImportInfo]) -> Vec<String> {
        self.resolve_ids(importer, imports)
            .into_iter()
            .map(|id| self.known.path_of(id).to_string())
            .collect()
    }

    /// Like [`resolve`](Self::resolve) but returns ids. Ids follow path
    /// order, so sorting them sorts the paths.
    pub fn resolve_ids(&self, importer: &str, imports: &[ImportInfo]) -> Vec<FileId> {
        let mut deps: Vec<FileId> = imports
            .iter()
            .filter_map(|import| self.resolve_specifier(importer, &import.source))
            .collect();
        deps.sort();
        deps.dedup();
        deps
    }

    /// Resolve one specifier written in `importer`.
    pub fn resolve_specifier(&self, importer: &str, specifier: &str) -> Option<FileId> {
        if !is_relative_specifier(specifier) {
            return None;
        }
        let base_dir = importer.rsplit_once('/').map_or("", |(dir, _)| dir);
        let target = normalize(base_dir, specifier)?;

        let found = candidates(&target).find_map(|candidate| self.known.lookup(&candidate));
        found
    }

    /// Resolve one specifier to a path.
    pub fn resolve_path(&self, importer: &str, specifier: &str) -> Option<&'a str> {
        let id = self.resolve_specifier(importer, specifier)?;
        Some(self.known.path_of(id))
    }
}

/// Join `specifier` onto `base_dir`, dropping `.` segments and applying
/// `..`. Returns `None` if the result would leave the project root.
pub fn normalize(base_dir: &str, specifier: &str) -> Option<String> {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(part),
        }
    }
    Some(segments.join("/"))
}

/// Candidate paths in priority order.
fn candidates(target: &str) -> impl Iterator<Item = String> + '_ {
    let direct = (!target.is_empty()).then(|| {
        std::iter::once(target.to_string())
            .chain(RESOLUTION_EXTENSIONS.iter().map(move |ext| format!("{target}{ext}")))
    });

    let index_base = if target.is_empty() {
        INDEX_FILE_STEM.to_string()
    } else {
        format!("{target}/{INDEX_FILE_STEM}")
    };
    let index = RESOLUTION_EXTENSIONS
        .iter()
        .map(move |ext| format!("{index_base}{ext}"));

    direct.into_iter().flatten().chain(index)
}
