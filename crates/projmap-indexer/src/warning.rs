//! Non-fatal conditions reported alongside a successful scan or update.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A problem that did not stop the run.
///
/// Per-file variants always name the file they concern so the caller can
/// attribute them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IndexWarning {
    /// Source could not be parsed; the file was indexed with an empty record
    #[error("{path}: parse failed: {message}")]
    ParseFailed { path: String, message: String },

    /// Source could not be read (permissions, invalid UTF-8, ...)
    #[error("{path}: read failed: {message}")]
    ReadFailed { path: String, message: String },

    /// Source exceeded the configured size limit and was not parsed
    #[error("{path}: {size} bytes exceeds the {limit} byte limit, not parsed")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    /// Include patterns were given but no supported file matched them
    #[error("include patterns matched no files: {patterns:?}")]
    IncludeMatchedNothing { patterns: Vec<String> },

    /// Files matched the include rules but exclusions removed all of them
    #[error("exclusions removed all {included} included files")]
    ExclusionRemovedAll { included: usize },

    /// A directory entry could not be visited during discovery
    #[error("{path}: walk failed: {message}")]
    WalkFailed { path: String, message: String },
}

impl IndexWarning {
    /// The file a per-file warning is attributed to.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::ParseFailed { path, .. }
            | Self::ReadFailed { path, .. }
            | Self::FileTooLarge { path, .. }
            | Self::WalkFailed { path, .. } => Some(path),
            Self::IncludeMatchedNothing { .. } | Self::ExclusionRemovedAll { .. } => None,
        }
    }

    /// Pattern-effectiveness warnings (advisory unless strict mode is on).
    pub fn is_pattern_warning(&self) -> bool {
        matches!(
            self,
            Self::IncludeMatchedNothing { .. } | Self::ExclusionRemovedAll { .. }
        )
    }
}
