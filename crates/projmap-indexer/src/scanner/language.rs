//! Language detection for source files.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions the indexer treats as source files.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Extensions tried, in order, when an import specifier has none.
pub const RESOLUTION_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs",
];

/// Directory index file stems tried after the direct-file candidates.
pub const INDEX_FILE_STEM: &str = "index";

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`). Angle-bracket casts allowed.
    TypeScript,
    /// TypeScript with JSX. Also used for every JavaScript flavor so that
    /// JSX in `.js` files parses.
    Tsx,
}

impl Dialect {
    /// Get the display name for this dialect.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::TypeScript => "TypeScript",
            Dialect::Tsx => "TSX",
        }
    }

    /// Tree-sitter grammar for this dialect.
    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Detect the dialect of a file based on its extension.
pub fn detect_dialect(path: &Path) -> Option<Dialect> {
    let ext = path.extension()?.to_str()?.to_lowercase();

    match ext.as_str() {
        "ts" | "mts" | "cts" => Some(Dialect::TypeScript),
        "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Dialect::Tsx),
        _ => None,
    }
}

/// Whether a project-relative path has a supported extension.
pub fn is_supported(path: &str) -> bool {
    detect_dialect(Path::new(path)).is_some()
}
