//! projmap indexer
//!
//! This crate provides the indexing engine for projmap, including:
//! - File discovery with validated, cached include/exclude patterns
//! - Signature extraction from TypeScript/JavaScript via tree-sitter
//! - Relative import resolution into dependency edges
//! - Directory tree construction
//! - Full scans on a rayon worker pool and single-file incremental updates
//! - Persistence of the index as JSON

pub mod config;
mod error;
pub mod extract;
pub mod index;
pub mod maintainer;
pub mod patterns;
pub mod progress;
pub mod resolve;
pub mod scanner;
pub mod storage;
pub mod tree;
mod warning;

pub use config::IndexerConfig;
pub use error::IndexerError;
pub use extract::{Declaration, Extraction, Extractor};
pub use index::{
    ClassInfo, ConstantInfo, Edge, FileRecord, FilterOptions, FunctionSignature, ImportInfo,
    ImportKind, IndexMetadata, InitKind, InvariantViolation, MethodSignature, Parameter,
    ProjectIndex, PropertyInfo, SCHEMA_VERSION,
};
pub use maintainer::{IndexMaintainer, ScanOutcome, UpdateAction, UpdateOutcome};
pub use patterns::{CacheStats, Membership, PathFilter, PatternCache};
pub use progress::{ProgressEvent, ProgressSink};
pub use resolve::DependencyResolver;
pub use scanner::{Discovery, Scanner};
pub use storage::IndexStore;
pub use tree::{NodeKind, TreeBuilder, TreeNode};
pub use warning::IndexWarning;
