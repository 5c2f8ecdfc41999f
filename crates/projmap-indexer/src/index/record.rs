//! Per-file structural summary.
//!
//! Field names serialize in camelCase. Optional text (type annotations,
//! return types, superclass) is omitted when absent rather than written as
//! an empty string.

use serde::{Deserialize, Serialize};

/// The extracted summary of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Raw import/export/require/dynamic-import statements, in document order
    #[serde(default)]
    pub imports: Vec<ImportInfo>,

    /// Resolved in-project dependencies (sorted, unique)
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Top-level function signatures
    #[serde(default)]
    pub functions: Vec<FunctionSignature>,

    /// Top-level class definitions
    #[serde(default)]
    pub classes: Vec<ClassInfo>,

    /// Top-level `const` declarations
    #[serde(default)]
    pub constants: Vec<ConstantInfo>,
}

impl FileRecord {
    /// Whether nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.dependencies.is_empty()
            && self.functions.is_empty()
            && self.classes.is_empty()
            && self.constants.is_empty()
    }
}

/// Kind of module-reference statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// `import ... from "x"` or `import "x"`
    Import,
    /// `export ... from "x"`
    Export,
    /// `require("x")` or `import x = require("x")`
    Require,
    /// `import("x")`
    Dynamic,
}

/// One raw, unresolved module reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    /// Specifier exactly as written, without quotes
    pub source: String,

    /// Statement kind
    pub kind: ImportKind,

    /// Named bindings as exported by the target module
    #[serde(default)]
    pub names: Vec<String>,

    /// Has a default binding
    #[serde(default)]
    pub is_default: bool,

    /// Has a namespace binding (`* as ns`, `export *`)
    #[serde(default)]
    pub is_namespace: bool,

    /// `import type` / `export type`
    #[serde(default)]
    pub is_type_only: bool,
}

impl ImportInfo {
    /// Creates a reference with no bindings.
    pub fn new(source: impl Into<String>, kind: ImportKind) -> Self {
        Self {
            source: source.into(),
            kind,
            names: Vec::new(),
            is_default: false,
            is_namespace: false,
            is_type_only: false,
        }
    }
}

/// Relative specifiers are the only ones resolved against the project.
pub fn is_relative_specifier(spec: &str) -> bool {
    spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../")
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub rest: bool,
}

/// A top-level function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    pub name: String,

    #[serde(default)]
    pub params: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    #[serde(default)]
    pub is_async: bool,

    #[serde(default)]
    pub is_generator: bool,

    #[serde(default)]
    pub is_exported: bool,
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub name: String,

    #[serde(default)]
    pub is_exported: bool,

    #[serde(default)]
    pub is_abstract: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<String>,

    #[serde(default)]
    pub implements: Vec<String>,

    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodSignature>,

    /// Properties in declaration order
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
}

/// A class method. Modifier flags are independent of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSignature {
    pub name: String,

    #[serde(default)]
    pub params: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    #[serde(default)]
    pub is_async: bool,

    #[serde(default)]
    pub is_generator: bool,

    #[serde(default)]
    pub is_static: bool,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    pub is_protected: bool,

    #[serde(default)]
    pub is_abstract: bool,
}

/// A class property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,

    #[serde(default)]
    pub is_static: bool,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    pub is_protected: bool,

    #[serde(default)]
    pub is_readonly: bool,
}

/// Shape of a constant's initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitKind {
    Literal,
    Function,
    Class,
    Object,
    Array,
    #[default]
    Unknown,
}

/// A top-level `const` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantInfo {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,

    #[serde(default)]
    pub init_kind: InitKind,

    #[serde(default)]
    pub is_exported: bool,
}
