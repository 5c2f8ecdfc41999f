//! Top-level declarations produced by the visitor.

use crate::index::{ClassInfo, ConstantInfo, FileRecord, FunctionSignature};

/// One extracted top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Function(FunctionSignature),
    Class(ClassInfo),
    Constant(ConstantInfo),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Class(c) => &c.name,
            Declaration::Constant(c) => &c.name,
        }
    }

    pub fn mark_exported(&mut self) {
        match self {
            Declaration::Function(f) => f.is_exported = true,
            Declaration::Class(c) => c.is_exported = true,
            Declaration::Constant(c) => c.is_exported = true,
        }
    }

    /// Move the declaration into the matching list of `record`.
    pub fn add_to(self, record: &mut FileRecord) {
        match self {
            Declaration::Function(f) => record.functions.push(f),
            Declaration::Class(c) => record.classes.push(c),
            Declaration::Constant(c) => record.constants.push(c),
        }
    }
}
