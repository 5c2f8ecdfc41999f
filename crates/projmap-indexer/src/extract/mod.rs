//! Signature extraction with tree-sitter.
//!
//! Turns the text of one file into a [`FileRecord`] holding its module
//! references and top-level declarations. Extraction depends only on the
//! path's extension and the text; it never touches the file system.

mod declaration;
mod imports;
mod syntax;
mod visitor;

pub use declaration::Declaration;
pub use visitor::init_kind;

use crate::index::FileRecord;
use crate::scanner::{detect_dialect, Dialect};
use crate::IndexWarning;
use std::path::Path;
use tracing::debug;
use visitor::DeclarationVisitor;

/// Record plus an optional warning for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub record: FileRecord,
    pub warning: Option<IndexWarning>,
}

impl Extraction {
    fn failed(path: &str, message: impl Into<String>) -> Self {
        Self {
            record: FileRecord::default(),
            warning: Some(IndexWarning::ParseFailed {
                path: path.to_string(),
                message: message.into(),
            }),
        }
    }
}

/// Stateless extractor. A tree-sitter parser is created per call, so one
/// extractor can be shared across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the record of the file at project-relative `path`.
    ///
    /// Malformed source yields an empty record and a `ParseFailed` warning.
    /// `dependencies` is left empty for the resolver to fill.
    pub fn extract(&self, path: &str, source: &str) -> Extraction {
        let dialect = detect_dialect(Path::new(path)).unwrap_or(Dialect::Tsx);

        let mut parser = tree_sitter::Parser::new();
        if let Err(e) = parser.set_language(&dialect.grammar()) {
            return Extraction::failed(path, format!("Failed to set language: {e}"));
        }

        let Some(tree) = parser.parse(source, None) else {
            return Extraction::failed(path, "Failed to parse content");
        };
        let root = tree.root_node();

        if root.has_error() {
            let message = match syntax::first_error(root) {
                Some((row, col)) => format!("syntax error at {row}:{col}"),
                None => "syntax error".to_string(),
            };
            debug!(path, %message, "Malformed source");
            return Extraction::failed(path, message);
        }

        let mut record = FileRecord {
            imports: imports::collect_imports(root, source),
            ..Default::default()
        };
        for decl in DeclarationVisitor::new(source).visit_program(root) {
            decl.add_to(&mut record);
        }

        debug!(
            path,
            dialect = dialect.name(),
            imports = record.imports.len(),
            functions = record.functions.len(),
            classes = record.classes.len(),
            constants = record.constants.len(),
            "Extracted file"
        );

        Extraction {
            record,
            warning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ImportKind, InitKind};

    fn extract(path: &str, source: &str) -> FileRecord {
        let result = Extractor::new().extract(path, source);
        assert_eq!(result.warning, None, "unexpected warning for {path}");
        result.record
    }

    #[test]
    fn test_import_forms() {
        let record = extract(
            "a.ts",
            r#"
import React from "react";
import { a, b as c } from './b';
import * as ns from "../ns";
import type { T } from './types';
import './side-effect';
import fs = require("fs");
export { x } from './x';
export * from './all';
const lazy = () => import('./lazy');
const cjs = require('./cjs');
"#,
        );

        let sources: Vec<&str> = record.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "react",
                "./b",
                "../ns",
                "./types",
                "./side-effect",
                "fs",
                "./x",
                "./all",
                "./lazy",
                "./cjs"
            ]
        );

        let imports = &record.imports;
        assert!(imports[0].is_default);
        assert_eq!(imports[1].names, vec!["a", "b"]);
        assert!(imports[2].is_namespace);
        assert!(imports[3].is_type_only);
        assert_eq!(imports[5].kind, ImportKind::Require);
        assert_eq!(imports[6].kind, ImportKind::Export);
        assert_eq!(imports[6].names, vec!["x"]);
        assert!(imports[7].is_namespace);
        assert_eq!(imports[8].kind, ImportKind::Dynamic);
        assert_eq!(imports[9].kind, ImportKind::Require);
    }

    #[test]
    fn test_non_literal_calls_are_ignored() {
        let record = extract("a.js", "const m = require(name);\nimport(`./x/${y}`);\n");
        assert!(record.imports.is_empty());
    }

    #[test]
    fn test_function_signatures() {
        let record = extract(
            "f.ts",
            r#"
export async function load(path: string, opts?: Options, retries = 3, ...rest: string[]): Promise<Data> {
  return null as any;
}
function* gen() {}
function plain(a, b) {}
"#,
        );

        assert_eq!(record.functions.len(), 3);
        let load = &record.functions[0];
        assert_eq!(load.name, "load");
        assert!(load.is_async);
        assert!(load.is_exported);
        assert_eq!(load.return_type.as_deref(), Some("Promise<Data>"));

        let params: Vec<(&str, Option<&str>, bool, bool)> = load
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.type_text.as_deref(), p.optional, p.rest))
            .collect();
        assert_eq!(
            params,
            vec![
                ("path", Some("string"), false, false),
                ("opts", Some("Options"), true, false),
                ("retries", None, true, false),
                ("rest", Some("string[]"), false, true),
            ]
        );

        assert!(record.functions[1].is_generator);
        assert!(!record.functions[1].is_exported);
        assert_eq!(record.functions[2].params.len(), 2);
        assert_eq!(record.functions[2].return_type, None);
    }

    #[test]
    fn test_class_members() {
        let record = extract(
            "c.ts",
            r#"
export abstract class Repo<T> extends Base implements Store, Disposable {
  private readonly items: T[] = [];
  static count = 0;
  #secret: string;
  protected name?: string;

  constructor(private db: Db) { super(); }
  static async create(): Promise<Repo<any>> { return null as any; }
  abstract find(id: string): T;
  #hidden() {}
  *entries() {}
}
"#,
        );

        assert_eq!(record.classes.len(), 1);
        let class = &record.classes[0];
        assert_eq!(class.name, "Repo");
        assert!(class.is_exported);
        assert!(class.is_abstract);
        assert_eq!(class.super_class.as_deref(), Some("Base"));
        assert_eq!(class.implements, vec!["Store", "Disposable"]);

        let props: Vec<&str> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, vec!["items", "count", "#secret", "name"]);
        assert!(class.properties[0].is_private && class.properties[0].is_readonly);
        assert_eq!(class.properties[0].type_text.as_deref(), Some("T[]"));
        assert!(class.properties[1].is_static);
        assert!(class.properties[2].is_private);
        assert!(class.properties[3].is_protected);

        let methods: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["constructor", "create", "find", "#hidden", "entries"]);
        assert!(class.methods[1].is_static && class.methods[1].is_async);
        assert!(class.methods[2].is_abstract);
        assert_eq!(class.methods[2].return_type.as_deref(), Some("T"));
        assert!(class.methods[3].is_private);
        assert!(class.methods[4].is_generator);
    }

    #[test]
    fn test_constants_and_init_kinds() {
        let record = extract(
            "k.ts",
            r#"
export const A = 1;
const B: string = "b";
const C = -5;
const D = () => 1;
const E = class {};
const F = { a: 1 } as const;
const G = [1, 2] satisfies number[];
const H = (null);
const I = compute();
const { J } = obj;
let K = 1;
var L = 2;
"#,
        );

        let kinds: Vec<(&str, InitKind)> = record
            .constants
            .iter()
            .map(|c| (c.name.as_str(), c.init_kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("A", InitKind::Literal),
                ("B", InitKind::Literal),
                ("C", InitKind::Literal),
                ("D", InitKind::Function),
                ("E", InitKind::Class),
                ("F", InitKind::Object),
                ("G", InitKind::Array),
                ("H", InitKind::Literal),
                ("I", InitKind::Unknown),
            ]
        );
        assert!(record.constants[0].is_exported);
        assert_eq!(record.constants[1].type_text.as_deref(), Some("string"));
        assert!(record.functions.is_empty());
    }

    #[test]
    fn test_export_lists_mark_local_declarations() {
        let record = extract(
            "e.js",
            r#"
function helper() {}
class Widget {}
const VALUE = 1;
export { helper, VALUE as value };
export default Widget;
"#,
        );
        assert!(record.functions[0].is_exported);
        assert!(record.classes[0].is_exported);
        assert!(record.constants[0].is_exported);
    }

    #[test]
    fn test_anonymous_default_export() {
        let record = extract("d.ts", "export default function (x: number) { return x; }\n");
        assert_eq!(record.functions.len(), 1);
        assert_eq!(record.functions[0].name, "default");
        assert!(record.functions[0].is_exported);

        let record = extract("d2.ts", "export default class {}\n");
        assert_eq!(record.classes[0].name, "default");
    }

    #[test]
    fn test_declare_forms() {
        let record = extract(
            "types.d.ts",
            "declare function ext(a: number): void;\nexport declare const VERSION: string;\n",
        );
        assert_eq!(record.functions[0].name, "ext");
        assert_eq!(record.functions[0].return_type.as_deref(), Some("void"));
        assert_eq!(record.constants[0].name, "VERSION");
        assert_eq!(record.constants[0].init_kind, InitKind::Unknown);
        assert!(record.constants[0].is_exported);
    }

    #[test]
    fn test_jsx_in_js_file() {
        let record = extract(
            "App.jsx",
            "import React from 'react';\nexport function App() { return <div>hi</div>; }\n",
        );
        assert_eq!(record.functions[0].name, "App");
    }

    #[test]
    fn test_malformed_source() {
        let result = Extractor::new().extract("bad.ts", "export function (((\n");
        assert!(result.record.is_empty());
        match result.warning {
            Some(IndexWarning::ParseFailed { path, message }) => {
                assert_eq!(path, "bad.ts");
                assert!(message.starts_with("syntax error"));
            }
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_extraction_is_pure() {
        let source = "import { a } from './a';\nexport const b = a;\n";
        let first = Extractor::new().extract("x.ts", source);
        let second = Extractor::new().extract("x.ts", source);
        assert_eq!(first, second);
    }
}
