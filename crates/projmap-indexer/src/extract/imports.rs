//! Module references: import/export statements plus `require()` and
//! `import()` calls anywhere in the file.

use super::syntax::{child_of_kind, has_token, string_value, text};
use crate::index::{ImportInfo, ImportKind};
use tree_sitter::Node;

/// All module references in document order.
pub fn collect_imports(program: Node<'_>, src: &str) -> Vec<ImportInfo> {
    let mut found: Vec<(usize, ImportInfo)> = Vec::new();

    let mut cursor = program.walk();
    for statement in program.named_children(&mut cursor) {
        let info = match statement.kind() {
            "import_statement" => import_statement(statement, src),
            "export_statement" => re_export(statement, src),
            _ => None,
        };
        if let Some(info) = info {
            found.push((statement.start_byte(), info));
        }
    }

    collect_calls(program, src, &mut found);

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, info)| info).collect()
}

fn import_statement(node: Node<'_>, src: &str) -> Option<ImportInfo> {
    if let Some(require) = child_of_kind(node, "import_require_clause") {
        let source = require.child_by_field_name("source")?;
        let mut info = ImportInfo::new(string_value(source, src), ImportKind::Require);
        info.is_default = true;
        info.is_type_only = has_token(node, "type");
        return Some(info);
    }

    let source = node.child_by_field_name("source")?;
    let mut info = ImportInfo::new(string_value(source, src), ImportKind::Import);
    info.is_type_only = has_token(node, "type");

    if let Some(clause) = child_of_kind(node, "import_clause") {
        let mut cursor = clause.walk();
        for part in clause.named_children(&mut cursor) {
            match part.kind() {
                "identifier" => info.is_default = true,
                "namespace_import" => info.is_namespace = true,
                "named_imports" => add_specifiers(part, "import_specifier", src, &mut info),
                _ => {}
            }
        }
    }
    Some(info)
}

fn re_export(node: Node<'_>, src: &str) -> Option<ImportInfo> {
    let source = node.child_by_field_name("source")?;
    let mut info = ImportInfo::new(string_value(source, src), ImportKind::Export);
    info.is_type_only = has_token(node, "type");

    if let Some(clause) = child_of_kind(node, "export_clause") {
        add_specifiers(clause, "export_specifier", src, &mut info);
    } else {
        // `export * from` and `export * as ns from`
        info.is_namespace = true;
    }
    Some(info)
}

/// Record the target-side names of `{ a, b as c, default as d }`.
fn add_specifiers(list: Node<'_>, kind: &str, src: &str, info: &mut ImportInfo) {
    let mut cursor = list.walk();
    for spec in list.named_children(&mut cursor) {
        if spec.kind() != kind {
            continue;
        }
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        let name = if name.kind() == "string" {
            string_value(name, src)
        } else {
            text(name, src).to_string()
        };
        if name == "default" {
            info.is_default = true;
        } else {
            info.names.push(name);
        }
    }
}

/// Walk the whole tree for `require("x")` and `import("x")` with a literal
/// string argument.
fn collect_calls(root: Node<'_>, src: &str, found: &mut Vec<(usize, ImportInfo)>) {
    let mut cursor = root.walk();
    let mut visited_children = false;

    loop {
        let node = cursor.node();
        if !visited_children && node.kind() == "call_expression" {
            if let Some(info) = call_reference(node, src) {
                found.push((node.start_byte(), info));
            }
        }

        if !visited_children && cursor.goto_first_child() {
            continue;
        }
        if cursor.goto_next_sibling() {
            visited_children = false;
            continue;
        }
        if !cursor.goto_parent() {
            break;
        }
        visited_children = true;
    }
}

fn call_reference(call: Node<'_>, src: &str) -> Option<ImportInfo> {
    let function = call.child_by_field_name("function")?;
    let kind = match function.kind() {
        "import" => ImportKind::Dynamic,
        "identifier" if text(function, src) == "require" => ImportKind::Require,
        _ => return None,
    };

    let args = call.child_by_field_name("arguments")?;
    let first = args.named_child(0)?;
    if first.kind() != "string" {
        return None;
    }
    Some(ImportInfo::new(string_value(first, src), kind))
}
