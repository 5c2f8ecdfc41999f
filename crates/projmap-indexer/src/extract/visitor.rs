//! Top-level declaration visitor.
//!
//! Visits the statements of a program, including the declarations wrapped
//! by `export` and `declare`, and produces [`Declaration`] values. Nested
//! scopes are never entered.

use super::declaration::Declaration;
use super::syntax::{annotation, child_of_kind, field_text, has_token, text};
use crate::index::{
    ClassInfo, ConstantInfo, FunctionSignature, InitKind, MethodSignature, Parameter,
    PropertyInfo,
};
use std::collections::HashSet;
use tree_sitter::Node;

/// Name given to anonymous `export default` declarations.
const DEFAULT_EXPORT_NAME: &str = "default";

pub struct DeclarationVisitor<'s> {
    src: &'s str,
    declarations: Vec<Declaration>,
    /// Local names exported by `export { a }` or `export default a`
    exported_names: HashSet<String>,
}

impl<'s> DeclarationVisitor<'s> {
    pub fn new(src: &'s str) -> Self {
        Self {
            src,
            declarations: Vec::new(),
            exported_names: HashSet::new(),
        }
    }

    /// Visit every top-level statement and return the declarations in
    /// document order.
    pub fn visit_program(mut self, program: Node<'_>) -> Vec<Declaration> {
        let mut cursor = program.walk();
        for statement in program.named_children(&mut cursor) {
            match statement.kind() {
                "export_statement" => self.visit_export(statement),
                "ambient_declaration" => self.visit_ambient(statement, false),
                _ => self.visit_declaration(statement, false),
            }
        }

        let exported = std::mem::take(&mut self.exported_names);
        for decl in &mut self.declarations {
            if exported.contains(decl.name()) {
                decl.mark_exported();
            }
        }
        self.declarations
    }

    fn visit_export(&mut self, node: Node<'_>) {
        // Re-exports belong to the import pass.
        if node.child_by_field_name("source").is_some() {
            return;
        }

        if let Some(decl) = node.child_by_field_name("declaration") {
            if decl.kind() == "ambient_declaration" {
                self.visit_ambient(decl, true);
            } else {
                self.visit_declaration(decl, true);
            }
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            if has_token(node, "default") {
                self.visit_default_value(value);
            }
            return;
        }

        if let Some(clause) = child_of_kind(node, "export_clause") {
            let mut cursor = clause.walk();
            for spec in clause.named_children(&mut cursor) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                if let Some(name) = field_text(spec, "name", self.src) {
                    self.exported_names.insert(name.to_string());
                }
            }
        }
    }

    fn visit_default_value(&mut self, value: Node<'_>) {
        match value.kind() {
            "identifier" => {
                self.exported_names.insert(text(value, self.src).to_string());
            }
            "function_expression" | "function" | "generator_function" | "arrow_function" => {
                let mut function = self.function(value);
                function.is_exported = true;
                self.declarations.push(Declaration::Function(function));
            }
            "class" => {
                let mut class = self.class(value);
                class.is_exported = true;
                self.declarations.push(Declaration::Class(class));
            }
            _ => {}
        }
    }

    fn visit_ambient(&mut self, node: Node<'_>, exported: bool) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_declaration(child, exported);
        }
    }

    fn visit_declaration(&mut self, node: Node<'_>, exported: bool) {
        let start = self.declarations.len();

        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                let function = self.function(node);
                self.declarations.push(Declaration::Function(function));
            }
            "class_declaration" | "abstract_class_declaration" => {
                let class = self.class(node);
                self.declarations.push(Declaration::Class(class));
            }
            "lexical_declaration" => self.constants(node),
            _ => {}
        }

        if exported {
            for decl in &mut self.declarations[start..] {
                decl.mark_exported();
            }
        }
    }

    fn function(&self, node: Node<'_>) -> FunctionSignature {
        FunctionSignature {
            name: field_text(node, "name", self.src)
                .unwrap_or(DEFAULT_EXPORT_NAME)
                .to_string(),
            params: self.params(node),
            return_type: annotation(node.child_by_field_name("return_type"), self.src),
            is_async: has_token(node, "async"),
            is_generator: node.kind().starts_with("generator_function") || has_token(node, "*"),
            is_exported: false,
        }
    }

    fn class(&self, node: Node<'_>) -> ClassInfo {
        let mut class = ClassInfo {
            name: field_text(node, "name", self.src)
                .unwrap_or(DEFAULT_EXPORT_NAME)
                .to_string(),
            is_exported: false,
            is_abstract: node.kind() == "abstract_class_declaration" || has_token(node, "abstract"),
            super_class: None,
            implements: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
        };

        if let Some(heritage) = child_of_kind(node, "class_heritage") {
            self.heritage(heritage, &mut class);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.members(body, &mut class);
        }
        class
    }

    fn heritage(&self, heritage: Node<'_>, class: &mut ClassInfo) {
        let mut cursor = heritage.walk();
        for clause in heritage.named_children(&mut cursor) {
            match clause.kind() {
                "extends_clause" => {
                    class.super_class = field_text(clause, "value", self.src)
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty());
                }
                "implements_clause" => {
                    let mut inner = clause.walk();
                    class.implements.extend(
                        clause
                            .named_children(&mut inner)
                            .map(|t| text(t, self.src).trim().to_string()),
                    );
                }
                // Plain JavaScript puts the superclass expression directly
                // under the heritage node.
                _ if class.super_class.is_none() => {
                    class.super_class = Some(text(clause, self.src).trim().to_string());
                }
                _ => {}
            }
        }
    }

    fn members(&self, body: Node<'_>, class: &mut ClassInfo) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    let Some(name_node) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let mods = Modifiers::of(member);
                    class.methods.push(MethodSignature {
                        name: text(name_node, self.src).to_string(),
                        params: self.params(member),
                        return_type: annotation(member.child_by_field_name("return_type"), self.src),
                        is_async: mods.is_async,
                        is_generator: mods.is_generator,
                        is_static: mods.is_static,
                        is_private: mods.is_private || is_private_name(name_node),
                        is_protected: mods.is_protected,
                        is_abstract: mods.is_abstract
                            || member.kind() == "abstract_method_signature",
                    });
                }
                "public_field_definition" | "field_definition" => {
                    let name_node = member
                        .child_by_field_name("name")
                        .or_else(|| member.child_by_field_name("property"));
                    let Some(name_node) = name_node else {
                        continue;
                    };
                    let mods = Modifiers::of(member);
                    class.properties.push(PropertyInfo {
                        name: text(name_node, self.src).to_string(),
                        type_text: annotation(member.child_by_field_name("type"), self.src),
                        is_static: mods.is_static,
                        is_private: mods.is_private || is_private_name(name_node),
                        is_protected: mods.is_protected,
                        is_readonly: mods.is_readonly,
                    });
                }
                _ => {}
            }
        }
    }

    fn constants(&mut self, node: Node<'_>) {
        let is_const = {
            let mut cursor = node.walk();
            let first = node.children(&mut cursor).next();
            first.is_some_and(|c| c.kind() == "const")
        };
        if !is_const {
            return;
        }

        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            if name.kind() != "identifier" {
                continue;
            }
            self.declarations.push(Declaration::Constant(ConstantInfo {
                name: text(name, self.src).to_string(),
                type_text: annotation(declarator.child_by_field_name("type"), self.src),
                init_kind: init_kind(declarator.child_by_field_name("value")),
                is_exported: false,
            }));
        }
    }

    fn params(&self, node: Node<'_>) -> Vec<Parameter> {
        if let Some(single) = node.child_by_field_name("parameter") {
            return vec![Parameter {
                name: text(single, self.src).to_string(),
                type_text: None,
                optional: false,
                rest: false,
            }];
        }
        let Some(list) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            let parsed = match param.kind() {
                "required_parameter" | "optional_parameter" => {
                    let Some(pattern) = param.child_by_field_name("pattern") else {
                        continue;
                    };
                    let (name, rest) = self.pattern_name(pattern);
                    Parameter {
                        name,
                        type_text: annotation(param.child_by_field_name("type"), self.src),
                        optional: param.kind() == "optional_parameter"
                            || param.child_by_field_name("value").is_some(),
                        rest,
                    }
                }
                "identifier" | "rest_pattern" | "object_pattern" | "array_pattern" => {
                    let (name, rest) = self.pattern_name(param);
                    Parameter {
                        name,
                        type_text: None,
                        optional: false,
                        rest,
                    }
                }
                "assignment_pattern" => {
                    let Some(left) = param.child_by_field_name("left") else {
                        continue;
                    };
                    Parameter {
                        name: text(left, self.src).to_string(),
                        type_text: None,
                        optional: true,
                        rest: false,
                    }
                }
                _ => continue,
            };
            params.push(parsed);
        }
        params
    }

    /// Name of a parameter pattern; `...rest` yields the bare identifier.
    fn pattern_name(&self, pattern: Node<'_>) -> (String, bool) {
        if pattern.kind() == "rest_pattern" {
            let inner = pattern.named_child(0).map(|n| text(n, self.src));
            let name = inner.unwrap_or_else(|| text(pattern, self.src).trim_start_matches("..."));
            return (name.to_string(), true);
        }
        (text(pattern, self.src).to_string(), false)
    }
}

fn is_private_name(name: Node<'_>) -> bool {
    name.kind() == "private_property_identifier"
}

/// Modifier flags read from a member's direct children.
#[derive(Debug, Default)]
struct Modifiers {
    is_static: bool,
    is_private: bool,
    is_protected: bool,
    is_abstract: bool,
    is_readonly: bool,
    is_async: bool,
    is_generator: bool,
}

impl Modifiers {
    fn of(member: Node<'_>) -> Self {
        let mut mods = Modifiers::default();
        let mut cursor = member.walk();
        for child in member.children(&mut cursor) {
            match child.kind() {
                "accessibility_modifier" => {
                    let mut inner = child.walk();
                    for token in child.children(&mut inner) {
                        match token.kind() {
                            "private" => mods.is_private = true,
                            "protected" => mods.is_protected = true,
                            _ => {}
                        }
                    }
                }
                "static" => mods.is_static = true,
                "abstract" => mods.is_abstract = true,
                "readonly" => mods.is_readonly = true,
                "async" => mods.is_async = true,
                "*" => mods.is_generator = true,
                _ => {}
            }
        }
        mods
    }
}

/// Classify a constant's initializer.
pub fn init_kind(value: Option<Node<'_>>) -> InitKind {
    let Some(mut node) = value else {
        return InitKind::Unknown;
    };

    while matches!(
        node.kind(),
        "as_expression" | "satisfies_expression" | "parenthesized_expression"
    ) {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => return InitKind::Unknown,
        }
    }

    match node.kind() {
        "string" | "number" | "template_string" | "true" | "false" | "null" | "undefined"
        | "regex" => InitKind::Literal,
        "unary_expression" => {
            let signed = node
                .child_by_field_name("operator")
                .is_some_and(|op| matches!(op.kind(), "-" | "+"));
            let numeric = node
                .child_by_field_name("argument")
                .is_some_and(|arg| arg.kind() == "number");
            if signed && numeric {
                InitKind::Literal
            } else {
                InitKind::Unknown
            }
        }
        "arrow_function" | "function_expression" | "function" | "generator_function" => {
            InitKind::Function
        }
        "class" => InitKind::Class,
        "object" => InitKind::Object,
        "array" => InitKind::Array,
        _ => InitKind::Unknown,
    }
}
