//! Pattern validation and normalization.
//!
//! Every user pattern passes through [`normalize_pattern`] before it can be
//! compiled. Rejection happens before any traversal so a bad pattern set is
//! never partially applied.

use crate::IndexerError;

/// Maximum length of a single pattern, in characters.
pub const MAX_PATTERN_LEN: usize = 256;

/// Maximum number of `**` segments in a single pattern.
pub const MAX_GLOBSTARS: usize = 4;

/// Maximum number of patterns in one include or exclude list.
pub const MAX_PATTERNS_PER_LIST: usize = 64;

/// Maximum nesting depth of `{}` / `()` groups.
pub const MAX_GROUP_DEPTH: usize = 3;

/// Extglob operators with no glob equivalent.
const UNSUPPORTED_EXTGLOBS: &[&str] = &["!(", "+(", "*(", "?("];

/// Checks the size of a pattern list. `list` names it in the error.
pub fn check_list_len(list: &'static str, patterns: &[String]) -> Result<(), IndexerError> {
    if patterns.len() > MAX_PATTERNS_PER_LIST {
        return Err(IndexerError::TooManyPatterns {
            list,
            count: patterns.len(),
            limit: MAX_PATTERNS_PER_LIST,
        });
    }
    Ok(())
}

/// Validates one pattern and returns its normalized glob text.
///
/// Normalization turns backslashes into `/`, strips a leading `./`, and
/// rewrites `(a|b)` / `@(a|b)` groups into `{a,b}`. The result is what the
/// compiler sees and what the cache keys on.
pub fn normalize_pattern(raw: &str) -> Result<String, IndexerError> {
    let reject = |reason: &str| Err(IndexerError::invalid_pattern(raw, reason));

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return reject("empty pattern");
    }
    if trimmed.chars().count() > MAX_PATTERN_LEN {
        return reject("pattern exceeds 256 characters");
    }
    if trimmed.contains('\0') {
        return reject("NUL byte");
    }
    if trimmed.contains('`') {
        return reject("backtick");
    }
    if trimmed.contains("$(") || trimmed.contains("${") {
        return reject("shell substitution");
    }
    if trimmed.starts_with('/') || trimmed.starts_with('\\') {
        return reject("absolute pattern");
    }
    if has_drive_prefix(trimmed) {
        return reject("absolute pattern (drive prefix)");
    }
    if let Some(op) = UNSUPPORTED_EXTGLOBS.iter().find(|op| trimmed.contains(**op)) {
        return Err(IndexerError::invalid_pattern(
            raw,
            format!("unsupported extglob operator '{op}...)'"),
        ));
    }

    let mut text = trimmed.replace('\\', "/");
    while let Some(rest) = text.strip_prefix("./") {
        text = rest.to_string();
    }
    if text.is_empty() {
        return reject("empty pattern");
    }
    if text.split('/').any(|segment| segment == "..") {
        return reject("parent directory segment");
    }
    if text.matches("**").count() > MAX_GLOBSTARS {
        return reject("more than 4 '**' segments");
    }

    rewrite_groups(&text).map_err(|reason| IndexerError::invalid_pattern(raw, reason))
}

fn has_drive_prefix(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

/// Rewrites paren groups into brace alternation and checks `|` placement
/// and nesting depth.
fn rewrite_groups(pattern: &str) -> Result<String, &'static str> {
    let mut out = String::with_capacity(pattern.len());
    let mut stack: Vec<char> = Vec::new();
    let mut in_class = false;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if in_class {
            if c == ']' {
                in_class = false;
            }
            out.push(c);
            continue;
        }
        match c {
            '[' => {
                in_class = true;
                out.push(c);
            }
            '@' if chars.peek() == Some(&'(') => {}
            '(' | '{' => {
                stack.push(c);
                if stack.len() > MAX_GROUP_DEPTH {
                    return Err("groups nested deeper than 3");
                }
                out.push('{');
            }
            ')' => {
                if stack.pop() != Some('(') {
                    return Err("unbalanced ')'");
                }
                out.push('}');
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return Err("unbalanced '}'");
                }
                out.push('}');
            }
            '|' => {
                if stack.is_empty() {
                    return Err("'|' outside an alternation group");
                }
                out.push(',');
            }
            _ => out.push(c),
        }
    }

    if in_class {
        return Err("unterminated character class");
    }
    if !stack.is_empty() {
        return Err("unbalanced group");
    }
    Ok(out)
}
