//! Source-module generation.
//!
//! Renders a JSON value as an ES module literal bound to a named export:
//!
//! ```text
//! export const projects = [
//!   {
//!     id: 1,
//!     title: 'A'
//!   }
//! ];
//! ```
//!
//! Output depends only on the value, so equal values always produce the same
//! bytes and commits diff cleanly.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use super::document::{Document, DocumentKind, ProjectList, SiteConfig};
use super::error::{ContentError, ContentResult};

const INDENT: &str = "  ";

/// Render `value` as `export const <name> = <literal>;\n`.
pub fn render_module(export_name: &str, value: &Value) -> String {
    let mut out = format!("export const {} = ", export_name);
    write_literal(&mut out, value, 0);
    out.push_str(";\n");
    out
}

fn write_literal(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, depth + 1);
                write_literal(out, item, depth + 1);
            }
            out.push('\n');
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, depth + 1);
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    write_string(out, key);
                }
                out.push_str(": ");
                write_literal(out, item, depth + 1);
            }
            out.push('\n');
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Single-quoted string literal.
fn write_string(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Line terminators inside string literals break older parsers.
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
}

/// Keys that can be written without quotes.
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Regenerate `<root>/data/*.js` from `<root>/content/*.json`.
///
/// Missing JSON files are skipped. Returns the documents that were written.
pub fn regenerate_local(root: &Path) -> ContentResult<Vec<DocumentKind>> {
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).map_err(|source| ContentError::Io {
        path: data_dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::new();
    if regenerate_one::<ProjectList>(root)? {
        written.push(DocumentKind::Projects);
    }
    if regenerate_one::<SiteConfig>(root)? {
        written.push(DocumentKind::SiteConfig);
    }
    Ok(written)
}

fn regenerate_one<D: Document>(root: &Path) -> ContentResult<bool> {
    let json_path = root.join(D::KIND.json_path());
    if !json_path.exists() {
        warn!(path = %json_path.display(), "JSON file not found, skipping");
        return Ok(false);
    }

    let text = fs::read_to_string(&json_path).map_err(|source| ContentError::Io {
        path: json_path.display().to_string(),
        source,
    })?;
    let document = D::from_json(&text).map_err(|source| ContentError::MalformedContent {
        path: D::KIND.json_path().to_string(),
        source,
    })?;

    let module_path = root.join(D::KIND.module_path());
    fs::write(&module_path, document.to_module()?).map_err(|source| ContentError::Io {
        path: module_path.display().to_string(),
        source,
    })?;

    info!(
        from = D::KIND.json_path(),
        to = D::KIND.module_path(),
        "regenerated module"
    );
    Ok(true)
}
