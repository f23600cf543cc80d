//! Named-parameter parser
//!
//! Operation templates reference request values as `{name}`. Parsing rewrites
//! each reference to the named placeholder `:name` and binds the request
//! value under that name. Text inside quoted literals is left alone.

use super::params::{BoundParams, BoundValue};
use super::request::RequestParams;
use crate::data::placeholders::opaque_span;

/// Query with named placeholders and the values bound to them
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub query: String,
    pub params: BoundParams,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scan `sql` for `{name}` references outside literals and comments.
///
/// Calls `on_ref` with each name and returns the text with every reference
/// rewritten to `:name`.
fn scan_refs(sql: &str, mut on_ref: impl FnMut(&str)) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;

    while let Some(c) = sql[i..].chars().next() {
        let rest = &sql[i..];
        if let Some(len) = opaque_span(rest) {
            out.push_str(&rest[..len]);
            i += len;
            continue;
        }

        if c == '{' {
            let inner = &rest[1..];
            let name_len = inner.find(|ch: char| !is_name_char(ch)).unwrap_or(inner.len());
            if name_len > 0 && inner[name_len..].starts_with('}') {
                let name = &inner[..name_len];
                on_ref(name);
                out.push(':');
                out.push_str(name);
                i += name_len + 2;
                continue;
            }
        }

        out.push(c);
        i += c.len_utf8();
    }

    out
}

/// Names referenced as `{name}` in `sql`, in first-seen order
pub fn referenced_names(sql: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    scan_refs(sql, |name| {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    });
    names
}

/// Rewrite `{name}` references and bind their request values.
///
/// Absent request values bind as NULL.
pub fn parse(sql: &str, request: &RequestParams) -> ParsedQuery {
    let mut params = BoundParams::new();
    let query = scan_refs(sql, |name| {
        if !params.contains(name) {
            let value = request
                .get(name)
                .map(BoundValue::from_json)
                .unwrap_or(BoundValue::Null);
            params.insert(name, value);
        }
    });

    ParsedQuery { query, params }
}
