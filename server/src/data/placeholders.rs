//! Named placeholder expansion
//!
//! Queries carry `:name` placeholders. Drivers only understand positional
//! ones, so each occurrence is replaced by the dialect's placeholder and its
//! value appended to the positional list in the same order.

use super::error::DataError;
use super::params::{BoundParams, BoundValue};
use super::sql::SqlDialect;

/// Query text with positional placeholders and the values to bind, in order
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedQuery {
    pub sql: String,
    pub values: Vec<BoundValue>,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte length of the quoted literal or comment opening at the start of `rest`.
///
/// Covers `'...'`, `"..."`, `-- ...` up to and including the newline, and
/// `/* ... */`. Unterminated ones run to the end of the text.
pub(crate) fn opaque_span(rest: &str) -> Option<usize> {
    if let Some(q) = rest.chars().next().filter(|c| matches!(c, '\'' | '"')) {
        return Some(rest[1..].find(q).map_or(rest.len(), |end| end + 2));
    }
    if rest.starts_with("--") {
        return Some(rest.find('\n').map_or(rest.len(), |end| end + 1));
    }
    if rest.starts_with("/*") {
        return Some(rest[2..].find("*/").map_or(rest.len(), |end| end + 4));
    }
    None
}

/// Replace every `:name` outside literals and comments with a positional placeholder.
///
/// `::` casts are left untouched. A placeholder whose name is not in `params`
/// fails with [`DataError::UnboundParameter`].
pub fn expand_named(
    sql: &str,
    params: &BoundParams,
    dialect: &dyn SqlDialect,
) -> Result<ExpandedQuery, DataError> {
    expand_named_with(sql, params, |index, _| dialect.placeholder(index))
}

/// Like [`expand_named`], with `render` producing the text of each placeholder
/// from its 1-based position and value.
pub fn expand_named_with(
    sql: &str,
    params: &BoundParams,
    mut render: impl FnMut(usize, &BoundValue) -> String,
) -> Result<ExpandedQuery, DataError> {
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut i = 0;

    while let Some(c) = sql[i..].chars().next() {
        let rest = &sql[i..];
        if let Some(len) = opaque_span(rest) {
            out.push_str(&rest[..len]);
            i += len;
            continue;
        }

        if c == ':' {
            let after = &rest[1..];
            if after.starts_with(':') {
                out.push_str("::");
                i += 2;
                continue;
            }
            if after.starts_with(is_name_start) {
                let len = after.find(|ch: char| !is_name_char(ch)).unwrap_or(after.len());
                let name = &after[..len];
                let value = params.get(name).ok_or_else(|| DataError::unbound(name))?;
                values.push(value.clone());
                out.push_str(&render(values.len(), value));
                i += 1 + len;
                continue;
            }
        }

        out.push(c);
        i += c.len_utf8();
    }

    Ok(ExpandedQuery { sql: out, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sql::{PostgresDialect, SqliteDialect};

    fn params(pairs: &[(&str, &str)]) -> BoundParams {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_expand_sqlite() {
        let p = params(&[("id", "7"), ("filterValue", "%ann%")]);
        let expanded = expand_named(
            "SELECT * FROM t WHERE id = :id AND name LIKE :filterValue",
            &p,
            &SqliteDialect,
        )
        .unwrap();

        assert_eq!(
            expanded.sql,
            "SELECT * FROM t WHERE id = ? AND name LIKE ?"
        );
        assert_eq!(
            expanded.values,
            vec![BoundValue::Text("7".into()), BoundValue::Text("%ann%".into())]
        );
    }

    #[test]
    fn test_expand_postgres_numbers_in_order() {
        let p = params(&[("filterValueA", "1"), ("filterValueB", "9")]);
        let expanded = expand_named(
            "SELECT * FROM t WHERE a BETWEEN :filterValueA AND :filterValueB",
            &p,
            &PostgresDialect,
        )
        .unwrap();

        assert_eq!(expanded.sql, "SELECT * FROM t WHERE a BETWEEN $1 AND $2");
    }

    #[test]
    fn test_repeated_name_binds_each_occurrence() {
        let p = params(&[("q", "x")]);
        let expanded =
            expand_named("SELECT * FROM t WHERE a = :q OR b = :q", &p, &SqliteDialect).unwrap();

        assert_eq!(expanded.sql, "SELECT * FROM t WHERE a = ? OR b = ?");
        assert_eq!(expanded.values.len(), 2);
    }

    #[test]
    fn test_casts_and_literals_untouched() {
        let p = params(&[("id", "1")]);
        let expanded = expand_named(
            "SELECT created::date, ':not' AS s, \":also\" FROM t WHERE id = :id",
            &p,
            &PostgresDialect,
        )
        .unwrap();

        assert_eq!(
            expanded.sql,
            "SELECT created::date, ':not' AS s, \":also\" FROM t WHERE id = $1"
        );
        assert_eq!(expanded.values.len(), 1);
    }

    #[test]
    fn test_unbound_placeholder_fails() {
        let err = expand_named("SELECT :missing", &BoundParams::new(), &SqliteDialect).unwrap_err();
        assert!(matches!(err, DataError::UnboundParameter { name } if name == "missing"));
    }

    #[test]
    fn test_lone_colon_kept() {
        let expanded = expand_named("SELECT 1 : 2", &BoundParams::new(), &SqliteDialect).unwrap();
        assert_eq!(expanded.sql, "SELECT 1 : 2");
    }

    #[test]
    fn test_comments_do_not_open_literals() {
        let p = params(&[("id", "1"), ("name", "ann")]);
        let expanded = expand_named(
            "SELECT * FROM t -- don't list :deleted\nWHERE id = :id /* it's :x */ AND name = :name",
            &p,
            &PostgresDialect,
        )
        .unwrap();

        assert_eq!(
            expanded.sql,
            "SELECT * FROM t -- don't list :deleted\nWHERE id = $1 /* it's :x */ AND name = $2"
        );
        assert_eq!(expanded.values.len(), 2);
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        let expanded =
            expand_named("SELECT 1 /* :gone", &BoundParams::new(), &SqliteDialect).unwrap();
        assert_eq!(expanded.sql, "SELECT 1 /* :gone");
        assert!(expanded.values.is_empty());
    }

    #[test]
    fn test_expand_with_renders_each_position() {
        let p: BoundParams = [("a", BoundValue::Int(3)), ("b", BoundValue::from("x"))]
            .into_iter()
            .collect();
        let expanded = expand_named_with("SELECT :a, :b, :a", &p, |index, value| match value {
            BoundValue::Int(_) => format!("${}::int8", index),
            _ => format!("${}", index),
        })
        .unwrap();

        assert_eq!(expanded.sql, "SELECT $1::int8, $2, $3::int8");
        assert_eq!(expanded.values.len(), 3);
    }
}
