//! Backend-specific SQL syntax

/// Whether text appended to `sql` could land in a `--` comment on its last line
fn ends_in_line_comment(sql: &str) -> bool {
    sql.lines().last().is_some_and(|line| line.contains("--"))
}

/// Placeholder and paging syntax of one backend
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Paging clause appended by [`SqlDialect::modify_limit_query`]
    fn limit_offset(&self, limit: i64, offset: i64) -> String {
        format!("LIMIT {} OFFSET {}", limit, offset)
    }

    /// Restrict `sql` to `limit` rows starting at `offset`
    fn modify_limit_query(&self, sql: &str, limit: i64, offset: i64) -> String {
        let sql = sql.trim_end();
        let sep = if ends_in_line_comment(sql) { "\n" } else { " " };
        format!("{}{}{}", sql, sep, self.limit_offset(limit, offset))
    }

    /// Wrap `sql` so it yields a single row holding its row count
    fn count_query(&self, sql: &str) -> String {
        let sql = sql.trim_end();
        let close = if ends_in_line_comment(sql) { "\n" } else { "" };
        format!("SELECT COUNT(*) FROM ({}{}) AS res", sql, close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sql::SqliteDialect;

    #[test]
    fn test_trailing_line_comment_keeps_appended_clauses() {
        let sql = "SELECT * FROM t -- newest first";
        assert_eq!(
            SqliteDialect.modify_limit_query(sql, 5, 0),
            "SELECT * FROM t -- newest first\nLIMIT 5 OFFSET 0"
        );
        assert_eq!(
            SqliteDialect.count_query(sql),
            "SELECT COUNT(*) FROM (SELECT * FROM t -- newest first\n) AS res"
        );
        assert_eq!(
            SqliteDialect.count_query("SELECT * FROM t"),
            "SELECT COUNT(*) FROM (SELECT * FROM t) AS res"
        );
    }
}
