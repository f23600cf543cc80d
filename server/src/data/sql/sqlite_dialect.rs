//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn limit_offset(&self, limit: i64, offset: i64) -> String {
        // SQLite treats a negative LIMIT as unbounded
        format!("LIMIT {} OFFSET {}", limit.max(0), offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = SqliteDialect;
        assert_eq!(dialect.placeholder(1), "?");
        assert_eq!(dialect.placeholder(5), "?");
    }

    #[test]
    fn test_modify_limit_query() {
        let dialect = SqliteDialect;
        assert_eq!(
            dialect.modify_limit_query("SELECT * FROM t\n", 16, 32),
            "SELECT * FROM t LIMIT 16 OFFSET 32"
        );
        assert_eq!(
            dialect.modify_limit_query("SELECT * FROM t", -1, -4),
            "SELECT * FROM t LIMIT 0 OFFSET 0"
        );
    }

    #[test]
    fn test_count_query() {
        let dialect = SqliteDialect;
        assert_eq!(
            dialect.count_query("SELECT id FROM t WHERE (1 = 1)"),
            "SELECT COUNT(*) FROM (SELECT id FROM t WHERE (1 = 1)) AS res"
        );
    }
}
