//! PostgreSQL SQL dialect implementation

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn limit_offset(&self, limit: i64, offset: i64) -> String {
        format!("LIMIT {} OFFSET {}", limit.max(0), offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.placeholder(1), "$1");
        assert_eq!(dialect.placeholder(5), "$5");
    }

    #[test]
    fn test_modify_limit_query() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.modify_limit_query("SELECT * FROM t", 10, 0),
            "SELECT * FROM t LIMIT 10 OFFSET 0"
        );
    }
}
