//! Operation execution
//!
//! A query-all operation runs two round-trips: a count over the fully
//! compiled query, then the same query restricted to the requested page.
//! An execute operation runs one statement.

use serde::Serialize;
use utoipa::ToSchema;

use crate::data::{DataError, JsonRow, QueryConnection};

use super::error::QueryError;
use super::filter::{self, FilterRequest};
use super::operation::SqlOperation;
use super::pagination::{self, PaginationPlan};
use super::params::{BoundParams, merge};
use super::parser;
use super::request::RequestParams;
use super::template::PlaceholderTemplate;

pub const STATEMENT_SUCCESS_MESSAGE: &str = "Statement executed successfully";

/// One page of a query-all result
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub total_results: i64,
    pub items_per_page: i64,
    pub start_index: i64,
    #[schema(value_type = Vec<Object>)]
    pub entry: Vec<JsonRow>,
}

/// Result of a successful execute operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatementOutcome {
    pub success: bool,
    pub message: String,
}

impl StatementOutcome {
    fn succeeded() -> Self {
        Self {
            success: true,
            message: STATEMENT_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Final query text and parameters, before paging
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub query: String,
    pub params: BoundParams,
}

/// Compile the filter, resolve `{name}` references and merge both parameter sets.
///
/// The filter marker is always resolved; with filtering disabled it becomes
/// the always-true predicate.
pub fn prepare(op: &SqlOperation, request: &RequestParams) -> Result<PreparedQuery, QueryError> {
    let template = PlaceholderTemplate::new(&op.sql);
    let filter_request = op
        .builtin_filtering
        .then(|| FilterRequest::from_request(request));

    let compiled = filter::compile(
        &template,
        filter_request.as_ref(),
        &op.filtering_columns,
        op.comparison_binding,
    );
    let parsed = parser::parse(&compiled.query, request);
    let params = merge(&compiled.params, &parsed.params, op.merge_policy)?;

    Ok(PreparedQuery {
        query: parsed.query,
        params,
    })
}

/// Runs operations against a connection owned by the caller
pub struct QueryExecutor<'a> {
    conn: &'a dyn QueryConnection,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(conn: &'a dyn QueryConnection) -> Self {
        Self { conn }
    }

    /// Count the filtered result set and fetch the requested page.
    ///
    /// Store errors from either round-trip propagate unchanged.
    pub async fn query_all(
        &self,
        op: &SqlOperation,
        request: &RequestParams,
    ) -> Result<ResultEnvelope, QueryError> {
        let prepared = prepare(op, request)?;
        let plan = PaginationPlan::plan(
            request.get_int(pagination::fields::START_INDEX),
            request.get_int(pagination::fields::COUNT),
            op.limit,
        );

        let count_sql = self.conn.dialect().count_query(&prepared.query);
        let total_results = self.conn.fetch_count(&count_sql, &prepared.params).await?;

        let page_sql = self
            .conn
            .modify_limit_query(&prepared.query, plan.count, plan.start_index);
        let entry = self.conn.fetch_all(&page_sql, &prepared.params).await?;

        tracing::debug!(
            operation = %op.name,
            total_results,
            start_index = plan.start_index,
            count = plan.count,
            returned = entry.len(),
            "Query executed"
        );

        Ok(ResultEnvelope {
            total_results,
            items_per_page: plan.count,
            start_index: plan.start_index,
            entry,
        })
    }

    /// Run a single statement.
    ///
    /// Any store failure becomes [`QueryError::StatementFailed`]; unbound
    /// placeholders stay configuration errors.
    pub async fn execute(
        &self,
        op: &SqlOperation,
        request: &RequestParams,
    ) -> Result<StatementOutcome, QueryError> {
        let parsed = parser::parse(&op.sql, request);

        match self.conn.execute(&parsed.query, &parsed.params).await {
            Ok(outcome) => {
                tracing::debug!(
                    operation = %op.name,
                    rows_affected = outcome.rows_affected,
                    "Statement executed"
                );
                Ok(StatementOutcome::succeeded())
            }
            Err(e @ DataError::UnboundParameter { .. }) => Err(QueryError::Store(e)),
            Err(e) => {
                tracing::warn!(operation = %op.name, error = %e, "Statement execution failed");
                Err(QueryError::StatementFailed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::domain::query::filter::ComparisonBinding;
    use crate::domain::query::params::MergePolicy;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn contacts() -> SqliteService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE contacts (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        for (id, name, age) in [
            (1, "Ann", 31),
            (2, "Bob", 45),
            (3, "Annie", 27),
            (4, "Carl", 52),
            (5, "Dana", 38),
        ] {
            sqlx::query("INSERT INTO contacts (id, name, age) VALUES (?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(age)
                .execute(&pool)
                .await
                .unwrap();
        }
        SqliteService::from_pool(pool)
    }

    fn list_op() -> SqlOperation {
        SqlOperation::query_all(
            "list_contacts",
            "SELECT id, name, age FROM contacts WHERE {filterBy} ORDER BY id",
        )
        .with_filtering(["name", "age"])
    }

    fn ids(envelope: &ResultEnvelope) -> Vec<i64> {
        envelope
            .entry
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_prepare_without_filtering_resolves_marker() {
        let op = SqlOperation::query_all("list", "SELECT * FROM t WHERE {filterBy}");
        let request = RequestParams::from_pairs([
            ("filterBy", "name"),
            ("filterOp", "equals"),
            ("filterValue", "x"),
        ]);

        let prepared = prepare(&op, &request).unwrap();
        assert_eq!(prepared.query, "SELECT * FROM t WHERE (1 = 1)");
        assert!(prepared.params.is_empty());
    }

    #[test]
    fn test_prepare_combines_filter_and_template_params() {
        let op = SqlOperation::query_all(
            "list",
            "SELECT * FROM t WHERE owner = {owner} AND {filterBy}",
        )
        .with_filtering(["name"]);
        let request = RequestParams::from_pairs([
            ("owner", "7"),
            ("filterBy", "name"),
            ("filterOp", "contains"),
            ("filterValue", "ann"),
        ]);

        let prepared = prepare(&op, &request).unwrap();
        assert_eq!(
            prepared.query,
            "SELECT * FROM t WHERE owner = :owner AND name LIKE :filterValue"
        );
        assert_eq!(
            prepared.params.names().collect::<Vec<_>>(),
            vec!["owner", "filterValue"]
        );
    }

    #[test]
    fn test_prepare_conflict_rejected() {
        let op = SqlOperation::query_all(
            "list",
            "SELECT * FROM t WHERE {filterBy} AND x = {filterValue}",
        )
        .with_filtering(["name"]);
        let request = RequestParams::from_pairs([
            ("filterBy", "name"),
            ("filterOp", "equals"),
            ("filterValue", "ann"),
        ]);

        let err = prepare(&op, &request).unwrap_err();
        assert!(matches!(err, QueryError::ParameterConflict { .. }));

        let op = op.with_merge_policy(MergePolicy::Overwrite);
        let prepared = prepare(&op, &request).unwrap();
        assert_eq!(prepared.params.len(), 1);
    }

    #[tokio::test]
    async fn test_query_all_unfiltered_first_page() {
        let conn = contacts().await;
        let op = list_op().with_limit(2);

        let envelope = QueryExecutor::new(&conn)
            .query_all(&op, &RequestParams::new())
            .await
            .unwrap();

        assert_eq!(envelope.total_results, 5);
        assert_eq!(envelope.items_per_page, 2);
        assert_eq!(envelope.start_index, 0);
        assert_eq!(ids(&envelope), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_query_all_count_reflects_filter() {
        let conn = contacts().await;
        let request = RequestParams::from_pairs([
            ("filterBy", "name"),
            ("filterOp", "startsWith"),
            ("filterValue", "Ann"),
        ]);

        let envelope = QueryExecutor::new(&conn)
            .query_all(&list_op(), &request)
            .await
            .unwrap();

        assert_eq!(envelope.total_results, 2);
        assert_eq!(envelope.items_per_page, 16);
        assert_eq!(ids(&envelope), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_query_all_pages_with_start_index() {
        let conn = contacts().await;
        let request = RequestParams::from_pairs([("startIndex", "3"), ("count", "10")]);

        let envelope = QueryExecutor::new(&conn)
            .query_all(&list_op().with_limit(5), &request)
            .await
            .unwrap();

        assert_eq!(envelope.total_results, 5);
        assert_eq!(envelope.items_per_page, 5);
        assert_eq!(envelope.start_index, 3);
        assert_eq!(ids(&envelope), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_query_all_between() {
        let conn = contacts().await;
        let request = RequestParams::from_pairs([
            ("filterBy", "age"),
            ("filterOp", "between"),
            ("filterValue", "30"),
            ("filterValueB", "45"),
        ]);

        let envelope = QueryExecutor::new(&conn)
            .query_all(&list_op(), &request)
            .await
            .unwrap();

        assert_eq!(ids(&envelope), vec![1, 2, 5]);
    }

    #[tokio::test]
    async fn test_query_all_rejected_column_lists_everything() {
        let conn = contacts().await;
        let request = RequestParams::from_pairs([
            ("filterBy", "id = 1 OR 1"),
            ("filterOp", "equals"),
            ("filterValue", "x"),
        ]);

        let envelope = QueryExecutor::new(&conn)
            .query_all(&list_op(), &request)
            .await
            .unwrap();

        assert_eq!(envelope.total_results, 5);
    }

    #[tokio::test]
    async fn test_query_all_legacy_wildcard_binding() {
        let conn = contacts().await;
        let request = RequestParams::from_pairs([
            ("filterBy", "name"),
            ("filterOp", "ne"),
            ("filterValue", "Ann"),
        ]);

        let exact = QueryExecutor::new(&conn)
            .query_all(&list_op(), &request)
            .await
            .unwrap();
        assert_eq!(exact.total_results, 4);

        let legacy = QueryExecutor::new(&conn)
            .query_all(
                &list_op().with_comparison_binding(ComparisonBinding::LegacyWildcard),
                &request,
            )
            .await
            .unwrap();
        assert_eq!(legacy.total_results, 5);
    }

    #[tokio::test]
    async fn test_query_all_template_params() {
        let conn = contacts().await;
        let op = SqlOperation::query_all(
            "older_than",
            "SELECT id FROM contacts WHERE age > {minAge} ORDER BY id",
        );
        let mut request = RequestParams::new();
        request.insert("minAge", 40);

        let envelope = QueryExecutor::new(&conn)
            .query_all(&op, &request)
            .await
            .unwrap();
        assert_eq!(ids(&envelope), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_query_all_template_with_comments() {
        let conn = contacts().await;
        let op = SqlOperation::query_all(
            "list_contacts",
            "SELECT id, name, age FROM contacts -- don't list archived\n\
             WHERE {filterBy} /* owner's view */ ORDER BY id",
        )
        .with_filtering(["name", "age"]);
        let request = RequestParams::from_pairs([
            ("filterBy", "name"),
            ("filterOp", "equals"),
            ("filterValue", "Ann"),
        ]);

        let envelope = QueryExecutor::new(&conn)
            .query_all(&op, &request)
            .await
            .unwrap();
        assert_eq!(envelope.total_results, 1);
        assert_eq!(ids(&envelope), vec![1]);
    }

    #[tokio::test]
    async fn test_query_all_store_error_propagates() {
        let conn = contacts().await;
        let op = SqlOperation::query_all("broken", "SELECT * FROM missing");

        let err = QueryExecutor::new(&conn)
            .query_all(&op, &RequestParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Store(DataError::Sqlite(_))));
        assert!(!err.is_configuration());
    }

    #[tokio::test]
    async fn test_execute_statement() {
        let conn = contacts().await;
        let op = SqlOperation::execute("rename", "UPDATE contacts SET name = {name} WHERE id = {id}");
        let mut request = RequestParams::from_pairs([("name", "Zoe")]);
        request.insert("id", 2);

        let outcome = QueryExecutor::new(&conn)
            .execute(&op, &request)
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Statement executed successfully");

        let rows = conn
            .fetch_all("SELECT name FROM contacts WHERE id = 2", &BoundParams::new())
            .await
            .unwrap();
        assert_eq!(rows[0]["name"], "Zoe");
    }

    #[tokio::test]
    async fn test_execute_failure_is_statement_failed() {
        let conn = contacts().await;
        let op = SqlOperation::execute("bad", "INSERT INTO contacts (id, name) VALUES ({id}, 'x')");
        let request = RequestParams::from_pairs([("id", "1")]);

        let err = QueryExecutor::new(&conn)
            .execute(&op, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::StatementFailed(_)));
        assert_eq!(err.to_string(), "Statement execution resulted in failure");
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let envelope = ResultEnvelope {
            total_results: 1,
            items_per_page: 16,
            start_index: 0,
            entry: vec![],
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            serde_json::json!({
                "totalResults": 1,
                "itemsPerPage": 16,
                "startIndex": 0,
                "entry": []
            })
        );
    }
}
