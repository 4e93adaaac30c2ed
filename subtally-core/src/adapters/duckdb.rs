//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use duckdb::{params, Connection, ToSql};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{CreateInput, ListFilter, Month, Subscription, UpdateInput};
use crate::ports::Repository;
use crate::request::RequestContext;
use crate::services::{MigrationResult, MigrationService};

const SELECT_SUBSCRIPTIONS: &str =
    "SELECT id, service_name, price, user_id, start_month::VARCHAR, end_month::VARCHAR
     FROM subscriptions";

/// DuckDB repository implementation
///
/// One connection behind a mutex. Each public operation holds the lock for
/// its whole statement group, so an update and the re-read that follows it
/// cannot interleave with another writer in this process.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    pub fn new(db_path: &Path) -> Result<Self> {
        // Extension autoloading stays off: nothing here needs an extension and
        // cached extension binaries can fail code signing checks
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Names of migrations that have not been applied yet
    pub fn pending_migrations(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        MigrationService::new(&conn).get_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    // === Subscription operations ===

    fn insert_subscription(&self, input: &CreateInput) -> Result<Subscription> {
        let sub = Subscription::from_input(Uuid::new_v4(), input);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO subscriptions (id, service_name, price, user_id, start_month, end_month)
             VALUES (?, ?, ?, ?, CAST(? AS DATE), CAST(? AS DATE))",
            params![
                sub.id.to_string(),
                &sub.service_name,
                sub.price,
                sub.user_id.to_string(),
                month_param(sub.start_month),
                sub.end_month.map(month_param),
            ],
        )?;
        Ok(sub)
    }

    fn find_subscription(conn: &Connection, id: Uuid) -> Result<Subscription> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?", SELECT_SUBSCRIPTIONS))?;
        let mut rows = stmt.query_map([id.to_string()], read_row)?;
        let first = rows.next();
        match first {
            Some(row) => row?.into_subscription(),
            None => Err(Error::not_found(format!("subscription {}", id))),
        }
    }

    fn update_subscription(&self, id: Uuid, input: &UpdateInput) -> Result<Subscription> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE subscriptions
             SET service_name = ?, price = ?, start_month = CAST(? AS DATE), end_month = CAST(? AS DATE)
             WHERE id = ?",
            params![
                &input.service_name,
                input.price,
                month_param(input.start_month),
                input.end_month.map(month_param),
                id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::not_found(format!("subscription {}", id)));
        }
        Self::find_subscription(&conn, id)
    }

    fn delete_subscription(&self, id: Uuid) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM subscriptions WHERE id = ?", [id.to_string()])?;
        if deleted == 0 {
            return Err(Error::not_found(format!("subscription {}", id)));
        }
        Ok(())
    }

    fn list_subscriptions(&self, filter: &ListFilter) -> Result<Vec<Subscription>> {
        let (sql, values) = build_list_query(filter);
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|b| b.as_ref()).collect();

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), read_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;

        rows.into_iter().map(StoredRow::into_subscription).collect()
    }
}

/// Statements run synchronously on the calling task. The context is checked
/// once before each statement group starts; a running query is not
/// interrupted by cancellation or by the deadline.
#[async_trait]
impl Repository for DuckDbRepository {
    async fn create(&self, ctx: &RequestContext, input: &CreateInput) -> Result<Subscription> {
        ctx.check()?;
        self.insert_subscription(input)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Subscription> {
        ctx.check()?;
        let conn = self.lock()?;
        Self::find_subscription(&conn, id)
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &UpdateInput,
    ) -> Result<Subscription> {
        ctx.check()?;
        self.update_subscription(id, input)
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        ctx.check()?;
        self.delete_subscription(id)
    }

    async fn list(&self, ctx: &RequestContext, filter: &ListFilter) -> Result<Vec<Subscription>> {
        ctx.check()?;
        self.list_subscriptions(filter)
    }
}

/// Build the filtered, ordered, paginated SELECT and its bind values
fn build_list_query(filter: &ListFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(user_id) = filter.user_id {
        conditions.push("user_id = ?");
        values.push(Box::new(user_id.to_string()));
    }
    if let Some(name) = &filter.service_name {
        conditions.push("service_name = ?");
        values.push(Box::new(name.clone()));
    }
    if let Some(from) = filter.start_month_from {
        conditions.push("start_month >= CAST(? AS DATE)");
        values.push(Box::new(month_param(from)));
    }
    if let Some(to) = filter.start_month_to {
        conditions.push("start_month <= CAST(? AS DATE)");
        values.push(Box::new(month_param(to)));
    }
    if let Some((from, to)) = filter.active_period() {
        conditions.push("start_month <= CAST(? AS DATE)");
        values.push(Box::new(month_param(to)));
        conditions.push("(end_month IS NULL OR end_month >= CAST(? AS DATE))");
        values.push(Box::new(month_param(from)));
    }

    let mut sql = SELECT_SUBSCRIPTIONS.to_string();
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY start_month, id");

    if let Some(limit) = filter.page_limit() {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if filter.offset > 0 {
        sql.push_str(&format!(" OFFSET {}", filter.offset));
    }

    (sql, values)
}

/// Months are stored as the first day of the month
fn month_param(month: Month) -> String {
    month.first_day().format("%Y-%m-%d").to_string()
}

/// Column values as read from DuckDB, before domain parsing
struct StoredRow {
    id: String,
    service_name: String,
    price: i64,
    user_id: String,
    start_month: String,
    end_month: Option<String>,
}

fn read_row(row: &duckdb::Row) -> duckdb::Result<StoredRow> {
    Ok(StoredRow {
        id: row.get(0)?,
        service_name: row.get(1)?,
        price: row.get(2)?,
        user_id: row.get(3)?,
        start_month: row.get(4)?,
        end_month: row.get(5)?,
    })
}

impl StoredRow {
    fn into_subscription(self) -> Result<Subscription> {
        Ok(Subscription {
            id: parse_uuid(&self.id)?,
            service_name: self.service_name,
            price: self.price,
            user_id: parse_uuid(&self.user_id)?,
            start_month: parse_month(&self.start_month)?,
            end_month: self.end_month.as_deref().map(parse_month).transpose()?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::database(format!("corrupt id '{}': {}", s, e)))
}

fn parse_month(s: &str) -> Result<Month> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Month::from_date)
        .map_err(|e| Error::database(format!("corrupt month '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    fn test_repo() -> DuckDbRepository {
        let repo = DuckDbRepository::open_in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    fn input(name: &str, start: Month, end: Option<Month>) -> CreateInput {
        CreateInput {
            service_name: name.to_string(),
            price: 100,
            user_id: Uuid::new_v4(),
            start_month: start,
            end_month: end,
        }
    }

    #[test]
    fn test_list_query_without_filters() {
        let (sql, values) = build_list_query(&ListFilter::default());
        assert!(sql.ends_with("FROM subscriptions ORDER BY start_month, id"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_list_query_overlap_and_pagination() {
        let filter = ListFilter {
            user_id: Some(Uuid::new_v4()),
            active_period_from: Some(month(2023, 1)),
            active_period_to: Some(month(2023, 12)),
            limit: Some(10),
            offset: 20,
            ..ListFilter::default()
        };
        let (sql, values) = build_list_query(&filter);

        assert!(sql.contains("user_id = ?"));
        assert!(sql.contains("(end_month IS NULL OR end_month >= CAST(? AS DATE))"));
        assert!(sql.ends_with("ORDER BY start_month, id LIMIT 10 OFFSET 20"));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_list_query_zero_limit_means_unlimited() {
        let filter = ListFilter {
            limit: Some(0),
            offset: 5,
            ..ListFilter::default()
        };
        let (sql, _) = build_list_query(&filter);
        assert!(!sql.contains("LIMIT"));
        assert!(sql.ends_with("ORDER BY start_month, id OFFSET 5"));
    }

    #[test]
    fn test_list_query_ignores_half_open_active_period() {
        let filter = ListFilter {
            active_period_to: Some(month(2023, 12)),
            ..ListFilter::default()
        };
        let (sql, values) = build_list_query(&filter);
        assert!(!sql.contains("WHERE"));
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let repo = test_repo();
        let ctx = RequestContext::new();
        let created = repo
            .create(&ctx, &input("Spotify", month(2023, 1), Some(month(2023, 6))))
            .await
            .unwrap();

        let fetched = repo.get(&ctx, created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_boundary_years_round_trip_and_list() {
        let repo = test_repo();
        let ctx = RequestContext::new();
        let earliest = repo
            .create(&ctx, &input("Spotify", month(1, 1), Some(month(9999, 12))))
            .await
            .unwrap();

        let fetched = repo.get(&ctx, earliest.id).await.unwrap();
        assert_eq!(fetched.start_month, month(1, 1));
        assert_eq!(fetched.end_month, Some(month(9999, 12)));

        let all = repo.list(&ctx, &ListFilter::default()).await.unwrap();
        assert_eq!(all, vec![earliest]);
        assert!(Month::new(0, 1).is_err());
    }

    #[tokio::test]
    async fn test_zero_limit_returns_every_row() {
        let repo = test_repo();
        let ctx = RequestContext::new();
        for start in 1..=3 {
            repo.create(&ctx, &input("Spotify", month(2023, start), None))
                .await
                .unwrap();
        }

        let filter = ListFilter {
            limit: Some(0),
            ..ListFilter::default()
        };
        assert_eq!(repo.list(&ctx, &filter).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_open_ended_month_round_trips_as_none() {
        let repo = test_repo();
        let ctx = RequestContext::new();
        let created = repo
            .create(&ctx, &input("Netflix", month(2024, 2), None))
            .await
            .unwrap();

        let fetched = repo.get(&ctx, created.id).await.unwrap();
        assert_eq!(fetched.end_month, None);
        assert_eq!(fetched.start_month, month(2024, 2));
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let repo = test_repo();
        let ctx = RequestContext::new();
        let id = Uuid::new_v4();

        assert!(matches!(repo.get(&ctx, id).await, Err(Error::NotFound(_))));
        assert!(matches!(repo.delete(&ctx, id).await, Err(Error::NotFound(_))));

        let update = UpdateInput {
            service_name: "Netflix".to_string(),
            price: 1,
            start_month: month(2023, 1),
            end_month: None,
        };
        assert!(matches!(repo.update(&ctx, id, &update).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_reversed_range() {
        let repo = test_repo();
        let ctx = RequestContext::new();
        let bad = input("Spotify", month(2023, 6), Some(month(2023, 1)));

        let result = repo.create(&ctx, &bad).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_write() {
        let repo = test_repo();
        let ctx = RequestContext::new();
        ctx.cancel();

        let result = repo
            .create(&ctx, &input("Spotify", month(2023, 1), None))
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));

        let live = RequestContext::new();
        assert!(repo.list(&live, &ListFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_deadline_is_checked_before_statement() {
        let repo = test_repo();
        let ctx = RequestContext::with_timeout(std::time::Duration::ZERO);

        let result = repo
            .create(&ctx, &input("Spotify", month(2023, 1), None))
            .await;
        assert!(matches!(result, Err(Error::TimedOut)));

        let live = RequestContext::new();
        assert!(repo.list(&live, &ListFilter::default()).await.unwrap().is_empty());
    }

    #[test]
    fn test_pending_migrations_after_schema() {
        let repo = DuckDbRepository::open_in_memory().unwrap();
        assert!(!repo.pending_migrations().unwrap().is_empty());
        repo.ensure_schema().unwrap();
        assert!(repo.pending_migrations().unwrap().is_empty());
    }
}
