//! In-memory repository implementation
//!
//! Mirrors the DuckDB adapter's query semantics over a plain vector. Useful
//! for tests and for embedding the service without a database file.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{CreateInput, ListFilter, Subscription, UpdateInput};
use crate::ports::Repository;
use crate::request::RequestContext;

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    rows: Mutex<Vec<Subscription>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records, keeping their ids
    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        Self {
            rows: Mutex::new(subscriptions),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Subscription>>> {
        self.rows
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }
}

fn not_found(id: Uuid) -> Error {
    Error::not_found(format!("subscription {}", id))
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create(&self, ctx: &RequestContext, input: &CreateInput) -> Result<Subscription> {
        ctx.check()?;
        // Same constraint the relational schema enforces
        input.validate().map_err(|e| Error::database(e.to_string()))?;

        let sub = Subscription::from_input(Uuid::new_v4(), input);
        self.lock()?.push(sub.clone());
        Ok(sub)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Subscription> {
        ctx.check()?;
        self.lock()?
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &UpdateInput,
    ) -> Result<Subscription> {
        ctx.check()?;
        input.validate().map_err(|e| Error::database(e.to_string()))?;

        let mut rows = self.lock()?;
        let sub = rows.iter_mut().find(|s| s.id == id).ok_or_else(|| not_found(id))?;
        sub.apply_update(input);
        Ok(sub.clone())
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        ctx.check()?;
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|s| s.id != id);
        if rows.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn list(&self, ctx: &RequestContext, filter: &ListFilter) -> Result<Vec<Subscription>> {
        ctx.check()?;
        let mut matched: Vec<Subscription> = self
            .lock()?
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();

        matched.sort_by(|a, b| a.start_month.cmp(&b.start_month).then_with(|| a.id.cmp(&b.id)));

        let page = matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.page_limit().unwrap_or(usize::MAX))
            .collect();
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Month;

    fn month(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    fn input(name: &str, start: Month) -> CreateInput {
        CreateInput {
            service_name: name.to_string(),
            price: 100,
            user_id: Uuid::new_v4(),
            start_month: start,
            end_month: None,
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_start_month_and_paginates() {
        let repo = InMemoryRepository::new();
        let ctx = RequestContext::new();
        for (name, m) in [("c", 3), ("a", 1), ("b", 2)] {
            repo.create(&ctx, &input(name, month(2023, m))).await.unwrap();
        }

        let all = repo.list(&ctx, &ListFilter::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|s| s.service_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let page = repo
            .list(
                &ctx,
                &ListFilter {
                    limit: Some(1),
                    offset: 1,
                    ..ListFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].service_name, "b");
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let repo = InMemoryRepository::new();
        let ctx = RequestContext::new();
        repo.create(&ctx, &input("a", month(2023, 1))).await.unwrap();

        let filter = ListFilter {
            offset: 5,
            ..ListFilter::default()
        };
        assert!(repo.list(&ctx, &filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_limit_returns_every_row() {
        let repo = InMemoryRepository::new();
        let ctx = RequestContext::new();
        for (name, m) in [("a", 1), ("b", 2), ("c", 3)] {
            repo.create(&ctx, &input(name, month(2023, m))).await.unwrap();
        }

        let filter = ListFilter {
            limit: Some(0),
            offset: 1,
            ..ListFilter::default()
        };
        let names: Vec<_> = repo
            .list(&ctx, &filter)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.service_name)
            .collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let repo = InMemoryRepository::new();
        let ctx = RequestContext::new();
        let sub = repo.create(&ctx, &input("a", month(2023, 1))).await.unwrap();

        repo.delete(&ctx, sub.id).await.unwrap();
        assert!(repo.is_empty());
        assert!(matches!(repo.delete(&ctx, sub.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_constraint_violation_is_storage_error() {
        let repo = InMemoryRepository::new();
        let ctx = RequestContext::new();
        let mut bad = input("a", month(2023, 5));
        bad.end_month = Some(month(2023, 1));

        assert!(matches!(repo.create(&ctx, &bad).await, Err(Error::Database(_))));
    }
}
