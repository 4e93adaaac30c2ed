//! Subscription service - lifecycle operations and spend summation

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{CreateInput, ListFilter, Month, Subscription, SummaryFilter, UpdateInput};
use crate::ports::{EventObserver, NoopObserver, Repository};
use crate::request::RequestContext;
use crate::services::LogEvent;

/// Orchestrates subscription CRUD against a repository and computes the
/// total billed over a window of months
pub struct SubscriptionService<R: Repository> {
    repository: Arc<R>,
    observer: Arc<dyn EventObserver>,
}

impl<R: Repository> Clone for SubscriptionService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<R: Repository> SubscriptionService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_observer(repository, Arc::new(NoopObserver))
    }

    pub fn with_observer(repository: Arc<R>, observer: Arc<dyn EventObserver>) -> Self {
        Self {
            repository,
            observer,
        }
    }

    pub async fn create(&self, ctx: &RequestContext, input: CreateInput) -> Result<Subscription> {
        input.validate()?;

        let result = ctx
            .run(self.repository.create(ctx, &input))
            .await
            .map_err(|e| e.in_operation("create subscription"));

        match &result {
            Ok(sub) => self.observer.record(
                LogEvent::new("subscription_created")
                    .with_subscription(sub.id)
                    .with_user(sub.user_id),
            ),
            Err(e) => self.report_failure("subscription_create_failed", None, e),
        }
        result
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Subscription> {
        let result = ctx
            .run(self.repository.get(ctx, id))
            .await
            .map_err(|e| e.in_operation("get subscription"));

        if let Err(e) = &result {
            self.report_failure("subscription_get_failed", Some(id), e);
        }
        result
    }

    /// Replace service name, price and month range; id and owner never change
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateInput,
    ) -> Result<Subscription> {
        input.validate()?;

        let result = ctx
            .run(self.repository.update(ctx, id, &input))
            .await
            .map_err(|e| e.in_operation("update subscription"));

        match &result {
            Ok(sub) => self
                .observer
                .record(LogEvent::new("subscription_updated").with_subscription(sub.id)),
            Err(e) => self.report_failure("subscription_update_failed", Some(id), e),
        }
        result
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let result = ctx
            .run(self.repository.delete(ctx, id))
            .await
            .map_err(|e| e.in_operation("delete subscription"));

        match &result {
            Ok(()) => self
                .observer
                .record(LogEvent::new("subscription_deleted").with_subscription(id)),
            Err(e) => self.report_failure("subscription_delete_failed", Some(id), e),
        }
        result
    }

    pub async fn list(&self, ctx: &RequestContext, filter: ListFilter) -> Result<Vec<Subscription>> {
        let result = ctx
            .run(self.repository.list(ctx, &filter))
            .await
            .map_err(|e| e.in_operation("list subscriptions"));

        match &result {
            Ok(subs) => self.observer.record(
                LogEvent::debug("subscriptions_listed")
                    .with_details(format!("count={}", subs.len())),
            ),
            Err(e) => self.report_failure("subscription_list_failed", None, e),
        }
        result
    }

    /// Total billed across matching subscriptions, priced per overlapping month
    ///
    /// The repository narrows candidates with its overlap filter; the exact
    /// billed months are derived here again for every candidate.
    pub async fn sum(&self, ctx: &RequestContext, filter: SummaryFilter) -> Result<i64> {
        let candidates = ctx
            .run(self.repository.list(ctx, &filter.to_list_filter()))
            .await
            .map_err(|e| e.in_operation("list subscriptions for summary"));

        let candidates = match candidates {
            Ok(subs) => subs,
            Err(e) => {
                self.report_failure("subscription_summary_failed", None, &e);
                return Err(e);
            }
        };

        let mut total: i64 = 0;
        for sub in &candidates {
            let months = billed_months(sub, filter.period_start, filter.period_end);
            total = sub
                .price
                .checked_mul(months)
                .and_then(|cost| total.checked_add(cost))
                .ok_or_else(|| Error::validation("summary total overflows"))?;
        }

        self.observer.record(
            LogEvent::debug("subscriptions_summed")
                .with_details(format!("candidates={} total={}", candidates.len(), total)),
        );
        Ok(total)
    }

    fn report_failure(&self, event: &str, id: Option<Uuid>, err: &Error) {
        let mut log_event = match err {
            Error::NotFound(_) => LogEvent::warn("subscription_not_found"),
            Error::Validation(_) => LogEvent::warn(event),
            _ => LogEvent::error(event),
        };
        if let Some(id) = id {
            log_event = log_event.with_subscription(id);
        }
        self.observer.record(
            log_event
                .with_error(err.to_string())
                .with_error_details(format!("{:?}", err)),
        );
    }
}

/// Number of months of `sub` that fall inside `[period_start, period_end]`
///
/// An open-ended subscription is billed through `period_end` only.
fn billed_months(sub: &Subscription, period_start: Month, period_end: Month) -> i64 {
    let overlap_start = sub.start_month.max(period_start);
    let effective_end = match sub.end_month {
        Some(end) if end < period_end => end,
        _ => period_end,
    };

    if overlap_start > effective_end {
        return 0;
    }

    (overlap_start.months_until(effective_end) + 1).max(0)
}
