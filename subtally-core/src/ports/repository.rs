//! Repository port - database abstraction

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{CreateInput, ListFilter, Subscription, UpdateInput};
use crate::request::RequestContext;

/// Subscription storage abstraction
///
/// Implementations (adapters) provide the actual storage. Every call receives
/// the caller's request context and must return `Error::Cancelled` /
/// `Error::TimedOut` instead of doing work once it is no longer live.
/// Adapters that block may only check the context before they start; the
/// service still races every call against it.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Persist a new subscription under a freshly generated id
    async fn create(&self, ctx: &RequestContext, input: &CreateInput) -> Result<Subscription>;

    /// Fetch by id, `Error::NotFound` if absent
    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Subscription>;

    /// Replace service name, price and month range; `Error::NotFound` if absent
    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &UpdateInput,
    ) -> Result<Subscription>;

    /// Remove by id, `Error::NotFound` if nothing was removed
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()>;

    /// Filtered listing ordered by start month (then id), paginated last
    async fn list(&self, ctx: &RequestContext, filter: &ListFilter) -> Result<Vec<Subscription>>;
}
