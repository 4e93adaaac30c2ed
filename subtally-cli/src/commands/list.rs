//! List command - filtered, paginated subscription listing

use anyhow::Result;

use subtally_core::ListFilter;

use super::Session;
use crate::output;

pub async fn run(session: &Session, filter: ListFilter, json: bool) -> Result<()> {
    let ctx = session.context()?;
    let request = ctx.request_context(&session.root);
    let subs = ctx.subscription_service.list(&request, filter).await?;
    output::print_subscriptions(&subs, json)
}
