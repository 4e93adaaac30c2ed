//! Get command - show one subscription

use anyhow::Result;
use uuid::Uuid;

use super::Session;
use crate::output;

pub async fn run(session: &Session, id: Uuid, json: bool) -> Result<()> {
    let ctx = session.context()?;
    let request = ctx.request_context(&session.root);
    let sub = ctx.subscription_service.get(&request, id).await?;
    output::print_subscription(&sub, json)
}
