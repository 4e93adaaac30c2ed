//! Update command - replace a subscription's mutable fields

use anyhow::Result;
use uuid::Uuid;

use subtally_core::{Month, UpdateInput};

use super::Session;
use crate::output;

pub struct UpdateArgs {
    pub id: Uuid,
    pub service: String,
    pub price: i64,
    pub start: Month,
    pub end: Option<Month>,
    pub json: bool,
}

pub async fn run(session: &Session, args: UpdateArgs) -> Result<()> {
    let ctx = session.context()?;
    let request = ctx.request_context(&session.root);

    // Full replacement: omitting --end makes the subscription open-ended
    let updated = ctx
        .subscription_service
        .update(
            &request,
            args.id,
            UpdateInput {
                service_name: args.service,
                price: args.price,
                start_month: args.start,
                end_month: args.end,
            },
        )
        .await?;

    if !args.json {
        output::success(&format!("Updated subscription {}", updated.id));
    }
    output::print_subscription(&updated, args.json)
}
