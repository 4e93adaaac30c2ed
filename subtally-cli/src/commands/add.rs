//! Add command - create a subscription record

use anyhow::Result;
use dialoguer::Input;
use uuid::Uuid;

use subtally_core::{CreateInput, Month};

use super::Session;
use crate::output;

pub struct AddArgs {
    pub service: Option<String>,
    pub price: Option<i64>,
    pub user: Uuid,
    pub start: Month,
    pub end: Option<Month>,
    pub json: bool,
}

pub async fn run(session: &Session, args: AddArgs) -> Result<()> {
    // Prompt for what was left out, unless the caller wants machine output
    let service_name = match args.service {
        Some(name) => name,
        None if !args.json => Input::new().with_prompt("Service name").interact_text()?,
        None => anyhow::bail!(subtally_core::Error::validation("--service is required")),
    };
    let price = match args.price {
        Some(price) => price,
        None if !args.json => Input::<i64>::new()
            .with_prompt("Monthly price")
            .validate_with(|p: &i64| if *p >= 0 { Ok(()) } else { Err("price must be >= 0") })
            .interact_text()?,
        None => anyhow::bail!(subtally_core::Error::validation("--price is required")),
    };

    let ctx = session.context()?;
    let request = ctx.request_context(&session.root);
    let created = ctx
        .subscription_service
        .create(
            &request,
            CreateInput {
                service_name,
                price,
                user_id: args.user,
                start_month: args.start,
                end_month: args.end,
            },
        )
        .await?;

    if !args.json {
        output::success(&format!("Created subscription {}", created.id));
    }
    output::print_subscription(&created, args.json)
}
