//! Summary command - total spend over a month window

use anyhow::Result;
use colored::Colorize;

use subtally_core::{Error, SummaryFilter};

use super::Session;
use crate::output::format_month;

pub async fn run(session: &Session, filter: SummaryFilter, json: bool) -> Result<()> {
    // The core treats a reversed window as empty; here it is almost certainly a typo
    if filter.period_end < filter.period_start {
        return Err(Error::validation(format!(
            "--to ({}) is before --from ({})",
            format_month(filter.period_end),
            format_month(filter.period_start)
        ))
        .into());
    }

    let ctx = session.context()?;
    let request = ctx.request_context(&session.root);
    let total = ctx.subscription_service.sum(&request, filter.clone()).await?;

    if json {
        println!("{}", serde_json::json!({ "total": total }));
        return Ok(());
    }

    println!(
        "{} {} .. {}",
        "Total".bold(),
        format_month(filter.period_start),
        format_month(filter.period_end)
    );
    if let Some(user) = filter.user_id {
        println!("  User:    {}", user);
    }
    if let Some(service) = &filter.service_name {
        println!("  Service: {}", service);
    }
    println!("  {}", total.to_string().green().bold());
    Ok(())
}
