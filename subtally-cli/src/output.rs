//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use serde::Serialize;
use uuid::Uuid;

use subtally_core::{Month, Subscription};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render a month the way it is typed on the command line (`MM-YYYY`)
pub fn format_month(month: Month) -> String {
    format!("{:02}-{:04}", month.month(), month.year())
}

/// JSON shape of a subscription
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub id: Uuid,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<&Subscription> for SubscriptionView {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name.clone(),
            price: sub.price,
            user_id: sub.user_id,
            start_date: format_month(sub.start_month),
            end_date: sub.end_month.map(format_month),
        }
    }
}

/// Print one subscription as JSON or as a key/value block
pub fn print_subscription(sub: &Subscription, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&SubscriptionView::from(sub))?);
        return Ok(());
    }

    println!("{}", sub.service_name.bold());
    println!("  ID:     {}", sub.id);
    println!("  User:   {}", sub.user_id);
    println!("  Price:  {}", sub.price);
    println!("  Start:  {}", format_month(sub.start_month));
    match sub.end_month {
        Some(end) => println!("  End:    {}", format_month(end)),
        None => println!("  End:    {}", "open-ended".dimmed()),
    }
    Ok(())
}

/// Print subscriptions as JSON or as a table
pub fn print_subscriptions(subs: &[Subscription], json: bool) -> anyhow::Result<()> {
    if json {
        let views: Vec<SubscriptionView> = subs.iter().map(SubscriptionView::from).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if subs.is_empty() {
        println!("No subscriptions found.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Service", "Price", "User", "Start", "End"]);
    for sub in subs {
        table.add_row(vec![
            sub.id.to_string(),
            sub.service_name.clone(),
            sub.price.to_string(),
            sub.user_id.to_string(),
            format_month(sub.start_month),
            sub.end_month.map(format_month).unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{}", table);
    Ok(())
}
