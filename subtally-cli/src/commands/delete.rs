//! Delete command - remove a subscription

use anyhow::Result;
use dialoguer::Confirm;
use uuid::Uuid;

use super::Session;
use crate::output;

pub async fn run(session: &Session, id: Uuid, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete subscription {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let ctx = session.context()?;
    let request = ctx.request_context(&session.root);
    ctx.subscription_service.delete(&request, id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        output::success(&format!("Deleted subscription {}", id));
    }
    Ok(())
}
