//! Migrate command - apply pending schema migrations

use anyhow::Result;
use colored::Colorize;

use super::Session;
use crate::output;

pub fn run(session: &Session, json: bool) -> Result<()> {
    // Opening the context runs whatever is pending
    let ctx = session.context()?;
    let result = &ctx.migrations;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "database": ctx.repository.db_path().map(|p| p.display().to_string()),
                "applied": result.applied,
                "already_applied": result.already_applied,
            })
        );
        return Ok(());
    }

    if result.applied.is_empty() {
        output::info(&format!(
            "Schema up to date ({} migrations applied)",
            result.already_applied
        ));
    } else {
        output::success(&format!("Applied {} migrations:", result.applied.len()));
        for name in &result.applied {
            println!("  {}", name.dimmed());
        }
    }
    Ok(())
}
