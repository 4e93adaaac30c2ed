//! Subtally CLI - subscription spend in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;
mod output;

use commands::{add, delete, get, list, logs, migrate, parse_month, summary, update, Session};
use subtally_core::{Error, ListFilter, Month, RequestContext, SummaryFilter};

/// Subtally - track recurring subscriptions and what they cost
#[derive(Parser)]
#[command(name = "st", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new subscription
    Add {
        /// Service name (prompted if omitted)
        #[arg(long)]
        service: Option<String>,
        /// Monthly price in whole currency units (prompted if omitted)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        price: Option<i64>,
        /// Owning user ID
        #[arg(long)]
        user: Uuid,
        /// First billed month (MM-YYYY)
        #[arg(long, value_parser = parse_month)]
        start: Month,
        /// Last billed month (MM-YYYY); open-ended if omitted
        #[arg(long, value_parser = parse_month)]
        end: Option<Month>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a subscription
    Get {
        /// Subscription ID
        id: Uuid,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a subscription's service, price and months
    Update {
        /// Subscription ID
        id: Uuid,
        /// Service name
        #[arg(long)]
        service: String,
        /// Monthly price in whole currency units
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        price: i64,
        /// First billed month (MM-YYYY)
        #[arg(long, value_parser = parse_month)]
        start: Month,
        /// Last billed month (MM-YYYY); open-ended if omitted
        #[arg(long, value_parser = parse_month)]
        end: Option<Month>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a subscription
    Delete {
        /// Subscription ID
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List subscriptions
    List {
        /// Only this user's subscriptions
        #[arg(long)]
        user: Option<Uuid>,
        /// Only this service (exact match)
        #[arg(long)]
        service: Option<String>,
        /// Earliest start month (MM-YYYY)
        #[arg(long, value_parser = parse_month)]
        start_from: Option<Month>,
        /// Latest start month (MM-YYYY)
        #[arg(long, value_parser = parse_month)]
        start_to: Option<Month>,
        /// Active at some point from this month (MM-YYYY)
        #[arg(long, value_parser = parse_month, requires = "active_to")]
        active_from: Option<Month>,
        /// Active at some point up to this month (MM-YYYY)
        #[arg(long, value_parser = parse_month, requires = "active_from")]
        active_to: Option<Month>,
        /// Maximum number of rows, 0 for no limit
        #[arg(long)]
        limit: Option<usize>,
        /// Rows to skip
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Total cost over a range of months
    Summary {
        /// First month of the window (MM-YYYY)
        #[arg(long, value_parser = parse_month)]
        from: Month,
        /// Last month of the window (MM-YYYY)
        #[arg(long, value_parser = parse_month)]
        to: Month,
        /// Only this user's subscriptions
        #[arg(long)]
        user: Option<Uuid>,
        /// Only this service (exact match)
        #[arg(long)]
        service: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply pending database migrations
    Migrate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::Get { .. } => "get",
            Commands::Update { .. } => "update",
            Commands::Delete { .. } => "delete",
            Commands::List { .. } => "list",
            Commands::Summary { .. } => "summary",
            Commands::Migrate { .. } => "migrate",
            Commands::Logs { .. } => "logs",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let root = RequestContext::new();
    let on_interrupt = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let session = Session {
        root,
        logger: commands::get_logger(),
    };
    if let Some(logger) = &session.logger {
        let _ = logger.log_command(cli.command.name());
    }

    match run(cli, &session).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Map a failure to the process exit status
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::Validation(_)) => 2,
        Some(Error::NotFound(_)) => 3,
        Some(Error::Cancelled) => 130,
        _ => 1,
    }
}

async fn run(cli: Cli, session: &Session) -> Result<()> {
    match cli.command {
        Commands::Add { service, price, user, start, end, json } => {
            add::run(session, add::AddArgs { service, price, user, start, end, json }).await
        }
        Commands::Get { id, json } => get::run(session, id, json).await,
        Commands::Update { id, service, price, start, end, json } => {
            update::run(session, update::UpdateArgs { id, service, price, start, end, json }).await
        }
        Commands::Delete { id, force, json } => delete::run(session, id, force, json).await,
        Commands::List { user, service, start_from, start_to, active_from, active_to, limit, offset, json } => {
            let filter = ListFilter {
                user_id: user,
                service_name: service,
                start_month_from: start_from,
                start_month_to: start_to,
                active_period_from: active_from,
                active_period_to: active_to,
                limit,
                offset,
            };
            list::run(session, filter, json).await
        }
        Commands::Summary { from, to, user, service, json } => {
            let filter = SummaryFilter {
                user_id: user,
                service_name: service,
                ..SummaryFilter::new(from, to)
            };
            summary::run(session, filter, json).await
        }
        Commands::Migrate { json } => migrate::run(session, json),
        Commands::Logs { command } => logs::run(session, command),
    }
}
