//! Log database migrations - embedded SQL files
//!
//! Kept separate from the main schema because events live in their own
//! `logs.duckdb` file.

/// All log migrations, embedded at compile time.
/// Format: (filename, sql_content)
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
    (
        "002_event_details.sql",
        include_str!("002_event_details.sql"),
    ),
];
