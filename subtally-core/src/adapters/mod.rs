//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the Repository port
//! - An in-memory vector for the Repository port (tests, embedding)

pub mod duckdb;
pub mod memory;
