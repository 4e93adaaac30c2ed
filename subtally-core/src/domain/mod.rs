//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod month;
mod subscription;
pub mod result;

pub use month::Month;
pub use subscription::{CreateInput, ListFilter, Subscription, SummaryFilter, UpdateInput};
