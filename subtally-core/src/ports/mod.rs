//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod observer;
mod repository;

pub use observer::{EventObserver, NoopObserver};
pub use repository::Repository;
