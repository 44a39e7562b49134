//! SQLite backend for the Agenda reservation store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Live queries are driven by an
//! in-process change feed: every successful write wakes the subscriptions on
//! the affected partition, which re-run their query and push a fresh
//! snapshot.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
