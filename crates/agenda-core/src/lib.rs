//! Core types and trait definitions for the Agenda booking ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod catalog;
pub mod error;
pub mod identity;
pub mod report;
pub mod reservation;
pub mod store;

pub use error::{Error, Result};
