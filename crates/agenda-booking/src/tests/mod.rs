//! Workflow tests against an in-memory SQLite store, wrapped so individual
//! tests can inject latency and failures.

mod commit;
mod support;
