//! The booking workflow: live conflict detection, multi-slot commit, and the
//! daily report.
//!
//! Everything here is generic over [`agenda_core::store::ReservationStore`]
//! and [`agenda_core::identity::IdentityProvider`]. The store handle is
//! expected to be opened once per process and shared as an `Arc`.

pub mod conflict;
pub mod coordinator;
pub mod error;
pub mod identity;
pub mod report;

mod live;

pub use conflict::LiveConflictView;
pub use coordinator::{BookingForm, Coordinator};
pub use error::{Error, Result, ValidationError};
pub use report::{DailyReport, DeletionPolicy};

#[cfg(test)]
mod tests;
