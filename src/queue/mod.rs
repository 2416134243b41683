//! Pending redelivery queue and its sweeper
//!
//! The queue holds retry obligations for cards that could not reach the
//! review application; the sweeper drains it on demand with per-attempt
//! exponential backoff.

mod pending;
mod sweeper;

pub use pending::{PendingEntry, PendingQueue};
pub use sweeper::{SweepReport, Sweeper};
