//! Delivery to the external review application
//!
//! The `DeliveryEndpoint` trait is the seam: the bridge and the sweeper see
//! only classified outcomes, and tests substitute a stub endpoint. The
//! `AnkiConnectClient` is the one real implementation.

mod anki_connect;
mod endpoint;

pub use anki_connect::AnkiConnectClient;
pub use endpoint::{DeliveryEndpoint, DeliveryOutcome, NotePayload};
