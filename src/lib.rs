//! cardbridge — durable flashcard ingestion bridge.
//!
//! Accepts structured card submissions, deduplicates them per unit
//! (course + module), and pushes them to a local review application when it
//! is reachable. When it is not, the card is persisted locally and queued
//! for redelivery; a sweep drains the queue later. No accepted card is ever
//! silently lost and no identical card is stored twice within a unit.

pub mod bridge;
pub mod cards;
pub mod config;
pub mod delivery;
pub mod queue;
pub mod store;

pub use bridge::{AddCardResponse, AddOutcome, BridgeError, CardBridge};
pub use cards::{Card, CardSubmission, DeliveryStatus, Difficulty, Unit};
pub use config::BridgeConfig;
pub use delivery::{AnkiConnectClient, DeliveryEndpoint, DeliveryOutcome};
pub use queue::{PendingQueue, SweepReport};
pub use store::{DeckStore, StoreError};
