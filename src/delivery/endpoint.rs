//! The delivery seam between the bridge and the external review application.
//!
//! A single attempt either lands, fails in a way worth retrying, or fails in
//! a way that never will succeed (the remote rejected the payload itself).
//! Retry policy lives with the queue sweeper, never here.

use serde::Serialize;

use crate::cards::Card;

/// The shape the review application expects for one note
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    /// `course::module`
    pub deck_name: String,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
}

impl NotePayload {
    pub fn for_card(card: &Card) -> Self {
        Self {
            deck_name: card.unit.to_string(),
            front: card.front.clone(),
            back: card.back.clone(),
            tags: card.tags.clone(),
        }
    }
}

/// Classified result of one delivery attempt
#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    /// The review application accepted the note
    Delivered { remote_id: String },
    /// Transport-level failure (unreachable, timeout, server error) —
    /// eligible for retry
    Transient { reason: String },
    /// The review application rejected the payload — retrying is pointless
    Fatal { reason: String },
}

/// A live endpoint of the external review application
pub trait DeliveryEndpoint {
    /// One bounded-time delivery attempt
    fn deliver(&self, note: &NotePayload) -> DeliveryOutcome;

    /// Cheap reachability check, used as the gate for a sweep
    fn probe(&self) -> bool;
}
