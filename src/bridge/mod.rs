//! The card-ingestion bridge
//!
//! Glues the pipeline together: validate, resolve identity, check for a
//! duplicate, attempt live delivery, then persist. An accepted submission
//! always reaches a terminal stored state — delivered, pending or failed —
//! even when the review application is down.

mod response;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::cards::{
    card_id, content_hash, validate, Card, CardSubmission, DeliveryStatus, Unit, ValidationError,
};
use crate::config::BridgeConfig;
use crate::delivery::{DeliveryEndpoint, DeliveryOutcome, NotePayload};
use crate::queue::{PendingEntry, PendingQueue, SweepReport, Sweeper};
use crate::store::{unit_dir_key, DeckStore, StoreError, UnitLocks};

pub use response::AddCardResponse;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("duplicate of card {existing_id} ({status}) in {unit}")]
    Duplicate {
        existing_id: String,
        status: DeliveryStatus,
        unit: Unit,
    },

    #[error("review app rejected the card: {reason}")]
    Rejected { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Terminal state reached by an accepted submission
#[derive(Debug, Clone)]
pub enum AddOutcome {
    /// The review application took the card synchronously
    Delivered { card_id: String, remote_id: String },
    /// Stored locally with a queued redelivery obligation
    Queued { card_id: String },
}

pub struct CardBridge {
    store: DeckStore,
    locks: Arc<UnitLocks>,
    queue_path: PathBuf,
    config: BridgeConfig,
}

impl CardBridge {
    pub fn new(data_dir: PathBuf, config: BridgeConfig) -> Self {
        let queue_path = data_dir.join("queue.json");
        Self {
            store: DeckStore::new(data_dir),
            locks: Arc::new(UnitLocks::new()),
            queue_path,
            config,
        }
    }

    /// Accept one card submission.
    ///
    /// Validation and the duplicate check reject before any mutation. After
    /// that the submission is committed: a transient delivery failure is
    /// absorbed into the pending path, never surfaced as a hard failure. Only
    /// a remote rejection or a storage failure comes back as an error.
    pub fn add_card(
        &self,
        endpoint: &dyn DeliveryEndpoint,
        submission: &CardSubmission,
    ) -> Result<AddOutcome> {
        let valid = validate(submission)?;

        let unit = Unit::new(valid.course.clone(), valid.module.clone());
        let hash = content_hash(&valid.front, &valid.back);
        let id = card_id(&hash);

        let lock = self.locks.for_unit(&unit_dir_key(&unit));
        let _guard = lock.lock().unwrap();

        if let Some((existing_id, status)) = self.store.find_duplicate(&unit, &hash)? {
            log::debug!("Rejecting duplicate of {} in {}", existing_id, unit);
            return Err(BridgeError::Duplicate {
                existing_id,
                status,
                unit,
            });
        }

        let mut card = Card {
            id: id.clone(),
            unit: unit.clone(),
            front: valid.front,
            back: valid.back,
            tags: valid.tags,
            difficulty: valid.difficulty,
            source: valid.source,
            content_hash: hash,
            created_at: Utc::now(),
            delivery_status: DeliveryStatus::Pending,
        };

        match endpoint.deliver(&NotePayload::for_card(&card)) {
            DeliveryOutcome::Delivered { remote_id } => {
                card.delivery_status = DeliveryStatus::Delivered;
                self.store.append_card(card)?;
                log::info!("Delivered {} in {} (remote note {})", id, unit, remote_id);
                Ok(AddOutcome::Delivered {
                    card_id: id,
                    remote_id,
                })
            }
            DeliveryOutcome::Transient { reason } => {
                // Queue entry first, deck second: a crash between the two
                // leaves a harmless orphan entry instead of a pending card
                // with no retry obligation.
                let mut queue = PendingQueue::load(&self.queue_path)?;
                queue.push(PendingEntry::new(id.clone(), &unit, reason.clone()));
                queue.save(&self.queue_path)?;

                self.store.append_card(card)?;
                log::info!("Queued {} in {} for redelivery: {}", id, unit, reason);
                Ok(AddOutcome::Queued { card_id: id })
            }
            DeliveryOutcome::Fatal { reason } => {
                // Structural rejection of the payload: nothing is stored, the
                // caller gets the error and can fix the content.
                log::warn!("Review app rejected {} in {}: {}", id, unit, reason);
                Err(BridgeError::Rejected { reason })
            }
        }
    }

    /// One pass of the retry sweeper over the pending queue
    pub fn sweep(&self, endpoint: &dyn DeliveryEndpoint) -> crate::store::Result<SweepReport> {
        Sweeper::new(
            &self.store,
            &self.locks,
            &self.queue_path,
            self.config.retry_base_delay_secs,
            self.config.max_attempts,
        )
        .sweep(endpoint)
    }

    pub fn list_units(&self) -> crate::store::Result<Vec<Unit>> {
        self.store.list_units()
    }

    pub fn list_cards(&self, unit: &Unit) -> crate::store::Result<Vec<Card>> {
        Ok(self.store.load_deck(unit)?.cards)
    }

    pub fn pending_count(&self) -> crate::store::Result<usize> {
        Ok(PendingQueue::load(&self.queue_path)?.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;

    /// Endpoint stub with a switchable fixed outcome
    struct FixedEndpoint {
        outcome: Mutex<DeliveryOutcome>,
        reachable: bool,
    }

    impl FixedEndpoint {
        fn delivered() -> Self {
            Self {
                outcome: Mutex::new(DeliveryOutcome::Delivered {
                    remote_id: "1501".to_string(),
                }),
                reachable: true,
            }
        }

        fn unreachable() -> Self {
            Self {
                outcome: Mutex::new(DeliveryOutcome::Transient {
                    reason: "connection refused".to_string(),
                }),
                reachable: false,
            }
        }

        fn rejecting(reason: &str) -> Self {
            Self {
                outcome: Mutex::new(DeliveryOutcome::Fatal {
                    reason: reason.to_string(),
                }),
                reachable: true,
            }
        }

        fn set(&self, outcome: DeliveryOutcome) {
            *self.outcome.lock().unwrap() = outcome;
        }
    }

    impl DeliveryEndpoint for FixedEndpoint {
        fn deliver(&self, _note: &NotePayload) -> DeliveryOutcome {
            self.outcome.lock().unwrap().clone()
        }

        fn probe(&self) -> bool {
            self.reachable
        }
    }

    fn bridge() -> (TempDir, CardBridge) {
        let dir = TempDir::new().unwrap();
        let bridge = CardBridge::new(dir.path().to_path_buf(), BridgeConfig {
            retry_base_delay_secs: 0,
            ..BridgeConfig::default()
        });
        (dir, bridge)
    }

    fn submission() -> CardSubmission {
        CardSubmission {
            course: "Anatomy".to_string(),
            module: "Chapter 5".to_string(),
            front: "What is the origin of the biceps?".to_string(),
            back: "The long head originates from the supraglenoid tubercle.".to_string(),
            tags: vec!["anatomy".to_string()],
            difficulty: "medium".to_string(),
            source: "lecture notes".to_string(),
        }
    }

    fn unit() -> Unit {
        Unit::new("Anatomy", "Chapter 5")
    }

    #[test]
    fn reachable_endpoint_delivers_synchronously() {
        let (_dir, bridge) = bridge();
        let outcome = bridge
            .add_card(&FixedEndpoint::delivered(), &submission())
            .unwrap();

        let AddOutcome::Delivered { card_id, remote_id } = outcome else {
            panic!("expected delivered outcome");
        };
        assert_eq!(remote_id, "1501");

        let cards = bridge.list_cards(&unit()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, card_id);
        assert_eq!(cards[0].delivery_status, DeliveryStatus::Delivered);
        assert_eq!(bridge.pending_count().unwrap(), 0);
    }

    #[test]
    fn unreachable_endpoint_stores_pending_and_queues() {
        let (_dir, bridge) = bridge();
        let outcome = bridge
            .add_card(&FixedEndpoint::unreachable(), &submission())
            .unwrap();

        assert!(matches!(outcome, AddOutcome::Queued { .. }));
        let cards = bridge.list_cards(&unit()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].delivery_status, DeliveryStatus::Pending);
        assert_eq!(bridge.pending_count().unwrap(), 1);
    }

    #[test]
    fn resubmission_is_rejected_as_duplicate() {
        let (_dir, bridge) = bridge();
        let endpoint = FixedEndpoint::delivered();
        let first = bridge.add_card(&endpoint, &submission()).unwrap();
        let AddOutcome::Delivered { card_id, .. } = first else {
            panic!("expected delivered outcome");
        };

        // Extra whitespace must not defeat the identity check
        let mut again = submission();
        again.front = "  What is the origin   of the biceps?".to_string();
        let err = bridge.add_card(&endpoint, &again).unwrap_err();

        let BridgeError::Duplicate {
            existing_id,
            status,
            ..
        } = err
        else {
            panic!("expected duplicate error");
        };
        assert_eq!(existing_id, card_id);
        assert_eq!(status, DeliveryStatus::Delivered);
        assert_eq!(bridge.list_cards(&unit()).unwrap().len(), 1);
    }

    #[test]
    fn same_content_in_another_module_is_accepted() {
        let (_dir, bridge) = bridge();
        let endpoint = FixedEndpoint::delivered();
        bridge.add_card(&endpoint, &submission()).unwrap();

        let mut other = submission();
        other.module = "Chapter 6".to_string();
        bridge.add_card(&endpoint, &other).unwrap();

        assert_eq!(bridge.list_units().unwrap().len(), 2);
    }

    #[test]
    fn invalid_submission_mutates_nothing() {
        let (_dir, bridge) = bridge();
        let mut bad = submission();
        bad.front = "Hi".to_string();

        let err = bridge
            .add_card(&FixedEndpoint::delivered(), &bad)
            .unwrap_err();
        let BridgeError::Validation(e) = err else {
            panic!("expected validation error");
        };
        assert!(e.violations.iter().any(|v| v.contains("front")));
        assert!(bridge.list_units().unwrap().is_empty());
        assert_eq!(bridge.pending_count().unwrap(), 0);
    }

    #[test]
    fn fatal_rejection_stores_nothing() {
        let (_dir, bridge) = bridge();
        let err = bridge
            .add_card(&FixedEndpoint::rejecting("empty field"), &submission())
            .unwrap_err();

        assert!(matches!(err, BridgeError::Rejected { .. }));
        assert!(bridge.list_units().unwrap().is_empty());
        assert_eq!(bridge.pending_count().unwrap(), 0);
    }

    #[test]
    fn sweep_delivers_a_queued_card_once_reachable() {
        let (_dir, bridge) = bridge();
        let endpoint = FixedEndpoint::unreachable();
        bridge.add_card(&endpoint, &submission()).unwrap();
        assert_eq!(bridge.pending_count().unwrap(), 1);

        endpoint.set(DeliveryOutcome::Delivered {
            remote_id: "1501".to_string(),
        });
        let report = bridge.sweep(&endpoint).unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(bridge.pending_count().unwrap(), 0);
        let cards = bridge.list_cards(&unit()).unwrap();
        assert_eq!(cards[0].delivery_status, DeliveryStatus::Delivered);
    }

    #[test]
    fn queued_then_delivered_card_is_never_duplicated() {
        let (_dir, bridge) = bridge();
        let endpoint = FixedEndpoint::unreachable();
        bridge.add_card(&endpoint, &submission()).unwrap();

        endpoint.set(DeliveryOutcome::Delivered {
            remote_id: "1501".to_string(),
        });
        bridge.sweep(&endpoint).unwrap();

        // Resubmitting after redelivery still hits the duplicate check
        let err = bridge.add_card(&endpoint, &submission()).unwrap_err();
        assert!(matches!(err, BridgeError::Duplicate { .. }));
        assert_eq!(bridge.list_cards(&unit()).unwrap().len(), 1);
    }

    #[test]
    fn response_shape_covers_every_outcome() {
        let (_dir, bridge) = bridge();
        let endpoint = FixedEndpoint::delivered();

        let delivered = bridge.add_card(&endpoint, &submission());
        let response = AddCardResponse::from_result(&delivered);
        assert!(response.success);
        assert_eq!(response.delivery_status, "delivered");
        assert!(response.card_id.is_some());

        let duplicate = bridge.add_card(&endpoint, &submission());
        let response = AddCardResponse::from_result(&duplicate);
        assert!(!response.success);
        assert_eq!(response.delivery_status, "duplicate");
        assert!(response.card_id.is_some());

        let mut bad = submission();
        bad.front = "Hi".to_string();
        let invalid = bridge.add_card(&endpoint, &bad);
        let response = AddCardResponse::from_result(&invalid);
        assert!(!response.success);
        assert_eq!(response.delivery_status, "error");
        assert_eq!(response.errors.len(), 1);
    }

    #[test]
    fn queued_response_reports_pending() {
        let (_dir, bridge) = bridge();
        let queued = bridge.add_card(&FixedEndpoint::unreachable(), &submission());
        let response = AddCardResponse::from_result(&queued);
        assert!(response.success);
        assert_eq!(response.delivery_status, "pending");
    }
}
