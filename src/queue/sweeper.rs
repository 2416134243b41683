//! Queue drain: re-attempts delivery for every eligible pending entry.
//!
//! A sweep runs on explicit invocation, in enqueue order, taking the same
//! per-unit lock the accept path holds so it never races an in-flight
//! submission. The queue document is saved after every entry mutation, so an
//! interrupted sweep loses at most the attempt that was in flight.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::pending::PendingQueue;
use crate::cards::DeliveryStatus;
use crate::delivery::{DeliveryEndpoint, DeliveryOutcome, NotePayload};
use crate::store::{unit_dir_key, DeckStore, Result, UnitLocks};

/// Outcome counts for one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries delivered and removed
    pub delivered: usize,
    /// Entries that failed transiently and stay queued
    pub retried: usize,
    /// Entries abandoned (fatal rejection or retries exhausted)
    pub failed: usize,
    /// Entries still inside their backoff window
    pub skipped: usize,
    /// Stale entries referencing no pending card
    pub dropped: usize,
}

pub struct Sweeper<'a> {
    store: &'a DeckStore,
    locks: &'a UnitLocks,
    queue_path: PathBuf,
    base_delay_secs: u64,
    max_attempts: u32,
}

impl<'a> Sweeper<'a> {
    pub fn new(
        store: &'a DeckStore,
        locks: &'a UnitLocks,
        queue_path: &Path,
        base_delay_secs: u64,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            locks,
            queue_path: queue_path.to_path_buf(),
            base_delay_secs,
            max_attempts,
        }
    }

    /// One pass over the pending queue
    pub fn sweep(&self, endpoint: &dyn DeliveryEndpoint) -> Result<SweepReport> {
        let mut queue = PendingQueue::load(&self.queue_path)?;
        let mut report = SweepReport::default();

        log::info!("Sweep: starting with {} queued entries", queue.len());

        for entry in queue.entries.clone() {
            let unit = entry.unit();

            if !entry.is_eligible(Utc::now(), self.base_delay_secs) {
                log::debug!(
                    "Sweep: {} in {} still backing off (attempt {})",
                    entry.card_id,
                    unit,
                    entry.attempts
                );
                report.skipped += 1;
                continue;
            }

            let lock = self.locks.for_unit(&unit_dir_key(&unit));
            let _guard = lock.lock().unwrap();

            // The entry may be stale: the accept path enqueues before the deck
            // write, so a crash in that window leaves an entry with no card.
            let card = match self.store.get_card(&unit, &entry.card_id)? {
                Some(card) if card.delivery_status == DeliveryStatus::Pending => card,
                Some(card) => {
                    log::warn!(
                        "Sweep: dropping entry for {} in {} (card already {})",
                        entry.card_id,
                        unit,
                        card.delivery_status
                    );
                    queue.remove(&unit, &entry.card_id);
                    queue.save(&self.queue_path)?;
                    report.dropped += 1;
                    continue;
                }
                None => {
                    log::warn!(
                        "Sweep: dropping orphan entry for {} in {} (no stored card)",
                        entry.card_id,
                        unit
                    );
                    queue.remove(&unit, &entry.card_id);
                    queue.save(&self.queue_path)?;
                    report.dropped += 1;
                    continue;
                }
            };

            match endpoint.deliver(&NotePayload::for_card(&card)) {
                DeliveryOutcome::Delivered { remote_id } => {
                    log::info!(
                        "Sweep: delivered {} in {} (remote note {})",
                        entry.card_id,
                        unit,
                        remote_id
                    );
                    // Deck first: a crash between the two writes leaves a
                    // stale entry, which the next sweep drops harmlessly.
                    self.store
                        .update_status(&unit, &entry.card_id, DeliveryStatus::Delivered)?;
                    queue.remove(&unit, &entry.card_id);
                    queue.save(&self.queue_path)?;
                    report.delivered += 1;
                }
                DeliveryOutcome::Transient { reason } => {
                    let attempts_after = entry.attempts + 1;
                    if attempts_after >= self.max_attempts {
                        log::warn!(
                            "Sweep: {} in {} exhausted {} attempts, marking failed: {}",
                            entry.card_id,
                            unit,
                            attempts_after,
                            reason
                        );
                        self.store
                            .update_status(&unit, &entry.card_id, DeliveryStatus::Failed)?;
                        queue.remove(&unit, &entry.card_id);
                        report.failed += 1;
                    } else {
                        log::debug!(
                            "Sweep: {} in {} failed transiently (attempt {}): {}",
                            entry.card_id,
                            unit,
                            attempts_after,
                            reason
                        );
                        queue.record_failure(&unit, &entry.card_id, reason);
                        report.retried += 1;
                    }
                    queue.save(&self.queue_path)?;
                }
                DeliveryOutcome::Fatal { reason } => {
                    log::warn!(
                        "Sweep: {} in {} rejected by review app, marking failed: {}",
                        entry.card_id,
                        unit,
                        reason
                    );
                    self.store
                        .update_status(&unit, &entry.card_id, DeliveryStatus::Failed)?;
                    queue.remove(&unit, &entry.card_id);
                    queue.save(&self.queue_path)?;
                    report.failed += 1;
                }
            }
        }

        log::info!(
            "Sweep: done ({} delivered, {} retried, {} failed, {} skipped, {} dropped)",
            report.delivered,
            report.retried,
            report.failed,
            report.skipped,
            report.dropped
        );

        Ok(report)
    }
}
