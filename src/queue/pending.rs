//! The durable queue of cards awaiting redelivery.
//!
//! Entries are lightweight references plus retry bookkeeping; card content
//! lives only in the deck store. The document is persisted independently of
//! deck documents and written with the same tmp-then-rename idiom, because
//! losing it means losing retry obligations.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Unit;
use crate::store::Result;

/// One queued redelivery obligation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEntry {
    pub card_id: String,
    pub course: String,
    pub module: String,
    pub enqueued_at: DateTime<Utc>,
    /// Number of failed retries so far; drives the backoff window
    #[serde(default)]
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// When the most recent attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl PendingEntry {
    pub fn new(card_id: String, unit: &Unit, error: String) -> Self {
        Self {
            card_id,
            course: unit.course.clone(),
            module: unit.module.clone(),
            enqueued_at: Utc::now(),
            attempts: 0,
            last_error: Some(error),
            last_attempt_at: Some(Utc::now()),
        }
    }

    pub fn unit(&self) -> Unit {
        Unit::new(self.course.clone(), self.module.clone())
    }

    /// Eligible once `attempts * base_delay` has elapsed since the last
    /// failed attempt
    pub fn is_eligible(&self, now: DateTime<Utc>, base_delay_secs: u64) -> bool {
        match self.last_attempt_at {
            Some(t) => {
                let waited = now.signed_duration_since(t).num_seconds().max(0) as u64;
                waited >= self.attempts as u64 * base_delay_secs
            }
            None => true,
        }
    }
}

/// Ordered queue of pending redeliveries, persisted as one JSON document
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PendingQueue {
    pub entries: Vec<PendingEntry>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, replacing any stale entry for the same card
    pub fn push(&mut self, entry: PendingEntry) {
        self.entries.retain(|e| {
            e.card_id != entry.card_id || e.course != entry.course || e.module != entry.module
        });
        self.entries.push(entry);
    }

    /// Drop the entry for a card (delivery succeeded or was abandoned)
    pub fn remove(&mut self, unit: &Unit, card_id: &str) {
        self.entries.retain(|e| {
            e.card_id != card_id || e.course != unit.course || e.module != unit.module
        });
    }

    /// Record one more failed retry for a card
    pub fn record_failure(&mut self, unit: &Unit, card_id: &str, error: String) {
        if let Some(entry) = self.entries.iter_mut().find(|e| {
            e.card_id == card_id && e.course == unit.course && e.module == unit.module
        }) {
            entry.attempts += 1;
            entry.last_error = Some(error);
            entry.last_attempt_at = Some(Utc::now());
        }
    }

    /// Load queue from file (empty if the file does not exist yet)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let queue: Self = serde_json::from_str(&content)?;
        Ok(queue)
    }

    /// Save queue using atomic write (write to .tmp then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}
