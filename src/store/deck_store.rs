//! Durable per-unit deck documents.
//!
//! Directory structure:
//! ```text
//! {data_dir}/decks/
//! └── {unit_dir_key}/
//!     └── deck.json    # {course, module, cards: [...]}
//! ```
//!
//! Every save writes to `deck.json.tmp` and renames it into place, so a
//! crash mid-write never leaves a half-written deck.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::paths::unit_dir_key;
use crate::cards::{Card, Deck, DeliveryStatus, Unit};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card not found: {card_id} in {unit}")]
    CardNotFound { unit: Unit, card_id: String },

    #[error("Illegal status transition for {card_id}: {from} -> {to}")]
    IllegalTransition {
        card_id: String,
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage manager for deck documents
pub struct DeckStore {
    base_path: PathBuf,
}

impl DeckStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Default data directory (e.g. ~/.local/share/cardbridge)
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("cardbridge"))
            .ok_or(StoreError::DataDirNotFound)
    }

    fn decks_dir(&self) -> PathBuf {
        self.base_path.join("decks")
    }

    fn deck_dir(&self, unit: &Unit) -> PathBuf {
        self.decks_dir().join(unit_dir_key(unit))
    }

    fn deck_path(&self, unit: &Unit) -> PathBuf {
        self.deck_dir(unit).join("deck.json")
    }

    /// Load the deck for a unit, or an empty deck if none exists yet
    pub fn load_deck(&self, unit: &Unit) -> Result<Deck> {
        let path = self.deck_path(unit);
        if !path.exists() {
            return Ok(Deck::new(unit));
        }
        let content = fs::read_to_string(&path)?;
        let deck: Deck = serde_json::from_str(&content)?;
        Ok(deck)
    }

    /// Save a deck using atomic write (write to .tmp then rename)
    pub fn save_deck(&self, deck: &Deck) -> Result<()> {
        let unit = deck.unit();
        fs::create_dir_all(self.deck_dir(&unit))?;
        let path = self.deck_path(&unit);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(deck)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Scan a unit's deck for a content hash. Returns the existing card's id
    /// and current status so callers can tell already-delivered from
    /// already-pending.
    pub fn find_duplicate(
        &self,
        unit: &Unit,
        content_hash: &str,
    ) -> Result<Option<(String, DeliveryStatus)>> {
        let deck = self.load_deck(unit)?;
        Ok(deck
            .cards
            .iter()
            .find(|c| c.content_hash == content_hash)
            .map(|c| (c.id.clone(), c.delivery_status)))
    }

    /// Append an accepted card to its unit's deck
    pub fn append_card(&self, card: Card) -> Result<()> {
        let unit = card.unit.clone();
        let mut deck = self.load_deck(&unit)?;
        deck.cards.push(card);
        self.save_deck(&deck)
    }

    /// Look up a single card by id
    pub fn get_card(&self, unit: &Unit, card_id: &str) -> Result<Option<Card>> {
        let deck = self.load_deck(unit)?;
        Ok(deck.cards.iter().find(|c| c.id == card_id).cloned())
    }

    /// Move a card to a new delivery status, enforcing the legal transition
    /// set (a delivered card never reverts)
    pub fn update_status(&self, unit: &Unit, card_id: &str, next: DeliveryStatus) -> Result<()> {
        let mut deck = self.load_deck(unit)?;
        let card = deck
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| StoreError::CardNotFound {
                unit: unit.clone(),
                card_id: card_id.to_string(),
            })?;

        if !card.delivery_status.can_become(next) {
            return Err(StoreError::IllegalTransition {
                card_id: card_id.to_string(),
                from: card.delivery_status,
                to: next,
            });
        }

        card.delivery_status = next;
        self.save_deck(&deck)
    }

    /// List every unit that has a deck document
    pub fn list_units(&self) -> Result<Vec<Unit>> {
        let decks_dir = self.decks_dir();
        if !decks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut units = Vec::new();
        for entry in fs::read_dir(&decks_dir)? {
            let entry = entry?;
            let path = entry.path().join("deck.json");
            if !path.exists() {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let deck: Deck = serde_json::from_str(&content)?;
            units.push(deck.unit());
        }

        units.sort_by(|a, b| (&a.course, &a.module).cmp(&(&b.course, &b.module)));
        Ok(units)
    }
}
