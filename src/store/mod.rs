//! Durable deck storage
//!
//! One atomically-rewritten JSON document per unit, plus the path key
//! sanitizer and the per-unit locks that serialize read-modify-write
//! sequences against a deck.

mod deck_store;
pub mod locks;
pub mod paths;

pub use deck_store::{DeckStore, Result, StoreError};
pub use locks::UnitLocks;
pub use paths::unit_dir_key;
