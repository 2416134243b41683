//! Card model, structural validation and content identity
//!
//! This module provides:
//! - The card/deck data model and the unit key that scopes them
//! - Submission validation (all violations collected in one pass)
//! - The normalized content hash that makes retries idempotent

pub mod identity;
pub mod models;
pub mod validate;

pub use identity::{card_id, content_hash};
pub use models::*;
pub use validate::{validate, ValidSubmission, ValidationError};
