//! Data models for cards and the units that scope them

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `(course, module)` pair that scopes deduplication and storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub course: String,
    pub module: String,
}

impl Unit {
    pub fn new(course: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            module: module.into(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.course, self.module)
    }
}

/// Difficulty rating assigned by the submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// Where a card stands with respect to the external review application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Accepted by the review application
    Delivered,
    /// Stored locally, awaiting redelivery
    Pending,
    /// Redelivery abandoned (remote rejection or retries exhausted)
    Failed,
}

impl DeliveryStatus {
    /// Legal transitions: pending → delivered, pending → failed.
    /// Delivered and failed are terminal.
    pub fn can_become(self, next: DeliveryStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Delivered) | (Self::Pending, Self::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Pending => write!(f, "pending"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A flashcard record, owned by the deck store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Deterministic, derived from the content hash — stable across retries
    pub id: String,
    #[serde(flatten)]
    pub unit: Unit,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    /// Free-text provenance tag
    #[serde(default)]
    pub source: String,
    /// Hash of normalized front|back, the identity and dedup key
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub delivery_status: DeliveryStatus,
}

/// The durable per-unit container of accepted cards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub course: String,
    pub module: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(unit: &Unit) -> Self {
        Self {
            course: unit.course.clone(),
            module: unit.module.clone(),
            cards: Vec::new(),
        }
    }

    pub fn unit(&self) -> Unit {
        Unit::new(self.course.clone(), self.module.clone())
    }
}

/// Raw submission fields as received at the boundary, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSubmission {
    pub course: String,
    pub module: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub difficulty: String,
    #[serde(default)]
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn delivered_and_failed_are_terminal() {
        assert!(DeliveryStatus::Pending.can_become(DeliveryStatus::Delivered));
        assert!(DeliveryStatus::Pending.can_become(DeliveryStatus::Failed));
        assert!(!DeliveryStatus::Delivered.can_become(DeliveryStatus::Pending));
        assert!(!DeliveryStatus::Delivered.can_become(DeliveryStatus::Failed));
        assert!(!DeliveryStatus::Failed.can_become(DeliveryStatus::Delivered));
    }

    #[test]
    fn unit_displays_as_course_module() {
        let unit = Unit::new("Anatomy", "Chapter 5");
        assert_eq!(unit.to_string(), "Anatomy::Chapter 5");
    }
}
