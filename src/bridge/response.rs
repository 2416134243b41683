//! Boundary response shape for the add-card operation.
//!
//! Front ends (chat tool, dashboard) consume this flattened shape rather
//! than the library's typed outcome, so the mapping lives in one place.

use serde::Serialize;

use super::{AddOutcome, BridgeError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCardResponse {
    pub success: bool,
    pub card_id: Option<String>,
    pub message: String,
    /// One of `delivered`, `pending`, `duplicate`, `error`
    pub delivery_status: String,
    pub errors: Vec<String>,
}

impl AddCardResponse {
    pub fn from_result(result: &Result<AddOutcome, BridgeError>) -> Self {
        match result {
            Ok(AddOutcome::Delivered { card_id, remote_id }) => Self {
                success: true,
                card_id: Some(card_id.clone()),
                message: format!("card delivered to review app (note {})", remote_id),
                delivery_status: "delivered".to_string(),
                errors: Vec::new(),
            },
            Ok(AddOutcome::Queued { card_id }) => Self {
                success: true,
                card_id: Some(card_id.clone()),
                message: "review app unreachable; card stored and queued for redelivery"
                    .to_string(),
                delivery_status: "pending".to_string(),
                errors: Vec::new(),
            },
            Err(BridgeError::Validation(e)) => Self {
                success: false,
                card_id: None,
                message: "submission failed validation".to_string(),
                delivery_status: "error".to_string(),
                errors: e.violations.clone(),
            },
            Err(BridgeError::Duplicate {
                existing_id,
                status,
                unit,
            }) => Self {
                success: false,
                card_id: Some(existing_id.clone()),
                message: format!(
                    "identical card already accepted for {} (currently {})",
                    unit, status
                ),
                delivery_status: "duplicate".to_string(),
                errors: Vec::new(),
            },
            Err(e) => Self {
                success: false,
                card_id: None,
                message: e.to_string(),
                delivery_status: "error".to_string(),
                errors: vec![e.to_string()],
            },
        }
    }
}
