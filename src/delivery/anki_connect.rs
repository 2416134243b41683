//! Client for the review application's local AnkiConnect-style API.
//!
//! Speaks the `{action, version, params}` JSON protocol on a local HTTP
//! endpoint. Reachability is never guaranteed; every request is bounded by
//! the configured timeouts and a transport failure is reported as a
//! transient outcome rather than an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::endpoint::{DeliveryEndpoint, DeliveryOutcome, NotePayload};

/// Protocol version the endpoint is expected to speak
const API_VERSION: u16 = 6;

/// Note model used for plain front/back cards
const MODEL_NAME: &str = "Basic";

#[derive(Serialize)]
struct ApiRequest<P: Serialize> {
    action: &'static str,
    version: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<P>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddNoteParams {
    note: Note,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Note {
    deck_name: String,
    model_name: &'static str,
    fields: NoteFields,
    options: NoteOptions,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct NoteFields {
    #[serde(rename = "Front")]
    front: String,
    #[serde(rename = "Back")]
    back: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteOptions {
    allow_duplicate: bool,
}

pub struct AnkiConnectClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl AnkiConnectClient {
    pub fn new(
        endpoint: String,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }

    fn post<P: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        action: &'static str,
        params: Option<P>,
    ) -> Result<ApiResponse<T>, DeliveryOutcome> {
        let request = ApiRequest {
            action,
            version: API_VERSION,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| DeliveryOutcome::Transient {
                reason: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(DeliveryOutcome::Transient {
                reason: format!("server error: {}", status),
            });
        }
        if status.is_client_error() {
            return Err(DeliveryOutcome::Fatal {
                reason: format!("request rejected: {}", status),
            });
        }

        // A garbled body from a local endpoint usually means it is mid-restart;
        // classify as transient and let the sweeper decide when to give up.
        response
            .json::<ApiResponse<T>>()
            .map_err(|e| DeliveryOutcome::Transient {
                reason: format!("unparseable response: {}", e),
            })
    }
}

impl DeliveryEndpoint for AnkiConnectClient {
    fn deliver(&self, note: &NotePayload) -> DeliveryOutcome {
        let params = AddNoteParams {
            note: Note {
                deck_name: note.deck_name.clone(),
                model_name: MODEL_NAME,
                fields: NoteFields {
                    front: note.front.clone(),
                    back: note.back.clone(),
                },
                options: NoteOptions {
                    allow_duplicate: false,
                },
                tags: note.tags.clone(),
            },
        };

        let response: ApiResponse<u64> = match self.post("addNote", Some(params)) {
            Ok(r) => r,
            Err(outcome) => return outcome,
        };

        match response {
            ApiResponse {
                result: Some(id),
                error: None,
            } => DeliveryOutcome::Delivered {
                remote_id: id.to_string(),
            },
            ApiResponse {
                error: Some(reason),
                ..
            } => DeliveryOutcome::Fatal { reason },
            _ => DeliveryOutcome::Transient {
                reason: "response carried neither result nor error".to_string(),
            },
        }
    }

    fn probe(&self) -> bool {
        let response: Result<ApiResponse<u16>, _> = self.post::<(), u16>("version", None);
        matches!(
            response,
            Ok(ApiResponse {
                result: Some(_),
                error: None,
            })
        )
    }
}
