//! Translation of a webhook invocation's result into an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_conversions::Acknowledgment;
use relay_core::RelayError;
use serde::{Deserialize, Serialize};

pub const EVENT_HANDLED: &str = "event handled";

/// JSON body returned to the webhook sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub message: String,
}

impl WebhookResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseOutcome {
    pub status: StatusCode,
    pub body: WebhookResponse,
}

/// 200 on acknowledgment; every failure is a 500 carrying the error text.
pub fn to_response_outcome(result: &Result<Acknowledgment, RelayError>) -> ResponseOutcome {
    match result {
        Ok(_) => ResponseOutcome {
            status: StatusCode::OK,
            body: WebhookResponse::new(EVENT_HANDLED),
        },
        Err(e) => ResponseOutcome {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: WebhookResponse::new(e.to_string()),
        },
    }
}

impl IntoResponse for ResponseOutcome {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
