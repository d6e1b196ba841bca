//! REST handlers for the order-confirmed webhook and operational endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_conversions::{validate, Acknowledgment, ConversionsClient, PurchaseEventMapper};
use relay_core::saleor::OrderConfirmedPayload;
use relay_core::{OrderConfirmation, RelayError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::outcome::{to_response_outcome, WebhookResponse};
use crate::signature::{self, SIGNATURE_HEADER};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub mapper: Arc<PurchaseEventMapper>,
    pub client: Arc<dyn ConversionsClient>,
    pub signature_secret: Option<Arc<str>>,
    pub node_id: String,
    pub start_time: Instant,
}

/// POST /api/webhooks/order-confirmed — Saleor `ORDER_CONFIRMED` delivery.
pub async fn handle_order_confirmed(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    metrics::counter!("webhook.received").increment(1);
    info!(bytes = body.len(), "Order confirmed webhook received");

    if let Some(secret) = &state.signature_secret {
        let header = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        if let Err(e) = signature::verify(secret.as_bytes(), &body, header) {
            warn!(error = %e, "Webhook signature rejected");
            metrics::counter!("webhook.unauthorized").increment(1);
            return (StatusCode::UNAUTHORIZED, Json(WebhookResponse::new(e.to_string())))
                .into_response();
        }
    }

    let payload: OrderConfirmedPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Webhook payload could not be parsed");
            metrics::counter!("webhook.invalid_payload").increment(1);
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::new(format!("Invalid payload: {e}"))),
            )
                .into_response();
        }
    };

    let result = relay_order(&state, payload, chrono::Utc::now().timestamp()).await;
    if let Err(e) = &result {
        error!(error = %e, "Order confirmed webhook failed");
    }

    to_response_outcome(&result).into_response()
}

/// Validate, map and transmit one order. Exactly one delivery attempt.
pub async fn relay_order(
    state: &AppState,
    payload: OrderConfirmedPayload,
    current_unix_time: i64,
) -> Result<Acknowledgment, RelayError> {
    let order = validate(payload.order.map(OrderConfirmation::from)).inspect_err(|e| {
        warn!(error = %e, "Order confirmation rejected");
        metrics::counter!("webhook.invalid_order").increment(1);
    })?;

    if let Some(order_currency) = state.mapper.currency_mismatch(&order) {
        warn!(
            order_id = %order.order_id,
            order_currency = %order_currency,
            reported_currency = %state.mapper.currency(),
            "Order currency differs from reported currency"
        );
    }

    let event = state.mapper.map(&order, current_unix_time);

    info!(
        order_id = %order.order_id,
        event_id = %event.event_id,
        line_items = order.line_items.len(),
        total_quantity = order.item_count(),
        identity_signals = event.user_data.signal_count(),
        "Forwarding purchase event"
    );

    match state.client.send(&event).await {
        Ok(ack) => {
            metrics::counter!("conversions.sent").increment(1);
            Ok(ack)
        }
        Err(e) => {
            metrics::counter!("conversions.errors").increment(1);
            Err(e.into())
        }
    }
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}
