//! Conversions API client — sends one purchase event per call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relay_core::config::ConversionsConfig;
use relay_core::{PurchaseEvent, RelayError, RelayResult, TransmissionError};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::wire::{Acknowledgment, EventRequest, GraphErrorEnvelope, ServerEvent};

/// Delivers purchase events to the advertising platform.
///
/// Implementations make a single attempt; redelivery is left to the webhook
/// sender upstream.
#[async_trait]
pub trait ConversionsClient: Send + Sync {
    async fn send(&self, event: &PurchaseEvent) -> Result<Acknowledgment, TransmissionError>;
}

/// Graph API conversions client.
#[derive(Clone)]
pub struct GraphApiClient {
    config: Arc<ConversionsConfig>,
    http_client: Client,
}

impl GraphApiClient {
    pub fn new(config: ConversionsConfig) -> RelayResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            pixel_id = %config.pixel_id,
            api_version = %config.api_version,
            test_mode = config.test_event_code.is_some(),
            "Conversions API client initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    pub fn events_url(&self) -> String {
        format!(
            "{}/{}/{}/events",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            self.config.pixel_id
        )
    }
}

#[async_trait]
impl ConversionsClient for GraphApiClient {
    async fn send(&self, event: &PurchaseEvent) -> Result<Acknowledgment, TransmissionError> {
        let body = EventRequest {
            data: vec![ServerEvent::from_event(event)],
            access_token: &self.config.access_token,
            test_event_code: self.config.test_event_code.as_deref(),
        };

        debug!(event_id = %event.event_id, "Sending purchase event");

        let response = self
            .http_client
            .post(self.events_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransmissionError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransmissionError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GraphErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            warn!(
                event_id = %event.event_id,
                status = status.as_u16(),
                error = %message,
                "Conversions API rejected event"
            );
            metrics::counter!("conversions.rejected").increment(1);
            return Err(TransmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let ack: Acknowledgment =
            serde_json::from_str(&text).map_err(|e| TransmissionError::Decode(e.to_string()))?;

        info!(
            event_id = %event.event_id,
            events_received = ack.events_received,
            fbtrace_id = ?ack.fbtrace_id,
            "Conversions API accepted event"
        );

        Ok(ack)
    }
}
