use serde::Deserialize;

use crate::error::{RelayError, RelayResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `CONVERSIONS_RELAY__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub conversions: ConversionsConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Inbound webhook settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// Shared secret for the `saleor-signature` HMAC. Unset disables the check.
    #[serde(default)]
    pub signature_secret: Option<String>,
}

/// Credentials and endpoint for the advertising conversions API.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionsConfig {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub pixel_id: String,
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Routes events to the Events Manager "Test events" tab when set.
    #[serde(default)]
    pub test_event_code: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    /// Currency reported on every purchase, regardless of the order's own.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub event_id_strategy: EventIdStrategy,
}

/// How the outgoing event id is derived from the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventIdStrategy {
    /// `{order_id}_Purchase_{unix_seconds}`; deduplicates only within one second.
    #[default]
    Timestamped,
    /// `{order_id}_Purchase`; stable across redeliveries of the same order.
    PerOrder,
}

// Default functions
fn default_node_id() -> String {
    "relay-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    3000
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_webhook_path() -> String {
    "/api/webhooks/order-confirmed".to_string()
}
fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}
fn default_api_version() -> String {
    "v18.0".to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_currency() -> String {
    "MXN".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: default_webhook_path(),
            signature_secret: None,
        }
    }
}

impl Default for ConversionsConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            pixel_id: String::new(),
            base_url: default_graph_base_url(),
            api_version: default_api_version(),
            test_event_code: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            event_id_strategy: EventIdStrategy::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            webhook: WebhookConfig::default(),
            conversions: ConversionsConfig::default(),
            mapping: MappingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("CONVERSIONS_RELAY")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Reject configurations that cannot reach the conversions API.
    pub fn validate(&self) -> RelayResult<()> {
        if self.conversions.access_token.trim().is_empty() {
            return Err(RelayError::Config(
                "conversions.access_token must not be empty".to_string(),
            ));
        }
        if self.conversions.pixel_id.trim().is_empty() {
            return Err(RelayError::Config(
                "conversions.pixel_id must not be empty".to_string(),
            ));
        }
        if self.mapping.currency.trim().is_empty() {
            return Err(RelayError::Config(
                "mapping.currency must not be empty".to_string(),
            ));
        }
        if !self.webhook.path.starts_with('/') {
            return Err(RelayError::Config(format!(
                "webhook.path must start with '/', got {:?}",
                self.webhook.path
            )));
        }
        Ok(())
    }
}
