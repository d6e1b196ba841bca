//! Graph API server-event encoding.
//!
//! Email, phone and external id leave the process as SHA-256 hex digests.
//! Everything else is sent as-is; absent fields are omitted.

use relay_core::event::{Content, PurchaseEvent};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Request body for `POST /{api_version}/{pixel_id}/events`.
#[derive(Debug, Clone, Serialize)]
pub struct EventRequest<'a> {
    pub data: Vec<ServerEvent<'a>>,
    pub access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_event_code: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerEvent<'a> {
    pub event_name: &'a str,
    pub event_time: i64,
    pub event_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<&'a str>,
    pub action_source: &'static str,
    pub user_data: WireUserData<'a>,
    pub custom_data: WireCustomData<'a>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WireUserData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub em: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireCustomData<'a> {
    pub contents: &'a [Content],
    pub currency: String,
    pub value: f64,
    pub content_type: &'a str,
    pub content_ids: &'a [String],
}

/// Successful events endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Acknowledgment {
    #[serde(default)]
    pub events_received: u32,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

/// Graph API error envelope: `{"error": {"message": ..., "code": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorEnvelope {
    pub error: GraphError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

impl<'a> ServerEvent<'a> {
    pub fn from_event(event: &'a PurchaseEvent) -> Self {
        let user = &event.user_data;
        Self {
            event_name: &event.event_name,
            event_time: event.event_time,
            event_id: &event.event_id,
            event_source_url: event.event_source_url.as_deref(),
            action_source: event.action_source.as_str(),
            user_data: WireUserData {
                client_ip_address: user.client_ip_address.as_deref(),
                client_user_agent: user.client_user_agent.as_deref(),
                fbp: user.fbp.as_deref(),
                fbc: user.fbc.as_deref(),
                external_id: user.external_id.as_deref().map(|id| vec![hash_value(id.trim())]),
                em: user.email.as_deref().map(|email| vec![hash_value(email)]),
                ph: user
                    .phone
                    .as_deref()
                    .map(phone_digits)
                    .filter(|digits| !digits.is_empty())
                    .map(|digits| vec![hash_value(&digits)]),
            },
            custom_data: WireCustomData {
                contents: &event.custom_data.contents,
                currency: event.custom_data.currency.to_lowercase(),
                value: event.custom_data.value,
                content_type: &event.custom_data.content_type,
                content_ids: &event.custom_data.content_ids,
            },
        }
    }
}

/// SHA-256 hex digest, skipping values that are already digests.
pub fn hash_value(value: &str) -> String {
    if is_sha256_hex(value) {
        return value.to_string();
    }
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::config::MappingConfig;
    use relay_core::{LineItem, OrderConfirmation};

    use crate::mapper::PurchaseEventMapper;

    // sha256("foo@bar.com")
    const FOO_BAR_SHA256: &str = "0c7e6a405862e402eb76a70f8a26fc732d07c32931e9fae9ab1582911d2e8a3b";

    fn event(order: &OrderConfirmation) -> PurchaseEvent {
        PurchaseEventMapper::new(&MappingConfig::default()).map(order, 1_700_000_000)
    }

    #[test]
    fn test_hash_value() {
        assert_eq!(hash_value("foo@bar.com"), FOO_BAR_SHA256);
        assert_eq!(hash_value(FOO_BAR_SHA256), FOO_BAR_SHA256);
        assert_ne!(hash_value("Foo@Bar.com"), FOO_BAR_SHA256);
    }

    #[test]
    fn test_full_event_encoding() {
        let mut order = OrderConfirmation::new("abc123", 300.0);
        order.customer_email = Some("Foo@Bar.com".to_string());
        order.shipping_phone = Some("+52 (55) 1234-5678".to_string());
        order.customer_ip = Some("203.0.113.7".to_string());
        order.browser_id = Some("fb.1.1700000000000.111".to_string());
        order.external_id = Some("cust-991".to_string());
        order.event_source_url = Some("https://shop.example.com/checkout".to_string());
        order.line_items = vec![LineItem::new("cafe-de-olla", 2, Some(150.0))];

        let event = event(&order);
        let json = serde_json::to_value(ServerEvent::from_event(&event)).unwrap();

        assert_eq!(json["event_name"], "Purchase");
        assert_eq!(json["event_id"], "abc123_Purchase_1700000000");
        assert_eq!(json["event_time"], 1_700_000_000);
        assert_eq!(json["action_source"], "website");
        assert_eq!(json["event_source_url"], "https://shop.example.com/checkout");

        let user = &json["user_data"];
        assert_eq!(user["client_ip_address"], "203.0.113.7");
        assert_eq!(user["fbp"], "fb.1.1700000000000.111");
        assert_eq!(user["em"], serde_json::json!([FOO_BAR_SHA256]));
        assert_eq!(user["ph"], serde_json::json!([hash_value("525512345678")]));
        assert_eq!(user["external_id"], serde_json::json!([hash_value("cust-991")]));
        assert!(user.get("fbc").is_none());
        assert!(user.get("client_user_agent").is_none());

        let custom = &json["custom_data"];
        assert_eq!(custom["currency"], "mxn");
        assert_eq!(custom["value"], 300.0);
        assert_eq!(custom["content_type"], "product");
        assert_eq!(custom["content_ids"], serde_json::json!(["cafe-de-olla"]));
        assert_eq!(
            custom["contents"],
            serde_json::json!([{ "id": "cafe-de-olla", "quantity": 2, "item_price": 150.0 }])
        );
    }

    #[test]
    fn test_sparse_event_omits_optional_fields() {
        let order = OrderConfirmation::new("sparse-1", 0.0);
        let event = event(&order);
        let json = serde_json::to_value(ServerEvent::from_event(&event)).unwrap();

        assert_eq!(json["user_data"], serde_json::json!({}));
        assert!(json.get("event_source_url").is_none());
        assert_eq!(json["custom_data"]["contents"], serde_json::json!([]));
    }

    #[test]
    fn test_request_envelope() {
        let event = event(&OrderConfirmation::new("abc123", 1.0));
        let request = EventRequest {
            data: vec![ServerEvent::from_event(&event)],
            access_token: "token",
            test_event_code: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["access_token"], "token");
        assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
        assert!(json.get("test_event_code").is_none());
    }

    #[test]
    fn test_parse_graph_error() {
        let body = r#"{"error":{"message":"Invalid OAuth access token.","type":"OAuthException","code":190,"fbtrace_id":"AbC"}}"#;
        let envelope: GraphErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.message, "Invalid OAuth access token.");
        assert_eq!(envelope.error.kind.as_deref(), Some("OAuthException"));
        assert_eq!(envelope.error.code, Some(190));
    }
}
