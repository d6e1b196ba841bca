//! Normalized purchase event handed to the conversions client.

use serde::{Deserialize, Serialize};

pub const PURCHASE_EVENT_NAME: &str = "Purchase";
pub const PRODUCT_CONTENT_TYPE: &str = "product";

/// Where the conversion happened, as understood by the advertising platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    Website,
}

impl ActionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionSource::Website => "website",
        }
    }
}

/// A server-side purchase conversion. Built fresh per webhook call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub event_id: String,
    pub event_name: String,
    pub event_time: i64,
    pub user_data: UserIdentity,
    pub custom_data: PurchaseData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
    pub action_source: ActionSource,
}

/// Identity signals used for matching. Absent fields are omitted, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseData {
    pub contents: Vec<Content>,
    pub currency: String,
    pub value: f64,
    pub content_type: String,
    pub content_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub quantity: u32,
    pub item_price: f64,
}

impl UserIdentity {
    /// Number of populated identity signals.
    pub fn signal_count(&self) -> usize {
        [
            &self.client_ip_address,
            &self.client_user_agent,
            &self.fbp,
            &self.fbc,
            &self.external_id,
            &self.email,
            &self.phone,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }
}
