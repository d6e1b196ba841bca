//! Platform-neutral order confirmation record handed to the mapper.

use serde::{Deserialize, Serialize};

/// A confirmed order with the identity signals captured at checkout.
///
/// Every identity field is optional: partial data still yields a usable
/// conversion event, it just matches fewer users.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub customer_ip: Option<String>,
    pub user_agent: Option<String>,
    /// `_fbp` browser id cookie.
    pub browser_id: Option<String>,
    /// `_fbc` click id cookie.
    pub click_id: Option<String>,
    pub external_id: Option<String>,
    pub customer_email: Option<String>,
    pub shipping_phone: Option<String>,
    pub event_source_url: Option<String>,
    pub total_amount: f64,
    /// Currency the platform priced the order in. Informational only.
    pub currency: Option<String>,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    pub product_key: String,
    pub quantity: u32,
    pub unit_price: Option<f64>,
}

impl OrderConfirmation {
    pub fn new(order_id: impl Into<String>, total_amount: f64) -> Self {
        Self {
            order_id: order_id.into(),
            total_amount,
            ..Default::default()
        }
    }

    pub fn item_count(&self) -> u64 {
        self.line_items.iter().map(|l| l.quantity as u64).sum()
    }
}

impl LineItem {
    pub fn new(product_key: impl Into<String>, quantity: u32, unit_price: Option<f64>) -> Self {
        Self {
            product_key: product_key.into(),
            quantity,
            unit_price,
        }
    }
}
