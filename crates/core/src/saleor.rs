//! Saleor `ORDER_CONFIRMED` subscription payload.
//!
//! The subscription query aliases single-key `metafields(keys: ...)`
//! selections, so each identity signal arrives as an optional object keyed by
//! the metafield name, e.g. `"fbp": { "_fbp": "fb.1.1700000000.123" }`.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::order::{LineItem, OrderConfirmation};

/// Metafield keys read from the order.
pub mod keys {
    pub const FBP: &str = "_fbp";
    pub const FBC: &str = "_fbc";
    pub const IP: &str = "ip";
    pub const EXTERNAL_ID: &str = "f_external_id";
    pub const USER_AGENT: &str = "userAgent";
    pub const EVENT_URL: &str = "eventURL";
}

pub type Metafields = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderConfirmedPayload {
    #[serde(default)]
    pub order: Option<SaleorOrder>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleorOrder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fbp: Option<Metafields>,
    #[serde(default)]
    pub fbc: Option<Metafields>,
    #[serde(default)]
    pub ip: Option<Metafields>,
    #[serde(default, rename = "f_external_id")]
    pub external_id: Option<Metafields>,
    #[serde(default)]
    pub user_agent: Option<Metafields>,
    #[serde(default, rename = "eventURL")]
    pub event_url: Option<Metafields>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<SaleorAddress>,
    #[serde(default)]
    pub total: Option<SaleorTaxedMoney>,
    #[serde(default)]
    pub lines: Vec<SaleorOrderLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleorAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub country_area: Option<String>,
    #[serde(default)]
    pub street_address1: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleorTaxedMoney {
    #[serde(default)]
    pub gross: SaleorMoney,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleorMoney {
    /// Null or missing amounts are treated as unknown, never as a parse failure.
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleorOrderLine {
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub total_price: Option<SaleorTaxedMoney>,
    #[serde(default)]
    pub variant: Option<SaleorVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleorVariant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pricing: Option<SaleorVariantPricing>,
    #[serde(default)]
    pub product: SaleorProduct,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleorVariantPricing {
    #[serde(default)]
    pub price: Option<SaleorTaxedMoney>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleorProduct {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Look up `key` in an aliased metafield selection. Blank values count as absent.
fn metafield(fields: &Option<Metafields>, key: &str) -> Option<String> {
    fields
        .as_ref()
        .and_then(|f| f.get(key))
        .and_then(|v| v.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl From<&SaleorOrderLine> for LineItem {
    fn from(line: &SaleorOrderLine) -> Self {
        let product_key = line
            .variant
            .as_ref()
            .map(|v| v.product.slug.clone())
            .unwrap_or_default();
        let unit_price = line
            .variant
            .as_ref()
            .and_then(|v| v.pricing.as_ref())
            .and_then(|p| p.price.as_ref())
            .and_then(|price| price.gross.amount);

        LineItem {
            product_key,
            quantity: line.quantity,
            unit_price,
        }
    }
}

impl From<SaleorOrder> for OrderConfirmation {
    fn from(order: SaleorOrder) -> Self {
        let (total_amount, currency) = match &order.total {
            Some(total) => (total.gross.amount.unwrap_or(0.0), total.currency.clone()),
            None => (0.0, None),
        };

        OrderConfirmation {
            customer_ip: metafield(&order.ip, keys::IP),
            user_agent: metafield(&order.user_agent, keys::USER_AGENT),
            browser_id: metafield(&order.fbp, keys::FBP),
            click_id: metafield(&order.fbc, keys::FBC),
            external_id: metafield(&order.external_id, keys::EXTERNAL_ID),
            event_source_url: metafield(&order.event_url, keys::EVENT_URL),
            customer_email: order.user_email,
            shipping_phone: order.shipping_address.and_then(|a| a.phone),
            total_amount,
            currency,
            line_items: order.lines.iter().map(LineItem::from).collect(),
            order_id: order.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> serde_json::Value {
        json!({
            "order": {
                "fbp": { "_fbp": "fb.1.1700000000000.1234567890" },
                "fbc": { "_fbc": "fb.1.1700000000000.AbCdEf" },
                "ip": { "ip": "203.0.113.7" },
                "f_external_id": { "f_external_id": "cust-991" },
                "userAgent": { "userAgent": "Mozilla/5.0" },
                "eventURL": { "eventURL": "https://shop.example.com/checkout" },
                "userEmail": "Buyer@Example.com",
                "id": "T3JkZXI6MTIz",
                "shippingAddress": {
                    "firstName": "Ana",
                    "lastName": "Ruiz",
                    "countryArea": "CDMX",
                    "streetAddress1": "Av. Reforma 1",
                    "phone": "+525512345678"
                },
                "total": { "gross": { "amount": 450.5 }, "currency": "MXN" },
                "lines": [
                    {
                        "quantity": 2,
                        "totalPrice": { "gross": { "amount": 300.0 } },
                        "variant": {
                            "pricing": { "price": { "gross": { "amount": 150.0 } } },
                            "id": "UHJvZHVjdFZhcmlhbnQ6MQ==",
                            "product": { "id": "UHJvZHVjdDox", "slug": "cafe-de-olla", "name": "Café de olla" }
                        }
                    },
                    {
                        "quantity": 1,
                        "totalPrice": { "gross": { "amount": 150.5 } },
                        "variant": {
                            "pricing": null,
                            "id": "UHJvZHVjdFZhcmlhbnQ6Mg==",
                            "product": { "id": "UHJvZHVjdDoy", "slug": "taza", "name": "Taza" }
                        }
                    }
                ]
            }
        })
    }

    #[test]
    fn test_full_payload_conversion() {
        let payload: OrderConfirmedPayload = serde_json::from_value(full_payload()).unwrap();
        let order = OrderConfirmation::from(payload.order.unwrap());

        assert_eq!(order.order_id, "T3JkZXI6MTIz");
        assert_eq!(order.customer_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(order.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(order.browser_id.as_deref(), Some("fb.1.1700000000000.1234567890"));
        assert_eq!(order.click_id.as_deref(), Some("fb.1.1700000000000.AbCdEf"));
        assert_eq!(order.external_id.as_deref(), Some("cust-991"));
        assert_eq!(
            order.event_source_url.as_deref(),
            Some("https://shop.example.com/checkout")
        );
        assert_eq!(order.customer_email.as_deref(), Some("Buyer@Example.com"));
        assert_eq!(order.shipping_phone.as_deref(), Some("+525512345678"));
        assert_eq!(order.total_amount, 450.5);
        assert_eq!(order.currency.as_deref(), Some("MXN"));

        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0], LineItem::new("cafe-de-olla", 2, Some(150.0)));
        assert_eq!(order.line_items[1], LineItem::new("taza", 1, None));
    }

    #[test]
    fn test_null_order() {
        let payload: OrderConfirmedPayload =
            serde_json::from_value(json!({ "order": null })).unwrap();
        assert!(payload.order.is_none());

        let payload: OrderConfirmedPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.order.is_none());
    }

    #[test]
    fn test_missing_metafields_are_absent() {
        let payload: OrderConfirmedPayload = serde_json::from_value(json!({
            "order": {
                "id": "T3JkZXI6NDU2",
                "fbp": null,
                "fbc": {},
                "ip": { "ip": null },
                "userAgent": { "userAgent": "   " },
                "total": { "gross": { "amount": 0.0 }, "currency": "MXN" },
                "lines": []
            }
        }))
        .unwrap();
        let order = OrderConfirmation::from(payload.order.unwrap());

        assert!(order.browser_id.is_none());
        assert!(order.click_id.is_none());
        assert!(order.customer_ip.is_none());
        assert!(order.user_agent.is_none());
        assert!(order.external_id.is_none());
        assert!(order.event_source_url.is_none());
        assert!(order.customer_email.is_none());
        assert!(order.shipping_phone.is_none());
        assert!(order.line_items.is_empty());
    }

    #[test]
    fn test_null_or_missing_amounts() {
        let payload: OrderConfirmedPayload = serde_json::from_value(json!({
            "order": {
                "id": "o1",
                "total": { "gross": { "amount": null }, "currency": "MXN" },
                "lines": [
                    {
                        "quantity": 1,
                        "variant": {
                            "pricing": { "price": { "gross": { "amount": null } } },
                            "product": { "slug": "x" }
                        }
                    },
                    {
                        "quantity": 2,
                        "variant": {
                            "pricing": { "price": { "gross": {} } },
                            "product": { "slug": "y" }
                        }
                    }
                ]
            }
        }))
        .unwrap();
        let order = OrderConfirmation::from(payload.order.unwrap());

        assert_eq!(order.total_amount, 0.0);
        assert_eq!(
            order.line_items,
            vec![LineItem::new("x", 1, None), LineItem::new("y", 2, None)]
        );
    }

    #[test]
    fn test_line_without_variant() {
        let payload: OrderConfirmedPayload = serde_json::from_value(json!({
            "order": {
                "id": "T3JkZXI6Nzg5",
                "total": { "gross": { "amount": 10.0 }, "currency": "MXN" },
                "lines": [ { "quantity": 3, "variant": null } ]
            }
        }))
        .unwrap();
        let order = OrderConfirmation::from(payload.order.unwrap());

        assert_eq!(order.line_items, vec![LineItem::new("", 3, None)]);
    }
}
