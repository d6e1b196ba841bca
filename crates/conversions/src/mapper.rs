//! Purchase event mapper — validates an order confirmation and reshapes it
//! into the conversions API's purchase event.

use relay_core::config::{EventIdStrategy, MappingConfig};
use relay_core::event::{
    ActionSource, Content, PurchaseData, PurchaseEvent, UserIdentity, PRODUCT_CONTENT_TYPE,
    PURCHASE_EVENT_NAME,
};
use relay_core::{OrderConfirmation, ValidationError};

/// Accept any present order with an id. Missing identity fields pass through.
pub fn validate(order: Option<OrderConfirmation>) -> Result<OrderConfirmation, ValidationError> {
    let order = order.ok_or(ValidationError::MissingOrder)?;
    if order.order_id.trim().is_empty() {
        return Err(ValidationError::MissingOrderId);
    }
    Ok(order)
}

/// Builds purchase events for a single-currency deployment.
#[derive(Debug, Clone)]
pub struct PurchaseEventMapper {
    currency: String,
    event_id_strategy: EventIdStrategy,
}

impl PurchaseEventMapper {
    pub fn new(config: &MappingConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            event_id_strategy: config.event_id_strategy,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Map a validated order into a purchase event captured at `current_unix_time`.
    pub fn map(&self, order: &OrderConfirmation, current_unix_time: i64) -> PurchaseEvent {
        let contents = order
            .line_items
            .iter()
            .map(|line| Content {
                id: line.product_key.clone(),
                quantity: line.quantity,
                item_price: line.unit_price.unwrap_or(0.0),
            })
            .collect();

        let content_ids = order
            .line_items
            .iter()
            .map(|line| line.product_key.clone())
            .collect();

        PurchaseEvent {
            event_id: event_id(&order.order_id, self.event_id_strategy, current_unix_time),
            event_name: PURCHASE_EVENT_NAME.to_string(),
            event_time: current_unix_time,
            user_data: UserIdentity {
                client_ip_address: order.customer_ip.clone(),
                client_user_agent: order.user_agent.clone(),
                fbp: order.browser_id.clone(),
                fbc: order.click_id.clone(),
                external_id: order.external_id.clone(),
                email: normalize_email(order.customer_email.as_deref()),
                phone: order.shipping_phone.clone().filter(|p| !p.is_empty()),
            },
            custom_data: PurchaseData {
                contents,
                currency: self.currency.clone(),
                value: order.total_amount,
                content_type: PRODUCT_CONTENT_TYPE.to_string(),
                content_ids,
            },
            event_source_url: order.event_source_url.clone(),
            action_source: ActionSource::Website,
        }
    }

    /// The order's own currency when it disagrees with the reported one.
    pub fn currency_mismatch<'a>(&self, order: &'a OrderConfirmation) -> Option<&'a str> {
        order
            .currency
            .as_deref()
            .filter(|c| !c.eq_ignore_ascii_case(&self.currency))
    }
}

pub fn event_id(order_id: &str, strategy: EventIdStrategy, current_unix_time: i64) -> String {
    match strategy {
        EventIdStrategy::Timestamped => {
            format!("{order_id}_{PURCHASE_EVENT_NAME}_{current_unix_time}")
        }
        EventIdStrategy::PerOrder => format!("{order_id}_{PURCHASE_EVENT_NAME}"),
    }
}

/// Trimmed, lower-cased email, or `None` when nothing is left.
pub fn normalize_email(email: Option<&str>) -> Option<String> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}
