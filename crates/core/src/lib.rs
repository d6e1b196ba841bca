pub mod config;
pub mod error;
pub mod event;
pub mod order;
pub mod saleor;

pub use config::AppConfig;
pub use error::{RelayError, RelayResult, TransmissionError, ValidationError};
pub use event::PurchaseEvent;
pub use order::{LineItem, OrderConfirmation};
