#![warn(clippy::unwrap_used)]

pub mod outcome;
pub mod rest;
pub mod server;
pub mod signature;

pub use outcome::{to_response_outcome, ResponseOutcome, WebhookResponse};
pub use rest::AppState;
pub use server::ApiServer;
