//! Purchase event mapping and delivery to the advertising conversions API.

pub mod client;
pub mod mapper;
pub mod wire;

pub use client::{ConversionsClient, GraphApiClient};
pub use mapper::{validate, PurchaseEventMapper};
pub use wire::Acknowledgment;
