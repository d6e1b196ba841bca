use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transmission(#[from] TransmissionError),
}

/// Reasons an inbound order confirmation cannot be turned into an event.
/// Missing identity or address fields are never errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing order")]
    MissingOrder,

    #[error("Missing order id")]
    MissingOrderId,
}

/// Failures reported by the conversions API client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransmissionError {
    #[error("Conversions API request failed: {0}")]
    Http(String),

    #[error("Conversions API rejected event (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Conversions API response could not be decoded: {0}")]
    Decode(String),
}
