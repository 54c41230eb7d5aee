//! Error types for the twinv-core library.

use thiserror::Error;

/// Main error type for the twinv library.
#[derive(Error, Debug)]
pub enum TwinvError {
    /// E-invoice decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Barcode recognition error.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Hard failures while decoding an e-invoice payload.
///
/// Missing fields are never errors; they are defaulted and reported through
/// [`TaiwanInvoice::defaulted_fields`](crate::TaiwanInvoice::defaulted_fields).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The scanned payload was empty or whitespace.
    #[error("Empty QR code data")]
    Empty,

    /// The payload decoded to text without any non-blank line.
    #[error("No data found in QR code")]
    NoData,

    /// Neither receipt QR code produced a record.
    #[error("No valid QR codes found")]
    NoQrCodes,
}

/// Errors raised by individual recognition stages.
///
/// The chain itself never fails: a stage error is logged and the next
/// resolver is tried.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// HTTP transport failure.
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("unexpected status {status} from {service}")]
    Status { service: String, status: u16 },

    /// Model response did not carry any content.
    #[error("no response content from model")]
    EmptyResponse,

    /// Model stage is not configured (missing API key).
    #[error("model not configured: {0}")]
    NotConfigured(String),

    /// Response body could not be interpreted.
    #[error("failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },
}

/// Result type for the twinv library.
pub type Result<T> = std::result::Result<T, TwinvError>;
