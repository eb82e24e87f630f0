//! Payment gateway interface
//!
//! The core needs exactly one operation from the gateway: a form POST to a
//! fixed relative path that yields a loosely-typed JSON document. Responses
//! are only ever read through [`response`].

mod atlantic;
pub mod response;

pub use atlantic::AtlanticClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during a gateway exchange
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// No API key configured; nothing was sent
    #[error("Missing Atlantic API key")]
    MissingApiKey,
    /// Error during network communication
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success status returned by the gateway
    #[error("Atlantic API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Cleaned response body
        message: String,
    },
    /// Body could not be parsed as JSON
    #[error("Failed to parse Atlantic response: {0}")]
    Json(String),
}

/// Ordered form fields of a gateway request.
pub type FormFields = Vec<(String, String)>;

/// One signed request/response exchange with the payment gateway
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// POST `fields` form-encoded to `path` and return the parsed body
    async fn post(&self, path: &str, fields: FormFields) -> Result<Value, GatewayError>;
}

/// Relative paths of the Atlantic H2H API.
pub mod paths {
    /// Prepaid/postpaid price list
    pub const PRICE_LIST: &str = "/layanan/price_list";
    /// Postpaid bill inquiry
    pub const BILL_INQUIRY: &str = "/transaksi/tagihan";
    /// Postpaid bill payment
    pub const BILL_PAY: &str = "/transaksi/tagihan/bayar";
    /// Prepaid purchase
    pub const PURCHASE_CREATE: &str = "/transaksi/create";
    /// Transaction status
    pub const TRANSACTION_STATUS: &str = "/transaksi/status";
    /// Deposit methods
    pub const DEPOSIT_METHODS: &str = "/deposit/metode";
    /// Deposit creation
    pub const DEPOSIT_CREATE: &str = "/deposit/create";
    /// Deposit status
    pub const DEPOSIT_STATUS: &str = "/deposit/status";
    /// Deposit cancellation
    pub const DEPOSIT_CANCEL: &str = "/deposit/cancel";
    /// Instant deposit preview/processing
    pub const DEPOSIT_INSTANT: &str = "/deposit/instant";
    /// Transfer destination banks
    pub const TRANSFER_BANKS: &str = "/transfer/bank_list";
    /// Account holder lookup
    pub const TRANSFER_ACCOUNT_CHECK: &str = "/transfer/cek_rekening";
    /// Transfer creation
    pub const TRANSFER_CREATE: &str = "/transfer/create";
    /// Transfer status
    pub const TRANSFER_STATUS: &str = "/transfer/status";
    /// Account profile and balance
    pub const PROFILE: &str = "/get_profile";
}

/// Build [`FormFields`] from `(name, value)` pairs.
#[must_use]
pub fn form<const N: usize>(pairs: [(&str, String); N]) -> FormFields {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
