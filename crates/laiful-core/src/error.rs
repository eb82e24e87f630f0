//! Failures of a single interaction.
//!
//! Every variant is turned into a user message by the router; none of them
//! outlive the interaction that raised it.

use crate::format::wait_message;
use crate::gateway::GatewayError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while handling one interaction
#[derive(Debug, Error)]
pub enum ShopError {
    /// Sender hit the cooldown; carries the remaining wait
    #[error("rate limited for {0:?}")]
    RateLimited(Duration),
    /// Malformed input; the message re-prompts the user
    #[error("validation failed: {0}")]
    Validation(String),
    /// Referenced category, product, bill or sticky id is absent
    #[error("not found: {0}")]
    NotFound(String),
    /// Gateway exchange failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Rendering back to the user failed
    #[error("presenter error: {0}")]
    Presenter(#[from] anyhow::Error),
}

impl ShopError {
    /// Text shown to the user, or `None` when nothing can be shown.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::RateLimited(wait) => Some(wait_message(*wait)),
            Self::Validation(msg) | Self::NotFound(msg) => Some(msg.clone()),
            Self::Gateway(e) => Some(format!("Transaksi gagal diproses.\n{e}")),
            Self::Presenter(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let wait = ShopError::RateLimited(Duration::from_millis(1234));
        assert_eq!(
            wait.user_message().as_deref(),
            Some("Tunggu 1.3s sebelum melanjutkan.")
        );

        let missing = ShopError::NotFound("Produk tidak ditemukan.".to_string());
        assert_eq!(missing.user_message().as_deref(), Some("Produk tidak ditemukan."));

        let gateway = ShopError::from(GatewayError::MissingApiKey);
        assert_eq!(
            gateway.user_message().as_deref(),
            Some("Transaksi gagal diproses.\nMissing Atlantic API key")
        );

        let presenter = ShopError::from(anyhow::anyhow!("send failed"));
        assert!(presenter.user_message().is_none());
    }
}
