//! Atlantic H2H client
//!
//! Form-encoded POSTs with the API key injected as the first field.

use super::{FormFields, GatewayClient, GatewayError};
use crate::config::ShopSettings;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, warn};

/// Longest error body kept in a [`GatewayError::Api`] message.
const MAX_ERROR_BODY: usize = 500;

/// `reqwest`-backed [`GatewayClient`] for the Atlantic H2H API
pub struct AtlanticClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl AtlanticClient {
    /// Creates a client from shop settings.
    ///
    /// A missing API key is not fatal: the client is still built, and every
    /// call fails with [`GatewayError::MissingApiKey`].
    #[must_use]
    pub fn new(settings: &ShopSettings) -> Self {
        if settings.atlantic_api_key.is_none() {
            warn!("ATLANTIC_API_KEY is not set. Gateway requests will fail.");
        }

        let mut builder = HttpClient::builder();
        if let Some(timeout) = settings.gateway_timeout() {
            builder = builder.timeout(timeout);
        }

        Self {
            http: builder.build().unwrap_or_else(|_| HttpClient::new()),
            base_url: settings.atlantic_base_url.trim_end_matches('/').to_string(),
            api_key: settings.atlantic_api_key.clone(),
        }
    }
}

#[async_trait]
impl GatewayClient for AtlanticClient {
    async fn post(&self, path: &str, fields: FormFields) -> Result<Value, GatewayError> {
        let api_key = self.api_key.as_ref().ok_or(GatewayError::MissingApiKey)?;

        let mut body = Vec::with_capacity(fields.len() + 1);
        body.push(("api_key".to_string(), api_key.clone()));
        body.extend(fields);

        let url = format!("{}{path}", self.base_url);
        debug!(path = %path, "Atlantic request");

        let response = self
            .http
            .post(&url)
            .form(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: clean_error_body(&text, status.canonical_reason()),
            });
        }

        serde_json::from_str(&text).map_err(|_| GatewayError::Json(truncate(&text)))
    }
}

/// Summarise an error body: HTML pages from proxies are dropped, long bodies truncated.
fn clean_error_body(text: &str, reason: Option<&str>) -> String {
    let trimmed = text.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return "Server returned HTML error page".to_string();
    }
    if text.trim().is_empty() {
        return reason.unwrap_or("no body").to_string();
    }
    truncate(text)
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_ERROR_BODY {
        let head: String = text.chars().take(MAX_ERROR_BODY).collect();
        format!("{head}... (truncated)")
    } else {
        text.to_string()
    }
}
