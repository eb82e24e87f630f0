//! The shop service.
//!
//! Owns every process-scoped registry (sessions, rate timestamps, caches)
//! and the two collaborators. Built once at startup and shared behind an
//! `Arc`; nothing outside this crate mutates the registries directly.

use crate::cache::{LatestSnapshot, ShortLivedCache};
use crate::catalog::{parse_products, Bank, DepositMethod, Product, ProductType};
use crate::config::ShopSettings;
use crate::error::ShopError;
use crate::gateway::{form, paths, response, FormFields, GatewayClient, GatewayError};
use crate::presenter::Presenter;
use crate::rate_limit::RateLimiter;
use crate::router::{self, Interaction};
use crate::session::SessionStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Conversation engine for one shop instance
pub struct Shop {
    pub(crate) gateway: Arc<dyn GatewayClient>,
    pub(crate) presenter: Arc<dyn Presenter>,
    pub(crate) sessions: SessionStore,
    pub(crate) rate_limiter: RateLimiter,
    pub(crate) price_lists: ShortLivedCache<ProductType, Arc<Vec<Product>>>,
    pub(crate) deposit_methods: LatestSnapshot<DepositMethod>,
    pub(crate) banks: LatestSnapshot<Bank>,
}

impl Shop {
    /// Create a shop wired to the given gateway and presenter.
    #[must_use]
    pub fn new(
        settings: &ShopSettings,
        gateway: Arc<dyn GatewayClient>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            gateway,
            presenter,
            sessions: SessionStore::new(settings.session_ttl()),
            rate_limiter: RateLimiter::new(settings.rate_limit()),
            price_lists: ShortLivedCache::new(
                settings.price_cache_ttl(),
                settings.price_cache_max_size,
            ),
            deposit_methods: LatestSnapshot::new(),
            banks: LatestSnapshot::new(),
        }
    }

    /// Handle one inbound interaction to completion.
    ///
    /// Failures are reported to the user and logged; nothing is returned.
    pub async fn handle(&self, interaction: &Interaction) {
        router::route(self, interaction).await;
    }

    /// Session registry, for inspection by hosts and tests
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Rate-limit gate for network-triggering turns.
    pub(crate) async fn gate(&self, sender: &str) -> Result<(), ShopError> {
        let wait = self.rate_limiter.check(sender).await;
        if wait.is_zero() {
            Ok(())
        } else {
            Err(ShopError::RateLimited(wait))
        }
    }

    /// One gateway exchange; no retries.
    pub(crate) async fn call(&self, path: &str, fields: FormFields) -> Result<Value, ShopError> {
        debug!(path = %path, "Gateway call");
        Ok(self.gateway.post(path, fields).await?)
    }

    /// Price list of `kind`, served from the cache while fresh.
    pub(crate) async fn price_list(&self, kind: ProductType) -> Result<Arc<Vec<Product>>, ShopError> {
        let gateway = Arc::clone(&self.gateway);
        let products = self
            .price_lists
            .get_or_fetch(kind, || async move {
                debug!(kind = kind.as_str(), "Fetching price list");
                let res = gateway
                    .post(paths::PRICE_LIST, form([("type", kind.as_str().to_string())]))
                    .await?;
                Ok::<_, GatewayError>(Arc::new(parse_products(response::list(&res))))
            })
            .await?;
        Ok(products)
    }
}
