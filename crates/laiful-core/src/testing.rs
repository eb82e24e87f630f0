use crate::config::ShopSettings;
use crate::gateway::MockGatewayClient;
use crate::presenter::{NativeMenu, Presenter, QuickButton};
use crate::router::Interaction;
use crate::shop::Shop;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Sender used by the unit-test helpers.
pub const SENDER: &str = "628111";

/// One rendered reply
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Plain text
    Text(String),
    /// Caption with buttons
    Buttons {
        /// Caption
        caption: String,
        /// Buttons
        buttons: Vec<QuickButton>,
    },
    /// List menu
    Menu(NativeMenu),
    /// Image
    Image {
        /// Image URL
        url: String,
        /// Fallback caption
        caption: String,
    },
}

impl Rendered {
    /// Text or caption of the reply
    #[must_use]
    pub fn caption(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Buttons { caption, .. } | Self::Image { caption, .. } => caption,
            Self::Menu(menu) => &menu.caption,
        }
    }

    /// Ids of the buttons or quick buttons attached to the reply
    #[must_use]
    pub fn button_ids(&self) -> Vec<&str> {
        match self {
            Self::Buttons { buttons, .. } => buttons.iter().map(|b| b.id.as_str()).collect(),
            Self::Menu(menu) => menu.quick_buttons.iter().map(|b| b.id.as_str()).collect(),
            Self::Text(_) | Self::Image { .. } => Vec::new(),
        }
    }
}

/// Presenter that records every reply
#[derive(Default)]
pub struct RecordingPresenter {
    sent: Mutex<Vec<Rendered>>,
}

impl RecordingPresenter {
    /// Every reply so far, oldest first
    pub async fn rendered(&self) -> Vec<Rendered> {
        self.sent.lock().await.clone()
    }

    /// Most recent reply
    pub async fn last(&self) -> Option<Rendered> {
        self.sent.lock().await.last().cloned()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn send_text(&self, _chat_id: &str, text: &str) -> Result<()> {
        self.sent.lock().await.push(Rendered::Text(text.to_string()));
        Ok(())
    }

    async fn send_buttons(&self, _chat_id: &str, caption: &str, buttons: &[QuickButton]) -> Result<()> {
        self.sent.lock().await.push(Rendered::Buttons {
            caption: caption.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }

    async fn send_menu(&self, _chat_id: &str, menu: &NativeMenu) -> Result<()> {
        self.sent.lock().await.push(Rendered::Menu(menu.clone()));
        Ok(())
    }

    async fn send_image(&self, _chat_id: &str, url: &str, caption: &str) -> Result<()> {
        self.sent.lock().await.push(Rendered::Image {
            url: url.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

/// Default settings with a dummy API key
#[must_use]
pub fn test_settings() -> ShopSettings {
    ShopSettings {
        atlantic_api_key: Some("test-key".to_string()),
        ..ShopSettings::default()
    }
}

/// Shop wired to a mock gateway and a recording presenter
#[must_use]
pub fn shop_with(gateway: MockGatewayClient) -> (Shop, Arc<RecordingPresenter>) {
    let presenter = Arc::new(RecordingPresenter::default());
    let shop = Shop::new(&test_settings(), Arc::new(gateway), presenter.clone());
    (shop, presenter)
}

/// Interaction from [`SENDER`]
#[must_use]
pub fn interaction(text: &str) -> Interaction {
    Interaction::new(SENDER, format!("{SENDER}@chat"), text)
}

/// Price-list row
#[must_use]
pub fn product_row(code: &str, name: &str, price: u64, category: &str) -> Value {
    json!({ "code": code, "name": name, "price": price, "category": category })
}

/// Value of `key` in a sent form
#[must_use]
pub fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
