//! Rendering interface consumed by the flows.
//!
//! The core only ever speaks these four primitives; transports decide how
//! buttons and menus look on their platform.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Quick-reply button: label plus the id fed back as input when pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickButton {
    /// Input sent back when pressed
    pub id: String,
    /// Visible label
    pub text: String,
}

impl QuickButton {
    /// Create a button
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Selectable row of a native menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRow {
    /// Visible title
    pub title: String,
    /// Input sent back when selected
    pub id: String,
}

impl MenuRow {
    /// Create a row
    #[must_use]
    pub fn new(title: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            id: id.into(),
        }
    }
}

/// Titled group of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSection {
    /// Section title
    pub title: String,
    /// Optional highlight badge
    pub highlight_label: Option<String>,
    /// Rows in display order
    pub rows: Vec<MenuRow>,
}

/// Caption, sections and quick buttons rendered as one selectable menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeMenu {
    /// Message caption
    pub caption: String,
    /// Title of the list picker
    pub title: String,
    /// Sections of selectable rows
    pub sections: Vec<MenuSection>,
    /// Quick buttons shown next to the picker
    pub quick_buttons: Vec<QuickButton>,
}

impl NativeMenu {
    /// Total number of selectable rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

/// Outbound rendering to the user's chat
///
/// `chat_id` is the opaque chat identifier supplied by the transport.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Plain text message
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;

    /// Caption with quick-reply buttons
    async fn send_buttons(&self, chat_id: &str, caption: &str, buttons: &[QuickButton])
        -> Result<()>;

    /// Sectioned list menu
    async fn send_menu(&self, chat_id: &str, menu: &NativeMenu) -> Result<()>;

    /// Image fetched from `url`; falls back to sending `caption` as text
    async fn send_image(&self, chat_id: &str, url: &str, caption: &str) -> Result<()>;
}
