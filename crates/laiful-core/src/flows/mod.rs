//! Conversation flows.
//!
//! Each module owns the commands and free-text steps of one domain. Handlers
//! receive the [`Turn`] being processed and the locked session; they call the
//! gateway first and only mutate the session once the call succeeded.

pub mod deposit;
pub mod help;
pub mod menu;
pub mod postpaid;
pub mod prepaid;
pub mod profile;
pub mod status;
pub mod transfer;

use crate::error::ShopError;
use crate::format::parse_nominal;
use crate::gateway::FormFields;
use crate::presenter::{MenuRow, MenuSection, NativeMenu, QuickButton};
use crate::router::{Interaction, ParsedInput};
use crate::shop::Shop;
use serde_json::Value;

/// Maximum number of rows rendered in one list menu.
pub const MAX_ROWS: usize = 30;

/// Button returning to the main menu.
pub const MENU_BUTTON_ID: &str = ".ls_menu";

/// Quick button back to the main menu
#[must_use]
pub fn menu_button() -> QuickButton {
    QuickButton::new(MENU_BUTTON_ID, "MENU")
}

/// `CEK STATUS` button bound to `command`
pub(crate) fn status_button(command: &str) -> QuickButton {
    QuickButton::new(command, "CEK STATUS")
}

/// Single-section list menu, capped at [`MAX_ROWS`] rows
pub(crate) fn list_menu(
    caption: String,
    title: &str,
    section: String,
    rows: impl IntoIterator<Item = MenuRow>,
    quick_buttons: Vec<QuickButton>,
) -> NativeMenu {
    NativeMenu {
        caption,
        title: title.to_string(),
        sections: vec![MenuSection {
            title: section,
            highlight_label: None,
            rows: rows.into_iter().take(MAX_ROWS).collect(),
        }],
        quick_buttons,
    }
}

/// Sticky id, or NotFound with `missing`
pub(crate) fn sticky(id: Option<&String>, missing: &str) -> Result<String, ShopError> {
    id.cloned()
        .ok_or_else(|| ShopError::NotFound(missing.to_string()))
}

/// One interaction being processed
pub(crate) struct Turn<'a> {
    pub shop: &'a Shop,
    pub interaction: &'a Interaction,
    pub input: &'a ParsedInput,
}

impl Turn<'_> {
    pub fn sender(&self) -> &str {
        &self.interaction.sender_id
    }

    pub async fn gate(&self) -> Result<(), ShopError> {
        self.shop.gate(self.sender()).await
    }

    /// Rate-gated gateway call.
    pub async fn gated_call(&self, path: &str, fields: FormFields) -> Result<Value, ShopError> {
        self.gate().await?;
        self.shop.call(path, fields).await
    }

    /// Raw input read as a positive nominal.
    pub fn nominal(&self, invalid: &str) -> Result<u64, ShopError> {
        parse_nominal(&self.input.raw).ok_or_else(|| ShopError::Validation(invalid.to_string()))
    }

    pub async fn text(&self, text: &str) -> Result<(), ShopError> {
        self.shop
            .presenter
            .send_text(&self.interaction.chat_id, text)
            .await?;
        Ok(())
    }

    pub async fn buttons(&self, caption: &str, buttons: &[QuickButton]) -> Result<(), ShopError> {
        self.shop
            .presenter
            .send_buttons(&self.interaction.chat_id, caption, buttons)
            .await?;
        Ok(())
    }

    /// Caption with only the menu button.
    pub async fn with_menu(&self, caption: &str) -> Result<(), ShopError> {
        self.buttons(caption, &[menu_button()]).await
    }

    /// Result of a submission: caption, status button and menu button.
    pub async fn receipt(&self, caption: &str, status_command: &str) -> Result<(), ShopError> {
        self.buttons(caption, &[status_button(status_command), menu_button()])
            .await
    }

    pub async fn menu(&self, menu: &NativeMenu) -> Result<(), ShopError> {
        self.shop
            .presenter
            .send_menu(&self.interaction.chat_id, menu)
            .await?;
        Ok(())
    }

    pub async fn image(&self, url: &str, caption: &str) -> Result<(), ShopError> {
        self.shop
            .presenter
            .send_image(&self.interaction.chat_id, url, caption)
            .await?;
        Ok(())
    }
}
