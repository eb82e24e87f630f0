//! Inline keyboards for quick buttons and list menus.
//!
//! Button ids become callback data verbatim, so a press comes back to the
//! router exactly as if the id had been typed.

use laiful_core::presenter::{NativeMenu, QuickButton};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

/// Telegram's limit on callback data, in bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

/// Quick buttons per keyboard row.
const BUTTONS_PER_ROW: usize = 2;

fn callback(text: &str, id: &str) -> Option<InlineKeyboardButton> {
    if id.len() > MAX_CALLBACK_DATA {
        warn!(id = %id, len = id.len(), "Callback data too long, skipping button");
        return None;
    }
    Some(InlineKeyboardButton::callback(text, id))
}

fn quick_rows(buttons: &[QuickButton]) -> Vec<Vec<InlineKeyboardButton>> {
    let usable: Vec<InlineKeyboardButton> = buttons
        .iter()
        .filter_map(|b| callback(&b.text, &b.id))
        .collect();
    usable
        .chunks(BUTTONS_PER_ROW)
        .map(<[InlineKeyboardButton]>::to_vec)
        .collect()
}

/// Keyboard for a caption with quick buttons.
#[must_use]
pub fn buttons_keyboard(buttons: &[QuickButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(quick_rows(buttons))
}

/// Keyboard for a list menu: one row per menu row, quick buttons last.
#[must_use]
pub fn menu_keyboard(menu: &NativeMenu) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = menu
        .sections
        .iter()
        .flat_map(|section| section.rows.iter())
        .filter_map(|row| callback(&row.title, &row.id))
        .map(|button| vec![button])
        .collect();
    rows.extend(quick_rows(&menu.quick_buttons));
    InlineKeyboardMarkup::new(rows)
}
