//! Main menu.

use super::Turn;
use crate::error::ShopError;
use crate::presenter::{MenuRow, MenuSection, NativeMenu, QuickButton};

/// Caption of the main menu.
pub const MAIN_MENU_CAPTION: &str = "*LAIFULSHOP*\nPilih layanan transaksi Atlantic H2H:";

/// The main menu: one section with every service plus balance/help shortcuts
#[must_use]
pub fn main_menu() -> NativeMenu {
    let rows = [
        ("PRABAYAR", ".ls_prabayar"),
        ("PASCABAYAR", ".ls_pascabayar"),
        ("DEPOSIT", ".ls_deposit"),
        ("TRANSFER", ".ls_transfer"),
        ("PROFILE", ".ls_profile"),
        ("HELP", ".ls_help"),
    ]
    .into_iter()
    .map(|(title, id)| MenuRow::new(title, id))
    .collect();

    NativeMenu {
        caption: MAIN_MENU_CAPTION.to_string(),
        title: "LIST FITUR".to_string(),
        sections: vec![MenuSection {
            title: "MENU UTAMA".to_string(),
            highlight_label: Some("Recommended".to_string()),
            rows,
        }],
        quick_buttons: vec![
            QuickButton::new(".ls_profile", "SALDO"),
            QuickButton::new(".ls_help", "HELP"),
        ],
    }
}

pub(crate) async fn show(turn: &Turn<'_>) -> Result<(), ShopError> {
    turn.menu(&main_menu()).await
}
