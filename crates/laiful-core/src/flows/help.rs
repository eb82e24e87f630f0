//! Static help text.

use super::Turn;
use crate::error::ShopError;
use crate::router::Command;

/// Help caption.
pub const HELP_TEXT: &str = "*LaifulShop Help*\n\
Gunakan menu interaktif untuk memilih layanan.\n\
- menu/start: buka menu utama.\n\
- Ikuti setiap langkah input yang diminta (nomor pelanggan, nominal, catatan).\n\
- Gunakan tombol CEK STATUS setelah transaksi.";

/// Parse `ls_help`.
#[must_use]
pub fn parse(token: &str) -> Option<Command> {
    (token == "ls_help").then_some(Command::Help)
}

pub(crate) async fn show(turn: &Turn<'_>) -> Result<(), ShopError> {
    turn.with_menu(HELP_TEXT).await
}
