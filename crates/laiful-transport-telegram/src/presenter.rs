//! Shop replies rendered as Telegram messages.

use crate::keyboards::{buttons_keyboard, menu_keyboard};
use anyhow::{Context, Result};
use async_trait::async_trait;
use laiful_core::presenter::{NativeMenu, Presenter, QuickButton};
use lazy_regex::{lazy_regex, Lazy, Regex};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::warn;

static RE_BOLD: Lazy<Regex> = lazy_regex!(r"\*([^*\n]+)\*");

/// Escape `text` for HTML parse mode and turn `*bold*` spans into `<b>` tags.
#[must_use]
pub fn to_html(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    RE_BOLD.replace_all(&escaped, "<b>$1</b>").into_owned()
}

/// Caption of a list menu, with each section title listed under it.
#[must_use]
pub fn menu_caption(menu: &NativeMenu) -> String {
    let mut caption = to_html(&menu.caption);
    for section in &menu.sections {
        caption.push_str("\n\n<b>");
        caption.push_str(&html_escape::encode_text(&section.title));
        caption.push_str("</b>");
        if let Some(label) = &section.highlight_label {
            caption.push_str(" · <i>");
            caption.push_str(&html_escape::encode_text(label));
            caption.push_str("</i>");
        }
    }
    caption
}

fn parse_chat_id(chat_id: &str) -> Result<ChatId> {
    chat_id
        .parse::<i64>()
        .map(ChatId)
        .with_context(|| format!("Invalid Telegram chat id: {chat_id}"))
}

/// Presenter backed by the Bot API
#[derive(Clone)]
pub struct TelegramPresenter {
    bot: Bot,
}

impl TelegramPresenter {
    /// Wrap a bot handle.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Presenter for TelegramPresenter {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        self.bot
            .send_message(parse_chat_id(chat_id)?, to_html(text))
            .parse_mode(ParseMode::Html)
            .await
            .context("Telegram send error")?;
        Ok(())
    }

    async fn send_buttons(&self, chat_id: &str, caption: &str, buttons: &[QuickButton]) -> Result<()> {
        self.bot
            .send_message(parse_chat_id(chat_id)?, to_html(caption))
            .parse_mode(ParseMode::Html)
            .reply_markup(buttons_keyboard(buttons))
            .await
            .context("Telegram send error")?;
        Ok(())
    }

    async fn send_menu(&self, chat_id: &str, menu: &NativeMenu) -> Result<()> {
        self.bot
            .send_message(parse_chat_id(chat_id)?, menu_caption(menu))
            .parse_mode(ParseMode::Html)
            .reply_markup(menu_keyboard(menu))
            .await
            .context("Telegram send error")?;
        Ok(())
    }

    async fn send_image(&self, chat_id: &str, url: &str, caption: &str) -> Result<()> {
        let chat = parse_chat_id(chat_id)?;
        let photo = match url.parse::<reqwest::Url>() {
            Ok(parsed) => self
                .bot
                .send_photo(chat, InputFile::url(parsed))
                .caption(to_html(caption))
                .parse_mode(ParseMode::Html)
                .await
                .map(|_| ())
                .map_err(anyhow::Error::from),
            Err(e) => Err(anyhow::Error::from(e)),
        };

        if let Err(e) = photo {
            warn!(url = %url, error = %e, "Failed to send photo, falling back to text");
            return self.send_text(chat_id, caption).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laiful_core::flows::menu::main_menu;

    #[test]
    fn test_bold_after_escaping() {
        assert_eq!(
            to_html("*Pulsa & Data*\nHarga: <Rp5.000>"),
            "<b>Pulsa &amp; Data</b>\nHarga: &lt;Rp5.000&gt;"
        );
    }

    #[test]
    fn test_lone_asterisk_is_kept() {
        assert_eq!(to_html("5 * 2"), "5 * 2");
    }

    #[test]
    fn test_menu_caption_lists_sections() {
        assert_eq!(
            menu_caption(&main_menu()),
            "<b>LAIFULSHOP</b>\nPilih layanan transaksi Atlantic H2H:\n\n<b>MENU UTAMA</b> · <i>Recommended</i>"
        );
    }

    #[test]
    fn test_chat_id_must_be_numeric() {
        assert_eq!(parse_chat_id("-100123").ok(), Some(ChatId(-100_123)));
        assert!(parse_chat_id("628111@chat").is_err());
    }
}
