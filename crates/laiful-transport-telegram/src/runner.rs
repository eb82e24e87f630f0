use crate::config::BotSettings;
use crate::presenter::TelegramPresenter;
use laiful_core::gateway::AtlanticClient;
use laiful_core::{Interaction, Shop};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, info, warn};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let bot = Bot::new(settings.telegram.telegram_token.clone());

    let gateway = Arc::new(AtlanticClient::new(settings.shop.as_ref()));
    let presenter = Arc::new(TelegramPresenter::new(bot.clone()));
    let shop = Arc::new(Shop::new(settings.shop.as_ref(), gateway, presenter));
    info!(
        session_ttl_secs = settings.shop.session_ttl_secs,
        rate_limit_ms = settings.shop.rate_limit_ms,
        "Shop initialized."
    );

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![shop])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.text().is_some())
                .endpoint(handle_text),
        )
}

/// Interaction carried by a text message.
///
/// The sender falls back to the chat id for anonymous channel posts.
fn message_interaction(msg: &Message) -> Option<Interaction> {
    let text = msg.text()?;
    let chat_id = msg.chat.id.0.to_string();
    let sender_id = msg
        .from
        .as_ref()
        .map_or_else(|| chat_id.clone(), |u| u.id.0.to_string());
    Some(Interaction::new(sender_id, chat_id, text))
}

/// Interaction carried by an inline button press.
fn callback_interaction(q: &CallbackQuery) -> Option<Interaction> {
    let data = q.data.as_deref()?;
    let chat_id = q.message.as_ref()?.chat().id.0.to_string();
    Some(Interaction::new(q.from.id.0.to_string(), chat_id, data))
}

async fn handle_text(msg: Message, shop: Arc<Shop>) -> Result<(), teloxide::RequestError> {
    if let Some(interaction) = message_interaction(&msg) {
        shop.handle(&interaction).await;
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    shop: Arc<Shop>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(error = %e, "Failed to answer callback query");
    }

    match callback_interaction(&q) {
        Some(interaction) => shop.handle(&interaction).await,
        None => debug!(user = q.from.id.0, "Callback without data or message, ignoring"),
    }
    respond(())
}
