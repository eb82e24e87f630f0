#![deny(missing_docs)]
//! Telegram transport adapter for LaifulShop.

/// Telegram transport configuration.
pub mod config;
/// Inline keyboards built from buttons and menus.
pub mod keyboards;
/// Presenter rendering shop replies as Telegram messages.
pub mod presenter;
/// Telegram runtime entrypoint.
pub mod runner;

pub use presenter::TelegramPresenter;
