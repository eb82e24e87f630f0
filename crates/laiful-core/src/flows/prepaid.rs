//! Prepaid purchases: category → item → target → optional limit → submit.

use super::{list_menu, menu_button, Turn};
use crate::catalog::{group_categories, pick_product, Product, ProductType};
use crate::error::ShopError;
use crate::format::{decode_id, encode_id, reference_id, rupiah};
use crate::gateway::response::{amount, record, status, text, PRICE_KEYS, TRANSACTION_ID_KEYS};
use crate::gateway::{form, paths};
use crate::presenter::{MenuRow, QuickButton};
use crate::router::Command;
use crate::session::{FlowState, Session, TransactionKind};
use tracing::info;

/// Input that skips the limit price.
pub const SKIP_LIMIT_TOKEN: &str = "ls_pb_skip_limit";

const CATEGORY_PREFIX: &str = "ls_pb_cat_";
const ITEM_PREFIX: &str = "ls_pb_item_";
const BUY_PREFIX: &str = "ls_pb_buy_";

/// Prepaid commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepaidCommand {
    /// Open the category menu
    Open,
    /// List the items of a category (decoded name)
    Category(String),
    /// Show one item
    Item(String),
    /// Start buying an item
    Buy(String),
}

/// Parse a prepaid command token.
#[must_use]
pub fn parse(token: &str) -> Option<Command> {
    let command = if token == "ls_prabayar" {
        PrepaidCommand::Open
    } else if let Some(encoded) = token.strip_prefix(CATEGORY_PREFIX) {
        PrepaidCommand::Category(decode_id(encoded))
    } else if let Some(code) = token.strip_prefix(ITEM_PREFIX) {
        PrepaidCommand::Item(code.to_string())
    } else if let Some(code) = token.strip_prefix(BUY_PREFIX) {
        PrepaidCommand::Buy(code.to_string())
    } else {
        return None;
    };
    Some(Command::Prepaid(command))
}

pub(crate) async fn run(
    turn: &Turn<'_>,
    session: &mut Session,
    command: PrepaidCommand,
) -> Result<(), ShopError> {
    match command {
        PrepaidCommand::Open => open(turn, session).await,
        PrepaidCommand::Category(name) => category(turn, session, &name).await,
        PrepaidCommand::Item(code) => item(turn, session, &code).await,
        PrepaidCommand::Buy(code) => buy(turn, session, &code).await,
    }
}

fn back_button() -> QuickButton {
    QuickButton::new(".ls_prabayar", "KEMBALI")
}

fn product_not_found() -> ShopError {
    ShopError::NotFound("Produk tidak ditemukan.".to_string())
}

async fn open(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    turn.gate().await?;
    let products = turn.shop.price_list(ProductType::Prepaid).await?;

    session.restart(FlowState::PbPickCat);
    info!(sender = %turn.sender(), products = products.len(), "Prepaid menu opened");

    turn.menu(&list_menu(
        "*Prabayar*\nPilih kategori produk.".to_string(),
        "KATEGORI",
        "KATEGORI".to_string(),
        group_categories(&products).into_iter().map(|(name, items)| {
            MenuRow::new(
                format!("{name} ({})", items.len()),
                format!(".{CATEGORY_PREFIX}{}", encode_id(&name)),
            )
        }),
        vec![menu_button()],
    ))
    .await
}

async fn category(turn: &Turn<'_>, session: &mut Session, wanted: &str) -> Result<(), ShopError> {
    turn.gate().await?;
    let products = turn.shop.price_list(ProductType::Prepaid).await?;

    let wanted = wanted.to_lowercase();
    let (name, items) = group_categories(&products)
        .into_iter()
        .find(|(name, _)| name.to_lowercase() == wanted)
        .ok_or_else(|| ShopError::NotFound("Kategori tidak ditemukan.".to_string()))?;

    session.restart(FlowState::PbPickItem);

    turn.menu(&list_menu(
        format!("*{name}*\nPilih produk."),
        "PRODUK",
        name,
        items.iter().map(|p| {
            MenuRow::new(
                format!("{} - {}", p.name, rupiah(p.price)),
                format!(".{ITEM_PREFIX}{}", p.code),
            )
        }),
        vec![back_button(), menu_button()],
    ))
    .await
}

fn detail_caption(product: &Product) -> String {
    let mut lines = vec![
        format!("*{}*", product.name),
        format!("Kode: {}", product.code),
        format!("Harga: {}", rupiah(product.price)),
    ];
    if let Some(desc) = &product.description {
        lines.push(format!("Deskripsi: {desc}"));
    }
    if let Some(note) = &product.note {
        lines.push(format!("Catatan: {note}"));
    }
    lines.join("\n")
}

async fn item(turn: &Turn<'_>, session: &mut Session, code: &str) -> Result<(), ShopError> {
    let products = turn.shop.price_list(ProductType::Prepaid).await?;
    let product = pick_product(&products, code).ok_or_else(product_not_found)?;

    session.restart(FlowState::PbPickItem);
    session.context.product = Some(product.clone());

    let caption = detail_caption(product);
    turn.buttons(
        &caption,
        &[
            QuickButton::new(format!(".{BUY_PREFIX}{}", product.code), "BELI"),
            back_button(),
            menu_button(),
        ],
    )
    .await?;

    if let Some(url) = &product.image_url {
        turn.image(url, &caption).await?;
    }
    Ok(())
}

async fn buy(turn: &Turn<'_>, session: &mut Session, code: &str) -> Result<(), ShopError> {
    let products = turn.shop.price_list(ProductType::Prepaid).await?;
    let product = pick_product(&products, code).ok_or_else(product_not_found)?;

    session.restart(FlowState::PbWaitTarget);
    session.context.product = Some(product.clone());

    turn.text("Masukkan nomor tujuan/ID pelanggan.").await
}

pub(crate) async fn capture_target(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    session.context.target = Some(turn.input.raw.clone());
    session.state = FlowState::PbWaitLimit;

    turn.buttons(
        "Masukkan limit harga (angka) atau klik skip.",
        &[QuickButton::new(format!(".{SKIP_LIMIT_TOKEN}"), "SKIP LIMIT")],
    )
    .await
}

pub(crate) async fn submit_purchase(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let limit = if turn.input.token == SKIP_LIMIT_TOKEN {
        None
    } else {
        Some(turn.nominal("Masukkan angka limit yang valid atau tekan skip.")?)
    };

    let product = session.context.product.clone().ok_or_else(product_not_found)?;
    let target = session.context.target.clone().unwrap_or_default();
    let reference = reference_id("PB");

    let mut fields = form([
        ("code", product.code.clone()),
        ("reff_id", reference.clone()),
        ("target", target),
    ]);
    if let Some(limit) = limit {
        fields.push(("limit_price".to_string(), limit.to_string()));
    }

    let res = turn.gated_call(paths::PURCHASE_CREATE, fields).await?;
    let data = record(&res);
    let id = text(data, TRANSACTION_ID_KEYS).unwrap_or_else(|| reference.clone());

    session.last_transaction_id = Some(id.clone());
    session.last_transaction_kind = Some(TransactionKind::Prepaid);
    session.reset();
    info!(sender = %turn.sender(), reference = %reference, id = %id, code = %product.code, "Prepaid purchase created");

    let caption = format!(
        "Transaksi dibuat.\nID: {id}\nReff: {reference}\nStatus: {}\nHarga: {}",
        status(&res, "pending"),
        rupiah(amount(data, PRICE_KEYS).or(product.price)),
    );
    turn.receipt(&caption, ".ls_trx_status_last").await
}
