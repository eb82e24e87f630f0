//! Postpaid bills: service → customer number → inquiry → pay.

use super::{list_menu, menu_button, Turn};
use crate::catalog::{pick_product, PendingBill, ProductType};
use crate::error::ShopError;
use crate::format::{reference_id, rupiah};
use crate::gateway::response::{amount, record, status, text, PRICE_KEYS, TRANSACTION_ID_KEYS};
use crate::gateway::{form, paths};
use crate::presenter::{MenuRow, QuickButton};
use crate::router::Command;
use crate::session::{FlowState, Session, TransactionKind};
use tracing::info;

const ITEM_PREFIX: &str = "ls_pc_item_";

/// Postpaid commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostpaidCommand {
    /// Open the service menu
    Open,
    /// Pick a service by product code
    Item(String),
    /// Pay the pending bill
    Pay,
}

/// Parse a postpaid command token.
#[must_use]
pub fn parse(token: &str) -> Option<Command> {
    let command = match token {
        "ls_pascabayar" => PostpaidCommand::Open,
        "ls_pc_pay" => PostpaidCommand::Pay,
        _ => PostpaidCommand::Item(token.strip_prefix(ITEM_PREFIX)?.to_string()),
    };
    Some(Command::Postpaid(command))
}

pub(crate) async fn run(
    turn: &Turn<'_>,
    session: &mut Session,
    command: PostpaidCommand,
) -> Result<(), ShopError> {
    match command {
        PostpaidCommand::Open => open(turn, session).await,
        PostpaidCommand::Item(code) => item(turn, session, &code).await,
        PostpaidCommand::Pay => pay(turn, session).await,
    }
}

async fn open(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    turn.gate().await?;
    let products = turn.shop.price_list(ProductType::Postpaid).await?;

    session.restart(FlowState::PascaPickItem);
    info!(sender = %turn.sender(), products = products.len(), "Postpaid menu opened");

    turn.menu(&list_menu(
        "*Pascabayar*\nPilih layanan tagihan.".to_string(),
        "LAYANAN",
        "PASCABAYAR".to_string(),
        products
            .iter()
            .map(|p| MenuRow::new(p.name.clone(), format!(".{ITEM_PREFIX}{}", p.code))),
        vec![menu_button()],
    ))
    .await
}

async fn item(turn: &Turn<'_>, session: &mut Session, code: &str) -> Result<(), ShopError> {
    let products = turn.shop.price_list(ProductType::Postpaid).await?;
    let product = pick_product(&products, code)
        .ok_or_else(|| ShopError::NotFound("Layanan tidak ditemukan.".to_string()))?;

    session.restart(FlowState::PascaWaitCustomerNo);
    session.context.product = Some(product.clone());

    turn.text(&format!(
        "*{}*\nKode: {}\n\nMasukkan nomor pelanggan.",
        product.name, product.code
    ))
    .await
}

fn bill_caption(bill: &PendingBill) -> String {
    format!(
        "Tagihan ditemukan.\nNama: {}\nTotal: {}\nAdmin: {}\nReff: {}",
        bill.customer_name.as_deref().unwrap_or("-"),
        rupiah(bill.amount),
        rupiah(bill.admin_fee),
        bill.reference_id,
    )
}

pub(crate) async fn inquire(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let customer_no = turn.input.raw.clone();
    let product = session
        .context
        .product
        .clone()
        .ok_or_else(|| ShopError::NotFound("Layanan tidak ditemukan.".to_string()))?;
    let reference = reference_id("PC");

    let res = turn
        .gated_call(
            paths::BILL_INQUIRY,
            form([
                ("code", product.code.clone()),
                ("reff_id", reference.clone()),
                ("customer_no", customer_no.clone()),
            ]),
        )
        .await?;

    let bill = PendingBill::from_value(record(&res), reference, customer_no);
    let caption = bill_caption(&bill);
    info!(sender = %turn.sender(), reference = %bill.reference_id, code = %product.code, "Bill inquired");

    session.context.pending_bill = Some(bill);
    session.state = FlowState::PascaConfirmPay;

    turn.buttons(
        &caption,
        &[QuickButton::new(".ls_pc_pay", "BAYAR"), menu_button()],
    )
    .await
}

async fn pay(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let bill = match (&session.state, &session.context.pending_bill) {
        (FlowState::PascaConfirmPay, Some(bill)) => bill.clone(),
        _ => return Err(ShopError::NotFound("Tagihan belum tersedia.".to_string())),
    };
    let code = session
        .context
        .product
        .as_ref()
        .map(|p| p.code.clone())
        .unwrap_or_default();

    let res = turn
        .gated_call(
            paths::BILL_PAY,
            form([
                ("code", code),
                ("reff_id", bill.reference_id.clone()),
                ("customer_no", bill.customer_no.clone()),
            ]),
        )
        .await?;

    let data = record(&res);
    let id = text(data, TRANSACTION_ID_KEYS).unwrap_or_else(|| bill.reference_id.clone());

    session.last_transaction_id = Some(id.clone());
    session.last_transaction_kind = Some(TransactionKind::Postpaid);
    session.reset();
    info!(sender = %turn.sender(), reference = %bill.reference_id, id = %id, "Bill paid");

    let caption = format!(
        "Pembayaran diproses.\nID: {id}\nStatus: {}\nSN: {}\nTotal: {}",
        status(&res, "pending"),
        text(data, &["sn"]).unwrap_or_else(|| "-".to_string()),
        rupiah(amount(data, PRICE_KEYS).or(bill.amount)),
    );
    turn.receipt(&caption, ".ls_trx_status_last").await
}
