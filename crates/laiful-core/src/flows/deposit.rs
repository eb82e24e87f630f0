//! Balance deposits.
//!
//! `method → nominal → create` is the main path. Status, cancel and instant
//! act on the sticky deposit id and are reachable from any state; only the
//! instant confirmation requires the preview step before it.

use super::status::{show as show_status, StatusQuery};
use super::{list_menu, menu_button, status_button, sticky, Turn};
use crate::catalog::DepositMethod;
use crate::error::ShopError;
use crate::format::{reference_id, rupiah};
use crate::gateway::response::{
    amount, list, message, record, status, text, DEPOSIT_ID_KEYS, NOMINAL_KEYS,
};
use crate::gateway::{form, paths, FormFields};
use crate::presenter::{MenuRow, QuickButton};
use crate::router::Command;
use crate::session::{FlowState, Session};
use serde_json::Value;
use tracing::info;

const METHOD_PREFIX: &str = "ls_dep_method_";
const STATUS_COMMAND: &str = ".ls_dep_status_last";
const NO_INSTANT_DEPOSIT: &str = "Tidak ada deposit untuk instant.";

/// Deposit commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositCommand {
    /// Open the method menu
    Open,
    /// Pick a method
    Method(String),
    /// Status of the last deposit
    Status,
    /// Cancel the last deposit
    Cancel,
    /// Preview instant processing of the last deposit
    Instant,
    /// Confirm instant processing
    InstantConfirm,
}

/// Parse a deposit command token.
#[must_use]
pub fn parse(token: &str) -> Option<Command> {
    let command = match token {
        "ls_deposit" => DepositCommand::Open,
        "ls_dep_status_last" => DepositCommand::Status,
        "ls_dep_cancel_last" => DepositCommand::Cancel,
        "ls_dep_instant" => DepositCommand::Instant,
        "ls_dep_instant_yes" => DepositCommand::InstantConfirm,
        _ => DepositCommand::Method(token.strip_prefix(METHOD_PREFIX)?.to_string()),
    };
    Some(Command::Deposit(command))
}

pub(crate) async fn run(
    turn: &Turn<'_>,
    session: &mut Session,
    command: DepositCommand,
) -> Result<(), ShopError> {
    match command {
        DepositCommand::Open => open(turn, session).await,
        DepositCommand::Method(method) => pick_method(turn, session, &method).await,
        DepositCommand::Status => check_status(turn, session).await,
        DepositCommand::Cancel => cancel(turn, session).await,
        DepositCommand::Instant => instant_preview(turn, session).await,
        DepositCommand::InstantConfirm => instant_confirm(turn, session).await,
    }
}

async fn open(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let res = turn.gated_call(paths::DEPOSIT_METHODS, FormFields::new()).await?;
    let methods: Vec<DepositMethod> = list(&res)
        .iter()
        .filter_map(DepositMethod::from_value)
        .collect();

    let menu = list_menu(
        "*Deposit*\nPilih metode deposit.".to_string(),
        "METODE",
        "METODE DEPOSIT".to_string(),
        methods.iter().map(|m| {
            MenuRow::new(
                format!("{} ({})", m.method, m.kind.as_deref().unwrap_or("-")),
                format!(".{METHOD_PREFIX}{}", m.method),
            )
        }),
        vec![menu_button()],
    );
    info!(sender = %turn.sender(), methods = methods.len(), "Deposit menu opened");
    turn.shop.deposit_methods.replace(methods).await;

    session.restart(FlowState::DepPickMethod);
    turn.menu(&menu).await
}

async fn pick_method(turn: &Turn<'_>, session: &mut Session, wanted: &str) -> Result<(), ShopError> {
    let method = turn
        .shop
        .deposit_methods
        .find(|m| m.method.eq_ignore_ascii_case(wanted))
        .await
        .unwrap_or_else(|| DepositMethod::unlisted(wanted));

    let prompt = format!("Masukkan nominal deposit untuk {}.", method.method);
    session.restart(FlowState::DepWaitNominal);
    session.context.method = Some(method);

    turn.text(&prompt).await
}

fn created_caption(data: &Value, id: &str, reference: &str, nominal: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let requested = nominal as f64;
    let mut lines = vec![
        "Deposit dibuat.".to_string(),
        format!("ID: {id}"),
        format!("Reff: {reference}"),
        format!("Nominal: {}", rupiah(amount(data, NOMINAL_KEYS).or(Some(requested)))),
    ];
    if let Some(fee) = amount(data, &["fee"]) {
        lines.push(format!("Fee: {}", rupiah(Some(fee))));
    }
    let optional = [
        ("Expired", "expired"),
        ("VA", "nomor_va"),
        ("Rekening", "rekening_tujuan"),
        ("URL", "url"),
    ];
    for (label, key) in optional {
        if let Some(value) = text(data, &[key]) {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.join("\n")
}

pub(crate) async fn create(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let nominal = turn.nominal("Nominal tidak valid.")?;
    let method = session
        .context
        .method
        .clone()
        .ok_or_else(|| ShopError::NotFound("Metode deposit belum dipilih.".to_string()))?;
    let reference = reference_id("DEP");

    let mut fields = form([
        ("reff_id", reference.clone()),
        ("nominal", nominal.to_string()),
    ]);
    if let Some(kind) = &method.kind {
        fields.push(("type".to_string(), kind.clone()));
    }
    fields.push(("metode".to_string(), method.method.clone()));

    let res = turn.gated_call(paths::DEPOSIT_CREATE, fields).await?;
    let data = record(&res);
    let id = text(data, DEPOSIT_ID_KEYS).unwrap_or_else(|| reference.clone());

    session.last_deposit_id = Some(id.clone());
    session.reset();
    info!(sender = %turn.sender(), reference = %reference, id = %id, nominal, "Deposit created");

    turn.buttons(
        &created_caption(data, &id, &reference, nominal),
        &[
            status_button(STATUS_COMMAND),
            QuickButton::new(".ls_dep_cancel_last", "CANCEL"),
            QuickButton::new(".ls_dep_instant", "INSTANT"),
            menu_button(),
        ],
    )
    .await?;

    if let Some(qr) = text(data, &["qr_image"]) {
        turn.image(&qr, "QR Pembayaran").await?;
    }
    Ok(())
}

async fn check_status(turn: &Turn<'_>, session: &Session) -> Result<(), ShopError> {
    let query = StatusQuery {
        heading: "Status Deposit",
        path: paths::DEPOSIT_STATUS,
        id: sticky(session.last_deposit_id.as_ref(), "Belum ada deposit yang bisa dicek.")?,
        extra: FormFields::new(),
        amount_label: "Nominal",
        amount_keys: NOMINAL_KEYS,
    };
    show_status(turn, query).await
}

async fn cancel(turn: &Turn<'_>, session: &Session) -> Result<(), ShopError> {
    let id = sticky(session.last_deposit_id.as_ref(), "Tidak ada deposit aktif.")?;
    let res = turn
        .shop
        .call(paths::DEPOSIT_CANCEL, form([("id", id.clone())]))
        .await?;
    info!(sender = %turn.sender(), id = %id, "Deposit cancelled");

    turn.with_menu(&format!(
        "Deposit dibatalkan.\nID: {id}\nStatus: {}",
        message(&res, "cancelled")
    ))
    .await
}

async fn instant_preview(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let id = sticky(session.last_deposit_id.as_ref(), NO_INSTANT_DEPOSIT)?;
    let res = turn
        .shop
        .call(
            paths::DEPOSIT_INSTANT,
            form([("id", id), ("action", "false".to_string())]),
        )
        .await?;

    session.state = FlowState::DepInstantPick;

    let note = text(&res, &["message"])
        .unwrap_or_else(|| "Konfirmasi untuk memproses instant deposit.".to_string());
    let caption = format!(
        "Instant Deposit\n{note}\nBiaya: {}",
        rupiah(amount(record(&res), &["penanganan", "fee"]))
    );
    turn.buttons(
        &caption,
        &[
            QuickButton::new(".ls_dep_instant_yes", "PROSES INSTANT"),
            menu_button(),
        ],
    )
    .await
}

async fn instant_confirm(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    if session.state != FlowState::DepInstantPick {
        return Err(ShopError::NotFound(
            "Buka menu INSTANT terlebih dahulu.".to_string(),
        ));
    }
    let id = sticky(session.last_deposit_id.as_ref(), NO_INSTANT_DEPOSIT)?;
    let res = turn
        .shop
        .call(
            paths::DEPOSIT_INSTANT,
            form([("id", id.clone()), ("action", "true".to_string())]),
        )
        .await?;

    session.reset();
    info!(sender = %turn.sender(), id = %id, "Instant deposit requested");

    let caption = format!("Instant diproses.\nStatus: {}", status(&res, "diproses"));
    turn.receipt(&caption, STATUS_COMMAND).await
}
