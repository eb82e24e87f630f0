//! Bank and e-wallet transfers.

use super::status::{show as show_status, StatusQuery};
use super::{list_menu, menu_button, sticky, Turn};
use crate::catalog::Bank;
use crate::error::ShopError;
use crate::format::{reference_id, rupiah};
use crate::gateway::response::{amount, list, record, status, text, NOMINAL_KEYS, TRANSFER_ID_KEYS};
use crate::gateway::{form, paths, FormFields};
use crate::presenter::{MenuRow, QuickButton};
use crate::router::Command;
use crate::session::{FlowState, Session};
use tracing::info;

/// Input that skips the transfer note.
pub const SKIP_NOTE_TOKEN: &str = "ls_trf_skip_note";

const BANK_PREFIX: &str = "ls_trf_bank_";

/// Transfer commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferCommand {
    /// Open the bank menu
    Open,
    /// Pick a bank by code
    Bank(String),
    /// Continue after the account name check
    Continue,
    /// Status of the last transfer
    Status,
}

/// Parse a transfer command token.
#[must_use]
pub fn parse(token: &str) -> Option<Command> {
    let command = match token {
        "ls_transfer" => TransferCommand::Open,
        "ls_trf_go" => TransferCommand::Continue,
        "ls_trf_status_last" => TransferCommand::Status,
        _ => TransferCommand::Bank(token.strip_prefix(BANK_PREFIX)?.to_string()),
    };
    Some(Command::Transfer(command))
}

pub(crate) async fn run(
    turn: &Turn<'_>,
    session: &mut Session,
    command: TransferCommand,
) -> Result<(), ShopError> {
    match command {
        TransferCommand::Open => open(turn, session).await,
        TransferCommand::Bank(code) => pick_bank(turn, session, &code).await,
        TransferCommand::Continue => proceed(turn, session).await,
        TransferCommand::Status => check_status(turn, session).await,
    }
}

fn incomplete() -> ShopError {
    ShopError::NotFound("Data transfer tidak lengkap.".to_string())
}

async fn open(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let res = turn.gated_call(paths::TRANSFER_BANKS, FormFields::new()).await?;
    let banks: Vec<Bank> = list(&res).iter().filter_map(Bank::from_value).collect();

    let menu = list_menu(
        "*Transfer*\nPilih bank atau e-wallet tujuan.".to_string(),
        "BANK",
        "DAFTAR BANK".to_string(),
        banks.iter().map(|b| {
            MenuRow::new(
                format!("{} ({})", b.label(), b.code),
                format!(".{BANK_PREFIX}{}", b.code),
            )
        }),
        vec![menu_button()],
    );
    info!(sender = %turn.sender(), banks = banks.len(), "Transfer menu opened");
    turn.shop.banks.replace(banks).await;

    session.restart(FlowState::TrfPickBank);
    turn.menu(&menu).await
}

async fn pick_bank(turn: &Turn<'_>, session: &mut Session, code: &str) -> Result<(), ShopError> {
    let bank = turn
        .shop
        .banks
        .find(|b| b.code.eq_ignore_ascii_case(code))
        .await
        .unwrap_or_else(|| Bank::unlisted(code));

    let prompt = format!("Masukkan nomor rekening/akun tujuan untuk {}.", bank.label());
    session.restart(FlowState::TrfWaitAccount);
    session.context.bank = Some(bank);

    turn.text(&prompt).await
}

pub(crate) async fn check_account(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let bank = session.context.bank.clone().ok_or_else(incomplete)?;
    let account_number = turn.input.raw.clone();

    let res = turn
        .shop
        .call(
            paths::TRANSFER_ACCOUNT_CHECK,
            form([
                ("bank_code", bank.code.clone()),
                ("account_number", account_number.clone()),
            ]),
        )
        .await?;

    let account_name = text(record(&res), &["account_name", "nama_pemilik", "name"]);
    let caption = format!(
        "Cek rekening {}\nNomor: {account_number}\nNama: {}\nStatus: {}",
        bank.label(),
        account_name.as_deref().unwrap_or("-"),
        status(&res, "-"),
    );

    session.context.account_number = Some(account_number);
    session.context.account_name = account_name;
    session.state = FlowState::TrfConfirmName;

    turn.buttons(
        &caption,
        &[QuickButton::new(".ls_trf_go", "LANJUT TRANSFER"), menu_button()],
    )
    .await
}

async fn proceed(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    if session.state != FlowState::TrfConfirmName || session.context.account_number.is_none() {
        return Err(ShopError::NotFound(
            "Rekening tujuan belum diverifikasi.".to_string(),
        ));
    }
    session.state = FlowState::TrfWaitNominal;
    turn.text("Masukkan nominal transfer.").await
}

pub(crate) async fn capture_nominal(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    session.context.nominal = Some(turn.nominal("Nominal tidak valid.")?);
    session.state = FlowState::TrfWaitNote;

    turn.buttons(
        "Tambahkan catatan transfer atau klik skip.",
        &[QuickButton::new(format!(".{SKIP_NOTE_TOKEN}"), "SKIP")],
    )
    .await
}

pub(crate) async fn submit(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let note = if turn.input.token == SKIP_NOTE_TOKEN {
        String::new()
    } else {
        turn.input.raw.clone()
    };

    let context = &session.context;
    let bank = context.bank.clone().ok_or_else(incomplete)?;
    let account_number = context.account_number.clone().ok_or_else(incomplete)?;
    let nominal = context.nominal.ok_or_else(incomplete)?;
    let account_name = context.account_name.clone().unwrap_or_default();
    let reference = reference_id("TRF");

    let res = turn
        .gated_call(
            paths::TRANSFER_CREATE,
            form([
                ("ref_id", reference.clone()),
                ("kode_bank", bank.code.clone()),
                ("nomor_akun", account_number),
                ("nama_pemilik", account_name),
                ("nominal", nominal.to_string()),
                ("note", note),
            ]),
        )
        .await?;

    let data = record(&res);
    let id = text(data, TRANSFER_ID_KEYS).unwrap_or_else(|| reference.clone());

    session.last_transfer_id = Some(id.clone());
    session.reset();
    info!(sender = %turn.sender(), reference = %reference, id = %id, nominal, bank = %bank.code, "Transfer created");

    #[allow(clippy::cast_precision_loss)]
    let requested = nominal as f64;
    let caption = format!(
        "Transfer dibuat.\nID: {id}\nReff: {reference}\nTotal: {}\nFee: {}\nStatus: {}",
        rupiah(amount(data, &["total", "nominal"]).or(Some(requested))),
        rupiah(amount(data, &["fee"])),
        status(&res, "pending"),
    );
    turn.receipt(&caption, ".ls_trf_status_last").await
}

async fn check_status(turn: &Turn<'_>, session: &Session) -> Result<(), ShopError> {
    let query = StatusQuery {
        heading: "Status Transfer",
        path: paths::TRANSFER_STATUS,
        id: sticky(session.last_transfer_id.as_ref(), "Belum ada transfer yang bisa dicek.")?,
        extra: FormFields::new(),
        amount_label: "Nominal",
        amount_keys: NOMINAL_KEYS,
    };
    show_status(turn, query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGatewayClient;
    use crate::testing::{field, interaction, shop_with, SENDER};
    use serde_json::json;

    #[test]
    fn test_parse() {
        assert_eq!(
            parse("ls_trf_bank_bca"),
            Some(Command::Transfer(TransferCommand::Bank("bca".to_string())))
        );
        assert_eq!(parse("ls_trf_skip_note"), None);
    }

    #[tokio::test]
    async fn test_continue_requires_verified_account() {
        let mut gateway = MockGatewayClient::new();
        gateway.expect_post().never();
        let (shop, presenter) = shop_with(gateway);
        shop.sessions().acquire(SENDER).await.restart(FlowState::TrfConfirmName);

        shop.handle(&interaction(".ls_trf_go")).await;

        assert_eq!(
            presenter.last().await.expect("reply").caption(),
            "Rekening tujuan belum diverifikasi."
        );
        let session = shop.sessions().snapshot(SENDER).await.expect("session");
        assert_eq!(session.state, FlowState::TrfConfirmName);
    }

    #[tokio::test]
    async fn test_full_transfer_with_skipped_note() {
        let mut gateway = MockGatewayClient::new();
        let mut seq = mockall::Sequence::new();
        gateway
            .expect_post()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|path, fields| {
                assert_eq!(path, paths::TRANSFER_ACCOUNT_CHECK);
                assert_eq!(field(&fields, "bank_code"), Some("bca"));
                assert_eq!(field(&fields, "account_number"), Some("1234567890"));
                Ok(json!({ "data": { "account_name": "SITI AMINAH", "status": "valid" } }))
            });
        gateway
            .expect_post()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|path, fields| {
                assert_eq!(path, paths::TRANSFER_CREATE);
                assert!(field(&fields, "ref_id").is_some_and(|r| r.starts_with("TRF-")));
                assert_eq!(field(&fields, "kode_bank"), Some("bca"));
                assert_eq!(field(&fields, "nomor_akun"), Some("1234567890"));
                assert_eq!(field(&fields, "nama_pemilik"), Some("SITI AMINAH"));
                assert_eq!(field(&fields, "nominal"), Some("75000"));
                assert_eq!(field(&fields, "note"), Some(""));
                Ok(json!({ "data": { "id": "TF-5", "status": "pending", "total": 75000, "fee": 2500 } }))
            });
        let (shop, presenter) = shop_with(gateway);

        shop.handle(&interaction(".ls_trf_bank_bca")).await;
        shop.handle(&interaction("1234567890")).await;
        shop.handle(&interaction(".ls_trf_go")).await;
        shop.handle(&interaction("75.000")).await;
        let session = shop.sessions().snapshot(SENDER).await.expect("session");
        assert_eq!(session.state, FlowState::TrfWaitNote);

        shop.handle(&interaction(".ls_trf_skip_note")).await;

        let session = shop.sessions().snapshot(SENDER).await.expect("session");
        assert_eq!(session.state, FlowState::Idle);
        assert_eq!(session.last_transfer_id.as_deref(), Some("TF-5"));
        let reply = presenter.last().await.expect("reply");
        assert!(reply.caption().ends_with("Total: Rp75.000\nFee: Rp2.500\nStatus: pending"));
        assert_eq!(reply.button_ids(), vec![".ls_trf_status_last", ".ls_menu"]);
    }
}
