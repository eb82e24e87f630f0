//! Status of the last prepaid/postpaid transaction.

use super::{sticky, Turn};
use crate::error::ShopError;
use crate::format::rupiah;
use crate::gateway::response::{amount, record, status, PRICE_KEYS};
use crate::gateway::{form, paths, FormFields};
use crate::router::Command;
use crate::session::Session;

/// Parse `ls_trx_status_last`.
#[must_use]
pub fn parse(token: &str) -> Option<Command> {
    (token == "ls_trx_status_last").then_some(Command::TransactionStatus)
}

/// Status lookup of one sticky id
pub(crate) struct StatusQuery<'a> {
    pub heading: &'a str,
    pub path: &'a str,
    pub id: String,
    /// Fields sent after `id`
    pub extra: FormFields,
    pub amount_label: &'a str,
    pub amount_keys: &'a [&'a str],
}

/// Look up `query.id` and render its status card.
pub(crate) async fn show(turn: &Turn<'_>, query: StatusQuery<'_>) -> Result<(), ShopError> {
    let mut fields = form([("id", query.id.clone())]);
    fields.extend(query.extra);
    let res = turn.shop.call(query.path, fields).await?;

    let caption = format!(
        "{}\nID: {}\nStatus: {}\n{}: {}",
        query.heading,
        query.id,
        status(&res, "unknown"),
        query.amount_label,
        rupiah(amount(record(&res), query.amount_keys)),
    );
    turn.with_menu(&caption).await
}

pub(crate) async fn last_transaction(turn: &Turn<'_>, session: &Session) -> Result<(), ShopError> {
    let id = sticky(session.last_transaction_id.as_ref(), "Belum ada transaksi terakhir.")?;
    let kind = session
        .last_transaction_kind
        .map(|k| k.as_str().to_string())
        .unwrap_or_default();

    show(
        turn,
        StatusQuery {
            heading: "Status Transaksi",
            path: paths::TRANSACTION_STATUS,
            id,
            extra: form([("type", kind)]),
            amount_label: "Harga",
            amount_keys: PRICE_KEYS,
        },
    )
    .await
}
