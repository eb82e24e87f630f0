//! Account profile and balance.

use super::Turn;
use crate::error::ShopError;
use crate::format::rupiah;
use crate::gateway::response::{amount, record, status, text};
use crate::gateway::{paths, FormFields};
use crate::router::Command;
use serde_json::Value;
use tracing::info;

/// Parse `ls_profile`.
#[must_use]
pub fn parse(token: &str) -> Option<Command> {
    (token == "ls_profile").then_some(Command::Profile)
}

fn caption(res: &Value) -> String {
    let data = record(res);
    let or_dash = |keys: &[&str]| text(data, keys).unwrap_or_else(|| "-".to_string());
    format!(
        "*Profile*\nNama: {}\nSaldo: {}\nEmail: {}\nID: {}\nStatus: {}",
        or_dash(&["name"]),
        rupiah(amount(data, &["balance", "saldo"])),
        or_dash(&["email"]),
        or_dash(&["id"]),
        status(res, "-"),
    )
}

pub(crate) async fn show(turn: &Turn<'_>) -> Result<(), ShopError> {
    let res = turn.gated_call(paths::PROFILE, FormFields::new()).await?;
    info!(sender = %turn.sender(), "Profile fetched");
    turn.with_menu(&caption(&res)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGatewayClient;
    use crate::testing::{interaction, shop_with, Rendered};
    use serde_json::json;

    #[test]
    fn test_caption_reads_balance_aliases() {
        let res = json!({
            "status": true,
            "data": { "name": "Laiful", "saldo": "150000", "email": "a@b.c", "id": 7, "status": "active" }
        });
        insta::assert_snapshot!(caption(&res), @r"
        *Profile*
        Nama: Laiful
        Saldo: Rp150.000
        Email: a@b.c
        ID: 7
        Status: active
        ");
    }

    #[tokio::test]
    async fn test_profile_is_rate_limited() {
        let mut gateway = MockGatewayClient::new();
        gateway.expect_post().times(1).returning(|path, _| {
            assert_eq!(path, paths::PROFILE);
            Ok(json!({ "data": { "name": "Laiful", "balance": 1000 } }))
        });
        let (shop, presenter) = shop_with(gateway);

        shop.handle(&interaction(".ls_profile")).await;
        shop.handle(&interaction(".ls_profile")).await;

        let rendered = presenter.rendered().await;
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].caption().contains("Saldo: Rp1.000"));
        assert!(matches!(&rendered[1], Rendered::Text(t) if t.starts_with("Tunggu ")));
    }
}
