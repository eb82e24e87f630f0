//! Command parsing and state-machine dispatch.
//!
//! Input is normalized into a command token. Menu aliases win, then the
//! `ls_` command parsers in their fixed priority order, and finally the
//! session state decides which free-text step consumes the raw text.

use crate::error::ShopError;
use crate::flows::deposit::{self, DepositCommand};
use crate::flows::postpaid::{self, PostpaidCommand};
use crate::flows::prepaid::{self, PrepaidCommand};
use crate::flows::transfer::{self, TransferCommand};
use crate::flows::{help, menu, profile, status, Turn};
use crate::session::{FlowState, Session};
use crate::shop::Shop;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Characters stripped from the front of a command.
pub const PREFIXES: [char; 5] = ['.', '!', '#', '/', '\\'];

/// Tokens that open the main menu.
pub const MENU_ALIASES: [&str; 3] = ["menu", "start", "ls_menu"];

/// Namespace shared by every shop command.
pub const NAMESPACE: &str = "ls_";

/// Inbound text interaction, as delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Opaque id of the participant; keys the session
    pub sender_id: String,
    /// Opaque id of the chat replies go to
    pub chat_id: String,
    /// Text exactly as received
    pub raw_text: String,
}

impl Interaction {
    /// Create an interaction
    #[must_use]
    pub fn new(
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// Normalized view of the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    /// Prefix-stripped, lower-cased command token
    pub token: String,
    /// Trimmed text, case preserved
    pub raw: String,
}

/// Normalize input text into a command token and trimmed raw text.
#[must_use]
pub fn parse_input(text: &str) -> ParsedInput {
    let raw = text.trim();
    let mut chars = raw.chars();
    let body = match chars.next() {
        Some(c) if PREFIXES.contains(&c) => chars.as_str().trim(),
        _ => raw,
    };
    ParsedInput {
        token: body.to_lowercase(),
        raw: raw.to_string(),
    }
}

/// Whether `token` opens the main menu
#[must_use]
pub fn is_menu_alias(token: &str) -> bool {
    MENU_ALIASES.contains(&token)
}

/// Command recognised from an `ls_` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Prepaid purchase flow
    Prepaid(PrepaidCommand),
    /// Postpaid bill flow
    Postpaid(PostpaidCommand),
    /// Deposit flow
    Deposit(DepositCommand),
    /// Transfer flow
    Transfer(TransferCommand),
    /// Status of the last prepaid/postpaid transaction
    TransactionStatus,
    /// Account profile and balance
    Profile,
    /// Help text
    Help,
}

type CommandParser = fn(&str) -> Option<Command>;

/// Command parsers in priority order; the first match wins.
const COMMAND_PARSERS: [CommandParser; 7] = [
    prepaid::parse,
    postpaid::parse,
    deposit::parse,
    transfer::parse,
    status::parse,
    profile::parse,
    help::parse,
];

/// Parse a command token; `None` when it is not a shop command.
#[must_use]
pub fn parse_command(token: &str) -> Option<Command> {
    if !token.starts_with(NAMESPACE) {
        return None;
    }
    COMMAND_PARSERS.iter().find_map(|parse| parse(token))
}

/// Free-text step consuming the raw input in a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStep {
    /// Prepaid destination number
    PurchaseTarget,
    /// Prepaid limit price or skip, then submit
    PurchaseLimit,
    /// Postpaid customer number, then bill inquiry
    BillInquiry,
    /// Deposit nominal, then create
    DepositNominal,
    /// Transfer account number, then name check
    AccountCheck,
    /// Transfer nominal
    TransferNominal,
    /// Transfer note or skip, then submit
    TransferNote,
}

/// State → step dispatch table; states that expect a button press map to `None`.
#[must_use]
pub const fn text_step(state: FlowState) -> Option<TextStep> {
    match state {
        FlowState::PbWaitTarget => Some(TextStep::PurchaseTarget),
        FlowState::PbWaitLimit => Some(TextStep::PurchaseLimit),
        FlowState::PascaWaitCustomerNo => Some(TextStep::BillInquiry),
        FlowState::DepWaitNominal => Some(TextStep::DepositNominal),
        FlowState::TrfWaitAccount => Some(TextStep::AccountCheck),
        FlowState::TrfWaitNominal => Some(TextStep::TransferNominal),
        FlowState::TrfWaitNote => Some(TextStep::TransferNote),
        FlowState::Idle
        | FlowState::PbPickCat
        | FlowState::PbPickItem
        | FlowState::PascaPickItem
        | FlowState::PascaConfirmPay
        | FlowState::DepPickMethod
        | FlowState::DepInstantPick
        | FlowState::TrfPickBank
        | FlowState::TrfConfirmName => None,
    }
}

/// Handle one interaction, reporting any failure back to the user.
pub(crate) async fn route(shop: &Shop, interaction: &Interaction) {
    let input = parse_input(&interaction.raw_text);
    if input.raw.is_empty() {
        return;
    }

    let mut session = shop.sessions.acquire(&interaction.sender_id).await;
    let state = session.state;
    let turn = Turn {
        shop,
        interaction,
        input: &input,
    };

    if let Err(err) = dispatch(&turn, &mut session).await {
        report(&turn, state, err).await;
    }
}

async fn dispatch(turn: &Turn<'_>, session: &mut Session) -> Result<(), ShopError> {
    let token = turn.input.token.as_str();

    if is_menu_alias(token) {
        session.reset();
        return menu::show(turn).await;
    }

    if let Some(command) = parse_command(token) {
        return run_command(turn, session, command).await;
    }

    match text_step(session.state) {
        Some(step) => run_step(turn, session, step).await,
        None => {
            debug!(sender = %turn.sender(), state = %session.state, "Ignoring unmatched input");
            Ok(())
        }
    }
}

async fn run_command(
    turn: &Turn<'_>,
    session: &mut Session,
    command: Command,
) -> Result<(), ShopError> {
    match command {
        Command::Prepaid(cmd) => prepaid::run(turn, session, cmd).await,
        Command::Postpaid(cmd) => postpaid::run(turn, session, cmd).await,
        Command::Deposit(cmd) => deposit::run(turn, session, cmd).await,
        Command::Transfer(cmd) => transfer::run(turn, session, cmd).await,
        Command::TransactionStatus => status::last_transaction(turn, session).await,
        Command::Profile => profile::show(turn).await,
        Command::Help => help::show(turn).await,
    }
}

async fn run_step(turn: &Turn<'_>, session: &mut Session, step: TextStep) -> Result<(), ShopError> {
    match step {
        TextStep::PurchaseTarget => prepaid::capture_target(turn, session).await,
        TextStep::PurchaseLimit => prepaid::submit_purchase(turn, session).await,
        TextStep::BillInquiry => postpaid::inquire(turn, session).await,
        TextStep::DepositNominal => deposit::create(turn, session).await,
        TextStep::AccountCheck => transfer::check_account(turn, session).await,
        TextStep::TransferNominal => transfer::capture_nominal(turn, session).await,
        TextStep::TransferNote => transfer::submit(turn, session).await,
    }
}

async fn report(turn: &Turn<'_>, state: FlowState, err: ShopError) {
    match &err {
        ShopError::Gateway(e) => {
            error!(sender = %turn.sender(), state = %state, error = %e, "Gateway call failed");
        }
        ShopError::Presenter(e) => {
            warn!(sender = %turn.sender(), error = %e, "Failed to render reply");
        }
        other => {
            debug!(sender = %turn.sender(), state = %state, reason = %other, "Input rejected");
        }
    }

    let Some(message) = err.user_message() else {
        return;
    };
    if let Err(e) = turn
        .shop
        .presenter
        .send_text(&turn.interaction.chat_id, &message)
        .await
    {
        warn!(sender = %turn.sender(), error = %e, "Failed to send error message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGatewayClient;
    use crate::testing::{interaction, shop_with, Rendered};

    #[test]
    fn test_prefixes_are_stripped_once() {
        for text in [".menu", "!menu", "#menu", "/menu", "\\menu", "menu", "  MENU  "] {
            assert_eq!(parse_input(text).token, "menu", "input {text:?}");
        }
        assert_eq!(parse_input("..menu").token, ".menu");
    }

    #[test]
    fn test_raw_text_keeps_case() {
        let input = parse_input("  Catatan Bulanan ");
        assert_eq!(input.raw, "Catatan Bulanan");
        assert_eq!(input.token, "catatan bulanan");
    }

    #[test]
    fn test_commands_follow_priority_order() {
        assert_eq!(
            parse_command("ls_prabayar"),
            Some(Command::Prepaid(PrepaidCommand::Open))
        );
        assert_eq!(
            parse_command("ls_pc_pay"),
            Some(Command::Postpaid(PostpaidCommand::Pay))
        );
        assert_eq!(
            parse_command("ls_dep_instant_yes"),
            Some(Command::Deposit(DepositCommand::InstantConfirm))
        );
        assert_eq!(
            parse_command("ls_trf_go"),
            Some(Command::Transfer(TransferCommand::Continue))
        );
        assert_eq!(parse_command("ls_trx_status_last"), Some(Command::TransactionStatus));
        assert_eq!(parse_command("ls_profile"), Some(Command::Profile));
        assert_eq!(parse_command("ls_help"), Some(Command::Help));
    }

    #[test]
    fn test_non_commands() {
        assert_eq!(parse_command("prabayar"), None);
        assert_eq!(parse_command("ls_unknown"), None);
        // Skip tokens are consumed by the free-text steps
        assert_eq!(parse_command("ls_pb_skip_limit"), None);
        assert_eq!(parse_command("ls_trf_skip_note"), None);
    }

    #[test]
    fn test_dispatch_table() {
        assert_eq!(text_step(FlowState::PbWaitLimit), Some(TextStep::PurchaseLimit));
        assert_eq!(
            text_step(FlowState::PascaWaitCustomerNo),
            Some(TextStep::BillInquiry)
        );
        assert_eq!(text_step(FlowState::TrfWaitNote), Some(TextStep::TransferNote));
        assert_eq!(text_step(FlowState::Idle), None);
        assert_eq!(text_step(FlowState::PascaConfirmPay), None);
    }

    #[tokio::test]
    async fn test_idle_free_text_is_ignored() {
        let mut gateway = MockGatewayClient::new();
        gateway.expect_post().never();
        let (shop, presenter) = shop_with(gateway);

        shop.handle(&interaction("halo kak")).await;

        assert!(presenter.rendered().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_creates_no_session() {
        let (shop, presenter) = shop_with(MockGatewayClient::new());

        shop.handle(&interaction("   ")).await;

        assert!(shop.sessions().is_empty().await);
        assert!(presenter.rendered().await.is_empty());
    }

    #[tokio::test]
    async fn test_menu_alias_resets_flow() {
        let (shop, presenter) = shop_with(MockGatewayClient::new());
        {
            let mut session = shop.sessions().acquire("628111").await;
            session.restart(FlowState::TrfWaitNominal);
            session.last_transfer_id = Some("TRF-1".to_string());
        }

        shop.handle(&interaction("/start")).await;

        let session = shop.sessions().snapshot("628111").await.expect("session");
        assert_eq!(session.state, FlowState::Idle);
        assert_eq!(session.last_transfer_id.as_deref(), Some("TRF-1"));
        assert!(matches!(presenter.last().await, Some(Rendered::Menu(_))));
    }
}
