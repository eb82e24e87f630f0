//! Per-sender conversation sessions
//!
//! Sessions live in memory only. A session idle for longer than the TTL is
//! reset on its next read: state and context go back to empty while the
//! sticky ids survive.

use crate::catalog::{Bank, DepositMethod, PendingBill, Product};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

/// Position of a sender in the conversation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    /// No flow in progress
    #[default]
    Idle,
    /// Prepaid category menu shown
    PbPickCat,
    /// Prepaid item list or item detail shown
    PbPickItem,
    /// Waiting for the prepaid target number
    PbWaitTarget,
    /// Waiting for an optional limit price
    PbWaitLimit,
    /// Postpaid service menu shown
    PascaPickItem,
    /// Waiting for the postpaid customer number
    PascaWaitCustomerNo,
    /// Bill shown, waiting for the pay confirmation
    PascaConfirmPay,
    /// Deposit method menu shown
    DepPickMethod,
    /// Waiting for the deposit nominal
    DepWaitNominal,
    /// Instant deposit preview shown, waiting for confirmation
    DepInstantPick,
    /// Bank menu shown
    TrfPickBank,
    /// Waiting for the destination account number
    TrfWaitAccount,
    /// Account holder shown, waiting for the continue confirmation
    TrfConfirmName,
    /// Waiting for the transfer nominal
    TrfWaitNominal,
    /// Waiting for an optional transfer note
    TrfWaitNote,
}

impl FlowState {
    /// Stable upper-case name, as used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::PbPickCat => "PB_PICK_CAT",
            Self::PbPickItem => "PB_PICK_ITEM",
            Self::PbWaitTarget => "PB_WAIT_TARGET",
            Self::PbWaitLimit => "PB_WAIT_LIMIT",
            Self::PascaPickItem => "PASCA_PICK_ITEM",
            Self::PascaWaitCustomerNo => "PASCA_WAIT_CUSTOMER_NO",
            Self::PascaConfirmPay => "PASCA_CONFIRM_PAY",
            Self::DepPickMethod => "DEP_PICK_METHOD",
            Self::DepWaitNominal => "DEP_WAIT_NOMINAL",
            Self::DepInstantPick => "DEP_INSTANT_PICK",
            Self::TrfPickBank => "TRF_PICK_BANK",
            Self::TrfWaitAccount => "TRF_WAIT_ACCOUNT",
            Self::TrfConfirmName => "TRF_CONFIRM_NAME",
            Self::TrfWaitNominal => "TRF_WAIT_NOMINAL",
            Self::TrfWaitNote => "TRF_WAIT_NOTE",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of the last prepaid/postpaid transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Prepaid purchase
    Prepaid,
    /// Postpaid bill payment
    Postpaid,
}

impl TransactionKind {
    /// Gateway value of the status lookup `type` field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepaid => "prabayar",
            Self::Postpaid => "pascabayar",
        }
    }
}

/// Flow-scoped values, emptied whenever the session returns to IDLE
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowContext {
    /// Selected prepaid or postpaid product
    pub product: Option<Product>,
    /// Prepaid destination number / customer id
    pub target: Option<String>,
    /// Bill returned by the inquiry, required before paying
    pub pending_bill: Option<PendingBill>,
    /// Selected deposit method
    pub method: Option<DepositMethod>,
    /// Selected transfer bank
    pub bank: Option<Bank>,
    /// Verified destination account number
    pub account_number: Option<String>,
    /// Account holder returned by the name check
    pub account_name: Option<String>,
    /// Transfer nominal
    pub nominal: Option<u64>,
}

/// Conversation state of one sender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Current state
    pub state: FlowState,
    /// Flow-scoped values
    pub context: FlowContext,
    /// Last prepaid/postpaid transaction id
    pub last_transaction_id: Option<String>,
    /// Kind of the last transaction
    pub last_transaction_kind: Option<TransactionKind>,
    /// Last deposit id
    pub last_deposit_id: Option<String>,
    /// Last transfer id
    pub last_transfer_id: Option<String>,
    #[serde(skip, default = "Instant::now")]
    last_active: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh IDLE session with no sticky ids
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            context: FlowContext::default(),
            last_transaction_id: None,
            last_transaction_kind: None,
            last_deposit_id: None,
            last_transfer_id: None,
            last_active: Instant::now(),
        }
    }

    /// Back to IDLE with an empty context; sticky ids are kept.
    pub fn reset(&mut self) {
        self.state = FlowState::Idle;
        self.context = FlowContext::default();
    }

    /// Reset, then enter `state`.
    pub fn restart(&mut self, state: FlowState) {
        self.reset();
        self.state = state;
    }

    /// Whether the session has been idle for at least `ttl`
    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.last_active.elapsed() >= ttl
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// Registry of sessions keyed by sender id
///
/// Each session has its own async mutex; holding the guard for a whole
/// interaction serializes overlapping messages from the same sender.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store with the given idle TTL
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Lock the session of `sender`, creating it on first contact.
    ///
    /// An expired session is reset before it is handed out. Either way the
    /// activity timestamp is refreshed.
    pub async fn acquire(&self, sender: &str) -> OwnedMutexGuard<Session> {
        let slot = self.slot(sender).await;
        let mut session = slot.lock_owned().await;
        if session.is_expired(self.ttl) {
            debug!(sender = %sender, state = %session.state, "Session expired, resetting");
            session.reset();
        }
        session.touch();
        session
    }

    /// Copy of the session of `sender`, if one exists
    pub async fn snapshot(&self, sender: &str) -> Option<Session> {
        let slot = {
            let sessions = self.sessions.read().await;
            sessions.get(sender).cloned()
        }?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    /// Number of known senders
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sender has been seen yet
    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn slot(&self, sender: &str) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(slot) = sessions.get(sender) {
                return Arc::clone(slot);
            }
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(sender.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new()))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_created_lazily_as_idle() {
        let store = SessionStore::new(Duration::from_secs(1800));
        assert!(store.is_empty().await);

        let session = store.acquire("628111").await;
        assert_eq!(session.state, FlowState::Idle);
        assert!(session.last_deposit_id.is_none());
        drop(session);

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_state_survives_between_interactions() {
        let store = SessionStore::new(Duration::from_secs(1800));
        {
            let mut session = store.acquire("628111").await;
            session.state = FlowState::DepWaitNominal;
        }
        let session = store.acquire("628111").await;
        assert_eq!(session.state, FlowState::DepWaitNominal);
    }

    #[tokio::test]
    async fn test_expiry_resets_state_but_keeps_sticky_ids() {
        let store = SessionStore::new(Duration::from_millis(40));
        {
            let mut session = store.acquire("628111").await;
            session.state = FlowState::TrfWaitNote;
            session.context.nominal = Some(50_000);
            session.last_deposit_id = Some("DEP-1".to_string());
            session.last_transaction_kind = Some(TransactionKind::Prepaid);
        }

        tokio::time::sleep(Duration::from_millis(80)).await;

        let session = store.acquire("628111").await;
        assert_eq!(session.state, FlowState::Idle);
        assert_eq!(session.context, FlowContext::default());
        assert_eq!(session.last_deposit_id.as_deref(), Some("DEP-1"));
        assert_eq!(session.last_transaction_kind, Some(TransactionKind::Prepaid));
    }

    #[test]
    fn test_reset_keeps_sticky_ids() {
        let mut session = Session::new();
        session.restart(FlowState::PascaConfirmPay);
        session.context.target = Some("0812".to_string());
        session.last_transfer_id = Some("TRF-9".to_string());

        session.reset();
        assert_eq!(session.state, FlowState::Idle);
        assert!(session.context.target.is_none());
        assert_eq!(session.last_transfer_id.as_deref(), Some("TRF-9"));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(FlowState::PascaWaitCustomerNo.to_string(), "PASCA_WAIT_CUSTOMER_NO");
        assert_eq!(FlowState::default(), FlowState::Idle);
    }
}
