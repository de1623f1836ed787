//! # Wallet Provider Management
//!
//! Connection lifecycle for the injected wallet provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  accountsChanged  ┌──────────────────┐  SessionEvent  ┌──────────┐
//! │   Wallet     │ ────────────────▶ │ ProviderManager  │ ─────────────▶ │ Listener │
//! │  (injected)  │                   │  (state machine) │                │ (UI/etc) │
//! └──────────────┘                   └──────────────────┘                └──────────┘
//! ```
//!
//! The provider is an injected capability ([`WalletProvider`]), not a
//! global - hosts pass in the real wallet bridge, tests pass in
//! [`crate::testing::MockWallet`]. Session transitions are delivered
//! to interested listeners over a channel rather than through any
//! rendering mechanism.
//!
//! ## State machine
//!
//! ```text
//! Disconnected ──connect ok──▶ Connected ──accountsChanged([])──▶ Disconnected
//!      ▲  │                        │
//!      │  └─connect failed─┐       └─accountsChanged([a,..])──▶ Connected (new account)
//!      └───────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use thiserror::Error;

use crate::error::{ClientError, ClientResult};

/// EIP-1193 error code for "a request is already pending".
pub const CODE_REQUEST_PENDING: i64 = -32002;

/// EIP-1193 error code for "user rejected the request".
pub const CODE_USER_REJECTED: i64 = 4001;

/// Wire-level failure reported by the wallet provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The wallet already has a permission prompt open (code -32002).
    #[error("wallet request already pending")]
    RequestPending,

    /// The user declined the wallet prompt (code 4001).
    #[error("user rejected the wallet request")]
    UserRejected,

    /// Any other provider/RPC failure.
    #[error("provider error {code}: {message}")]
    Rpc {
        /// Provider-defined error code.
        code: i64,
        /// Human-readable message.
        message: String,
    },
}

impl ProviderError {
    /// Classifies a raw provider error code.
    #[must_use]
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        match code {
            CODE_REQUEST_PENDING => Self::RequestPending,
            CODE_USER_REJECTED => Self::UserRejected,
            _ => Self::Rpc {
                code,
                message: message.into(),
            },
        }
    }
}

/// The injected wallet capability.
///
/// Everything the core needs from the browser wallet: an account
/// request, a read call, a signed state-mutating transaction, and a
/// channel of account-change notifications.
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for the active account list. May open a
    /// permission prompt; blocks until the user resolves it.
    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Executes a read call against the provider's current view of
    /// chain state. No signature, no mutation.
    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

    /// Submits a state-mutating transaction signed by `from`. Blocks
    /// until the wallet confirms or declines submission.
    fn send_transaction(&self, from: Address, to: Address, data: Bytes)
        -> Result<(), ProviderError>;

    /// Returns the receiver for account-change notifications. Each
    /// message carries the wallet's new account list.
    fn account_events(&self) -> Receiver<Vec<Address>>;
}

/// Current wallet session.
///
/// The account lives inside the `Connected` variant, so "an account is
/// defined if and only if the session is connected" holds by
/// construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProviderSession {
    /// No wallet session.
    #[default]
    Disconnected,
    /// A connection request is being resolved.
    Connecting,
    /// A wallet account is active.
    Connected {
        /// The active signing account.
        account: Address,
    },
}

impl ProviderSession {
    /// Returns `true` when an account is active.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Returns the active account, if any.
    #[inline]
    #[must_use]
    pub const fn account(&self) -> Option<Address> {
        match self {
            Self::Connected { account } => Some(*account),
            _ => None,
        }
    }
}

/// Session transition notifications delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A connection completed with the given account.
    Connected(Address),
    /// The wallet switched to a different account.
    AccountChanged(Address),
    /// The wallet reported an empty account list.
    Disconnected,
}

/// Releases the single-flight connection flag on every exit path.
struct PendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PendingGuard<'a> {
    /// Acquires the flag, or returns `None` if a request is in flight.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Default capacity of the session event channel.
const DEFAULT_EVENT_BUFFER: usize = 64;

/// Owns the wallet connection lifecycle.
///
/// Holds the single active session, guards connection requests so at
/// most one is ever in flight, and republishes account changes as
/// [`SessionEvent`]s over a cloneable channel.
pub struct ProviderManager<P: WalletProvider> {
    /// The injected provider, or `None` when no wallet is present.
    provider: Option<Arc<P>>,
    /// Current session state.
    session: Mutex<ProviderSession>,
    /// Single-slot guard: at most one connection request in flight.
    pending: AtomicBool,
    /// Account-change subscription, registered at connect time.
    account_rx: Mutex<Option<Receiver<Vec<Address>>>>,
    /// Session event fan-out.
    events_tx: Sender<SessionEvent>,
    /// Cloneable receiver handed to subscribers.
    events_rx: Receiver<SessionEvent>,
}

impl<P: WalletProvider> ProviderManager<P> {
    /// Creates a manager over the detected provider. Pass `None` when
    /// the environment has no wallet injected.
    #[must_use]
    pub fn new(provider: Option<Arc<P>>) -> Self {
        let (events_tx, events_rx) = bounded(DEFAULT_EVENT_BUFFER);
        Self {
            provider,
            session: Mutex::new(ProviderSession::Disconnected),
            pending: AtomicBool::new(false),
            account_rx: Mutex::new(None),
            events_tx,
            events_rx,
        }
    }

    /// Resizes the session event channel.
    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        let (events_tx, events_rx) = bounded(capacity);
        self.events_tx = events_tx;
        self.events_rx = events_rx;
        self
    }

    /// Returns the current session snapshot.
    #[inline]
    #[must_use]
    pub fn session(&self) -> ProviderSession {
        *self.session.lock()
    }

    /// Returns `true` when an account is active.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session().is_connected()
    }

    /// Returns the active account, if any.
    #[inline]
    #[must_use]
    pub fn connected_account(&self) -> Option<Address> {
        self.session().account()
    }

    /// Returns a clone of the session event receiver.
    ///
    /// Multiple subscribers can be created for fan-out.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.events_rx.clone()
    }

    /// Requests a wallet connection.
    ///
    /// Fails with [`ClientError::ProviderUnavailable`] when no wallet
    /// is injected, and with [`ClientError::RequestAlreadyPending`]
    /// when a request is already in flight - in that case the provider
    /// is not contacted at all. On success the first returned address
    /// becomes the active account and the account-change subscription
    /// is registered. The in-flight flag is released on every exit
    /// path, and a failed attempt leaves the session exactly as it
    /// was - a live connection survives a failed re-connect.
    pub fn connect(&self) -> ClientResult<Address> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(ClientError::ProviderUnavailable)?;

        let Some(_pending) = PendingGuard::acquire(&self.pending) else {
            tracing::debug!("connection request already in flight, not contacting provider");
            return Err(ClientError::RequestAlreadyPending);
        };

        // Snapshot so a failed attempt restores the last-known-good
        // session instead of tearing down a live one.
        let previous = *self.session.lock();
        *self.session.lock() = ProviderSession::Connecting;

        match provider.request_accounts() {
            Ok(accounts) => {
                let Some(account) = accounts.first().copied() else {
                    *self.session.lock() = previous;
                    return Err(ClientError::ConnectionFailed(
                        "provider returned no accounts".into(),
                    ));
                };
                *self.account_rx.lock() = Some(provider.account_events());
                *self.session.lock() = ProviderSession::Connected { account };
                self.emit(SessionEvent::Connected(account));
                tracing::info!(%account, "wallet connected");
                Ok(account)
            }
            Err(error) => {
                *self.session.lock() = previous;
                tracing::warn!(%error, "wallet connection failed");
                Err(match error {
                    ProviderError::RequestPending => ClientError::RequestAlreadyPending,
                    ProviderError::UserRejected => ClientError::UserRejected,
                    ProviderError::Rpc { .. } => ClientError::ConnectionFailed(error.to_string()),
                })
            }
        }
    }

    /// Drains pending account-change notifications and applies them to
    /// the session. Returns the number of notifications processed.
    ///
    /// An empty account list resets the session to `Disconnected`; a
    /// nonempty list adopts the first address.
    pub fn process_account_events(&self) -> usize {
        let subscription = self.account_rx.lock();
        let Some(receiver) = subscription.as_ref() else {
            return 0;
        };

        let mut processed = 0;
        while let Ok(accounts) = receiver.try_recv() {
            self.apply_accounts_changed(&accounts);
            processed += 1;
        }
        processed
    }

    /// Applies one account-change notification.
    fn apply_accounts_changed(&self, accounts: &[Address]) {
        match accounts.first().copied() {
            None => {
                *self.session.lock() = ProviderSession::Disconnected;
                tracing::info!("wallet reported no accounts, session disconnected");
                self.emit(SessionEvent::Disconnected);
            }
            Some(account) => {
                *self.session.lock() = ProviderSession::Connected { account };
                tracing::info!(%account, "wallet switched account");
                self.emit(SessionEvent::AccountChanged(account));
            }
        }
    }

    /// Publishes a session event. Subscribers that fell behind a full
    /// buffer simply miss it.
    fn emit(&self, event: SessionEvent) {
        let _ = self.events_tx.try_send(event);
    }
}
