//! # Test Wallet
//!
//! A deterministic in-memory wallet and contract behind the
//! [`WalletProvider`] trait. No network I/O: reads and writes execute
//! against a local number/message pair, the way the deployed contract
//! would, so write-then-refresh flows can be verified exactly.
//!
//! Every provider interaction is counted, and failure modes are
//! scriptable: a wallet-side pending condition, read failures, a
//! one-shot write rejection or submission failure, and a gate that
//! holds `request_accounts` in flight for single-flight tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;

use dcounter_contract::ICounter;

use crate::provider::{ProviderError, WalletProvider};

/// The mock's on-chain state.
#[derive(Clone, Debug, Default)]
struct MockChain {
    number: U256,
    message: String,
}

/// In-memory wallet provider with a deterministic contract.
pub struct MockWallet {
    /// Accounts the wallet exposes. The first is the active one.
    accounts: Mutex<Vec<Address>>,
    /// Simulated contract storage.
    chain: Mutex<MockChain>,
    /// `request_accounts` invocations.
    account_requests: AtomicU64,
    /// Read call invocations.
    read_calls: AtomicU64,
    /// Transaction submissions.
    transactions: AtomicU64,
    /// When set, `request_accounts` reports the wallet's own pending
    /// condition (EIP-1193 code -32002).
    simulate_pending: AtomicBool,
    /// When set, every read call fails.
    fail_reads: AtomicBool,
    /// One-shot: the next transaction fails at submission.
    fail_next_write: AtomicBool,
    /// One-shot: the next transaction is declined by the user.
    reject_next_write: AtomicBool,
    /// When present, `request_accounts` blocks on this gate.
    request_gate: Mutex<Option<Receiver<()>>>,
    /// accountsChanged notification channel.
    accounts_tx: Sender<Vec<Address>>,
    /// Receiver handed to the manager's subscription.
    accounts_rx: Receiver<Vec<Address>>,
}

impl MockWallet {
    /// Creates a wallet with one default account and a zeroed chain.
    #[must_use]
    pub fn new() -> Self {
        let (accounts_tx, accounts_rx) = unbounded();
        Self {
            accounts: Mutex::new(vec![Address::repeat_byte(0x11)]),
            chain: Mutex::new(MockChain::default()),
            account_requests: AtomicU64::new(0),
            read_calls: AtomicU64::new(0),
            transactions: AtomicU64::new(0),
            simulate_pending: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_next_write: AtomicBool::new(false),
            reject_next_write: AtomicBool::new(false),
            request_gate: Mutex::new(None),
            accounts_tx,
            accounts_rx,
        }
    }

    /// Replaces the wallet's account list.
    #[must_use]
    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        *self.accounts.lock() = accounts;
        self
    }

    /// Returns the wallet's first account, if any.
    #[must_use]
    pub fn first_account(&self) -> Option<Address> {
        self.accounts.lock().first().copied()
    }

    /// Seeds the simulated contract storage.
    pub fn seed(&self, number: U256, message: impl Into<String>) {
        let mut chain = self.chain.lock();
        chain.number = number;
        chain.message = message.into();
    }

    /// Current simulated number.
    #[must_use]
    pub fn number(&self) -> U256 {
        self.chain.lock().number
    }

    /// Current simulated message.
    #[must_use]
    pub fn message(&self) -> String {
        self.chain.lock().message.clone()
    }

    /// Toggles the wallet-side pending condition.
    pub fn set_simulate_pending(&self, pending: bool) {
        self.simulate_pending.store(pending, Ordering::SeqCst);
    }

    /// Toggles failing reads.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes the next transaction fail at submission.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Makes the next transaction be declined by the user.
    pub fn reject_next_write(&self) {
        self.reject_next_write.store(true, Ordering::SeqCst);
    }

    /// Holds the next `request_accounts` call in flight until the
    /// returned sender fires (or is dropped).
    #[must_use]
    pub fn hold_next_request(&self) -> Sender<()> {
        let (release_tx, release_rx) = bounded(1);
        *self.request_gate.lock() = Some(release_rx);
        release_tx
    }

    /// Delivers an accountsChanged notification.
    pub fn emit_accounts_changed(&self, accounts: Vec<Address>) {
        let _ = self.accounts_tx.send(accounts);
    }

    /// Number of `request_accounts` invocations.
    #[must_use]
    pub fn account_request_count(&self) -> u64 {
        self.account_requests.load(Ordering::SeqCst)
    }

    /// Number of read call invocations.
    #[must_use]
    pub fn read_count(&self) -> u64 {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Number of transaction submissions.
    #[must_use]
    pub fn transaction_count(&self) -> u64 {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Total provider interactions of any kind.
    #[must_use]
    pub fn provider_call_count(&self) -> u64 {
        self.account_request_count() + self.read_count() + self.transaction_count()
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a generic RPC failure.
fn rpc(code: i64, message: &str) -> ProviderError {
    ProviderError::Rpc {
        code,
        message: message.to_string(),
    }
}

/// Extracts the four-byte selector from calldata.
fn selector_of(data: &[u8]) -> Result<[u8; 4], ProviderError> {
    data.get(..4)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .ok_or_else(|| rpc(-32602, "calldata too short"))
}

impl WalletProvider for MockWallet {
    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.account_requests.fetch_add(1, Ordering::SeqCst);

        let gate = self.request_gate.lock().take();
        if let Some(gate) = gate {
            // Park here until the test releases (or drops) the gate
            let _ = gate.recv();
        }

        if self.simulate_pending.load(Ordering::SeqCst) {
            return Err(ProviderError::RequestPending);
        }
        Ok(self.accounts.lock().clone())
    }

    fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(rpc(-32000, "simulated node failure"));
        }

        let selector = selector_of(&data)?;
        let chain = self.chain.lock();
        if selector == ICounter::getNumberCall::SELECTOR {
            Ok(chain.number.abi_encode().into())
        } else if selector == ICounter::messageCall::SELECTOR {
            Ok(chain.message.abi_encode().into())
        } else {
            Err(rpc(-32601, "unknown read method"))
        }
    }

    fn send_transaction(
        &self,
        from: Address,
        _to: Address,
        data: Bytes,
    ) -> Result<(), ProviderError> {
        self.transactions.fetch_add(1, Ordering::SeqCst);

        if self.reject_next_write.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::UserRejected);
        }
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(rpc(-32000, "simulated submission failure"));
        }
        if !self.accounts.lock().contains(&from) {
            return Err(rpc(-32000, "unknown from account"));
        }

        let selector = selector_of(&data)?;
        let mut chain = self.chain.lock();
        if selector == ICounter::setMessageCall::SELECTOR {
            let call = ICounter::setMessageCall::abi_decode(&data, true)
                .map_err(|error| rpc(-32602, &error.to_string()))?;
            chain.message = call.newMessage;
            Ok(())
        } else if selector == ICounter::increaseNumberCall::SELECTOR {
            chain.number = chain
                .number
                .checked_add(U256::from(1))
                .ok_or_else(|| rpc(3, "execution reverted: counter overflow"))?;
            Ok(())
        } else if selector == ICounter::decreaseNumberCall::SELECTOR {
            chain.number = chain
                .number
                .checked_sub(U256::from(1))
                .ok_or_else(|| rpc(3, "execution reverted: counter underflow"))?;
            Ok(())
        } else {
            Err(rpc(-32601, "unknown write method"))
        }
    }

    fn account_events(&self) -> Receiver<Vec<Address>> {
        self.accounts_rx.clone()
    }
}
