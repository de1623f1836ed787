//! # Chain-Synced State
//!
//! Cached on-chain values (`number`, `message`) plus the orchestration
//! that keeps them consistent: every user intent performs its write
//! first, then refreshes the dependent reads. Cached values are only
//! ever written by a completed read - never optimistically from a
//! write's arguments.
//!
//! ## Stale-read protection
//!
//! Overlapping refreshes can complete out of order. Each read is
//! stamped from a per-field monotone counter and a completion older
//! than the last applied stamp is discarded, so the most recently
//! *completed* read is authoritative, not the most recently issued.

use alloy_primitives::{Address, U256};

use crate::client::ContractClient;
use crate::error::{ClientError, ClientResult};
use crate::provider::{ProviderManager, WalletProvider};

/// Marker message written by the "set initial number" flow.
pub const DEFAULT_MARKER_MESSAGE: &str = "Initial Number Set";

/// Ticket identifying one issued read of a cached field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadStamp {
    seq: u64,
}

/// Per-field monotone read counter with stale-discard.
#[derive(Debug, Default)]
struct ReadSeq {
    /// Stamp handed to the most recently issued read.
    issued: u64,
    /// Stamp of the most recently applied completion.
    applied: u64,
}

impl ReadSeq {
    /// Stamps a newly issued read.
    fn stamp(&mut self) -> ReadStamp {
        self.issued += 1;
        ReadStamp { seq: self.issued }
    }

    /// Accepts a completion unless a newer one already applied.
    fn try_apply(&mut self, stamp: ReadStamp) -> bool {
        if stamp.seq > self.applied {
            self.applied = stamp.seq;
            true
        } else {
            false
        }
    }
}

/// The client's local copy of the last successfully read chain values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CachedState {
    /// Last read number. `None` until the first successful read.
    number: Option<U256>,
    /// Last read message. Empty until the first successful read.
    message: String,
}

impl CachedState {
    /// Returns the last read number, if any read has completed.
    #[inline]
    #[must_use]
    pub const fn number(&self) -> Option<U256> {
        self.number
    }

    /// Renders the number for display, with the `"none"` sentinel
    /// before the first successful read.
    #[must_use]
    pub fn number_text(&self) -> String {
        self.number
            .map_or_else(|| "none".to_string(), |n| n.to_string())
    }

    /// Returns the last read message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Orchestrates write-then-refresh sequences and owns the cache.
pub struct StateSync<P: WalletProvider> {
    /// Typed call surface for the bound contract.
    client: ContractClient<P>,
    /// Last-known chain values.
    cache: CachedState,
    /// Read ordering for the number field.
    number_reads: ReadSeq,
    /// Read ordering for the message field.
    message_reads: ReadSeq,
    /// Message written by the set-initial-number flow.
    marker_message: String,
}

impl<P: WalletProvider> StateSync<P> {
    /// Creates the synchronizer over a contract client.
    #[must_use]
    pub fn new(client: ContractClient<P>) -> Self {
        Self {
            client,
            cache: CachedState::default(),
            number_reads: ReadSeq::default(),
            message_reads: ReadSeq::default(),
            marker_message: DEFAULT_MARKER_MESSAGE.to_string(),
        }
    }

    /// Overrides the marker message (from config).
    #[must_use]
    pub fn with_marker_message(mut self, message: impl Into<String>) -> Self {
        self.marker_message = message.into();
        self
    }

    /// Returns the cached values.
    #[inline]
    #[must_use]
    pub const fn cache(&self) -> &CachedState {
        &self.cache
    }

    /// Display text for the cached number.
    #[must_use]
    pub fn number_text(&self) -> String {
        self.cache.number_text()
    }

    /// The cached message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.cache.message()
    }

    /// Stamps a number read about to be issued.
    pub fn stamp_number_read(&mut self) -> ReadStamp {
        self.number_reads.stamp()
    }

    /// Applies a completed number read. Returns `false` (and leaves
    /// the cache untouched) when a newer completion already applied.
    pub fn apply_number_read(&mut self, stamp: ReadStamp, value: U256) -> bool {
        if self.number_reads.try_apply(stamp) {
            self.cache.number = Some(value);
            true
        } else {
            tracing::debug!(?stamp, "discarding stale number read");
            false
        }
    }

    /// Stamps a message read about to be issued.
    pub fn stamp_message_read(&mut self) -> ReadStamp {
        self.message_reads.stamp()
    }

    /// Applies a completed message read. Returns `false` (and leaves
    /// the cache untouched) when a newer completion already applied.
    pub fn apply_message_read(&mut self, stamp: ReadStamp, value: String) -> bool {
        if self.message_reads.try_apply(stamp) {
            self.cache.message = value;
            true
        } else {
            tracing::debug!(?stamp, "discarding stale message read");
            false
        }
    }

    /// Reads the number and updates the cache. On failure the previous
    /// cached value is untouched.
    pub fn refresh_number(&mut self) -> ClientResult<()> {
        let stamp = self.stamp_number_read();
        let value = self.client.get_number()?;
        self.apply_number_read(stamp, value);
        Ok(())
    }

    /// Reads the message and updates the cache. On failure the
    /// previous cached value is untouched.
    pub fn refresh_message(&mut self) -> ClientResult<()> {
        let stamp = self.stamp_message_read();
        let value = self.client.message()?;
        self.apply_message_read(stamp, value);
        Ok(())
    }

    /// On-mount population of both cached fields. Failures are logged
    /// and left for the next refresh; the sentinel values stay.
    pub fn initial_refresh(&mut self) {
        if let Err(error) = self.refresh_number() {
            tracing::warn!(%error, "initial number refresh failed");
        }
        if let Err(error) = self.refresh_message() {
            tracing::warn!(%error, "initial message refresh failed");
        }
    }

    /// The "set initial number" intent: validates the input, writes
    /// the marker message, writes one increment, then refreshes both
    /// fields. The first failing write aborts the sequence before the
    /// next step is attempted; the refreshes run independently of each
    /// other, and the first refresh failure is reported after both
    /// have been attempted.
    pub fn set_initial_number(
        &mut self,
        manager: &ProviderManager<P>,
        text: &str,
    ) -> ClientResult<()> {
        let trimmed = text.trim();
        // Validation happens before any provider traffic.
        if U256::from_str_radix(trimmed, 10).is_err() {
            return Err(ClientError::InvalidInput(format!(
                "not a number: {trimmed:?}"
            )));
        }
        let from = Self::signing_account(manager)?;

        self.client.set_message(self.marker_message.clone(), from)?;
        self.client.increase_number(from)?;

        // A failed number read must not stop the message refresh.
        let number = self.refresh_number();
        let message = self.refresh_message();
        number.and(message)
    }

    /// The "increase number" intent: write, then refresh the number.
    pub fn increase_number(&mut self, manager: &ProviderManager<P>) -> ClientResult<()> {
        let from = Self::signing_account(manager)?;
        self.client.increase_number(from)?;
        self.refresh_number()
    }

    /// The "decrease number" intent: write, then refresh the number.
    pub fn decrease_number(&mut self, manager: &ProviderManager<P>) -> ClientResult<()> {
        let from = Self::signing_account(manager)?;
        self.client.decrease_number(from)?;
        self.refresh_number()
    }

    /// The "update message" intent: write, then refresh the message.
    /// Rejects empty input before any provider traffic.
    pub fn update_message(&mut self, manager: &ProviderManager<P>, text: &str) -> ClientResult<()> {
        if text.is_empty() {
            return Err(ClientError::InvalidInput("message must not be empty".into()));
        }
        let from = Self::signing_account(manager)?;
        self.client.set_message(text, from)?;
        self.refresh_message()
    }

    /// Writes are only ever issued with a connected session.
    fn signing_account(manager: &ProviderManager<P>) -> ClientResult<Address> {
        manager.connected_account().ok_or(ClientError::NotConnected)
    }
}
