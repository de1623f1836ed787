//! # DCOUNTER Client
//!
//! Client-side orchestration for the deployed counter contract:
//! wallet connection lifecycle, typed contract calls, and the
//! read-after-write protocol that keeps the cached `number` and
//! `message` consistent with chain state.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   intents    ┌──────────────┐   writes    ┌──────────────┐
//! │  UI          │ ───────────▶ │  StateSync   │ ──────────▶ │ ContractClient│
//! │  (external)  │ ◀─────────── │  (cache)     │ ◀────────── │  (typed calls)│
//! └──────────────┘   values     └──────────────┘   reads     └──────┬───────┘
//!        ▲                                                          │
//!        │ SessionEvent        ┌──────────────────┐                 │
//!        └──────────────────── │ ProviderManager  │ ◀───────────────┘
//!                              │ (wallet session) │    WalletProvider
//!                              └──────────────────┘
//! ```
//!
//! Every user intent performs its write first, then refreshes the
//! dependent reads; cached values are only ever produced by completed
//! reads. The wallet is an injected [`WalletProvider`] capability, so
//! the whole core runs against [`testing::MockWallet`] with no network.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod sync;
pub mod testing;

pub use client::ContractClient;
pub use config::AppConfig;
pub use error::{ClientError, ClientResult};
pub use provider::{
    ProviderError, ProviderManager, ProviderSession, SessionEvent, WalletProvider,
};
pub use sync::{CachedState, ReadStamp, StateSync, DEFAULT_MARKER_MESSAGE};

// Re-export the contract surface for hosts
pub use dcounter_contract as contract;
