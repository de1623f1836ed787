//! # Golden Path Scenario
//!
//! The complete UI flow, end to end, against the in-memory wallet:
//!
//! Connect → Initial Refresh → Set Initial Number → Increase ×2 →
//! Decrease → Update Message → Wallet Disconnect
//!
//! Run with: `cargo run --package dcounter_client --bin golden_path`

use std::sync::Arc;
use std::time::Instant;

use dcounter_client::testing::MockWallet;
use dcounter_client::{
    AppConfig, ClientError, ContractClient, ProviderManager, SessionEvent, StateSync,
};

fn main() {
    let start = Instant::now();

    let config = AppConfig::default();
    let wallet = Arc::new(MockWallet::new());
    let manager =
        ProviderManager::new(Some(Arc::clone(&wallet))).with_event_buffer(config.event_buffer);
    let events = manager.subscribe();
    let client = ContractClient::new(
        Arc::clone(&wallet),
        config.binding().expect("default binding"),
    );
    let mut sync = StateSync::new(client).with_marker_message(config.marker_message.clone());

    // Step 1: connect the wallet
    let account = manager.connect().expect("wallet connects");
    println!("[1] connected as {account}");
    assert_eq!(events.try_recv(), Ok(SessionEvent::Connected(account)));

    // Step 2: on-mount refresh populates the cache
    sync.initial_refresh();
    println!(
        "[2] initial state: number={} message={:?}",
        sync.number_text(),
        sync.message()
    );
    assert_eq!(sync.number_text(), "0");

    // Step 3: a rejected input never reaches the provider
    let calls_before = wallet.provider_call_count();
    assert_eq!(
        sync.set_initial_number(&manager, "abc"),
        Err(ClientError::InvalidInput("not a number: \"abc\"".into()))
    );
    assert_eq!(wallet.provider_call_count(), calls_before);
    println!("[3] non-numeric input rejected before any provider traffic");

    // Step 4: set initial number (marker message + one increment)
    sync.set_initial_number(&manager, "5").expect("sequence runs");
    println!(
        "[4] after set-initial: number={} message={:?}",
        sync.number_text(),
        sync.message()
    );
    assert_eq!(sync.number_text(), "1");
    assert_eq!(sync.message(), "Initial Number Set");

    // Step 5: increase twice, decrease once
    sync.increase_number(&manager).expect("increase");
    sync.increase_number(&manager).expect("increase");
    sync.decrease_number(&manager).expect("decrease");
    println!("[5] after +2/-1: number={}", sync.number_text());
    assert_eq!(sync.number_text(), "2");

    // Step 6: update the message
    sync.update_message(&manager, "hello chain").expect("update");
    println!("[6] message={:?}", sync.message());
    assert_eq!(sync.message(), "hello chain");

    // Step 7: the wallet drops all accounts
    wallet.emit_accounts_changed(Vec::new());
    manager.process_account_events();
    assert!(!manager.is_connected());
    assert_eq!(
        sync.increase_number(&manager),
        Err(ClientError::NotConnected)
    );
    println!("[7] wallet disconnected, writes refused");

    println!(
        "GOLDEN PATH OK in {}us ({} provider calls)",
        start.elapsed().as_micros(),
        wallet.provider_call_count()
    );
}
