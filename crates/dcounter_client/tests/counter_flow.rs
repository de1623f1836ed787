//! # Counter Flow Verification Tests
//!
//! End-to-end verification of the synchronization core against the
//! deterministic in-memory wallet:
//!
//! 1. Writes are never issued without a connected session
//! 2. Connection requests are single-flight
//! 3. Read-after-write consistency
//! 4. Input validation happens before any provider traffic
//! 5. Aborted write sequences
//! 6. Stale read completions never overwrite newer ones
//!
//! Run with: `cargo test --package dcounter_client --test counter_flow`

use std::sync::Arc;
use std::thread;

use alloy_primitives::{Address, U256};

use dcounter_client::contract::ContractBinding;
use dcounter_client::testing::MockWallet;
use dcounter_client::{
    ClientError, ContractClient, ProviderManager, ProviderSession, SessionEvent, StateSync,
};

/// Everything a scenario needs: wallet, manager, synchronizer.
fn setup() -> (
    Arc<MockWallet>,
    ProviderManager<MockWallet>,
    StateSync<MockWallet>,
) {
    let wallet = Arc::new(MockWallet::new());
    let manager = ProviderManager::new(Some(Arc::clone(&wallet)));
    let client = ContractClient::new(Arc::clone(&wallet), ContractBinding::counter());
    let sync = StateSync::new(client);
    (wallet, manager, sync)
}

// ============================================================================
// CONNECTION GUARDS
// ============================================================================

#[test]
fn write_is_never_issued_without_connection() {
    let (wallet, manager, mut sync) = setup();

    assert_eq!(
        sync.increase_number(&manager),
        Err(ClientError::NotConnected)
    );
    assert_eq!(
        sync.decrease_number(&manager),
        Err(ClientError::NotConnected)
    );
    assert_eq!(
        sync.update_message(&manager, "hi"),
        Err(ClientError::NotConnected)
    );
    assert_eq!(wallet.transaction_count(), 0);
}

#[test]
fn concurrent_connect_is_single_flight() {
    let (wallet, manager, _sync) = setup();
    let manager = Arc::new(manager);

    // Hold the first request in flight inside the provider.
    let release = wallet.hold_next_request();

    let first = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || manager.connect())
    };

    // Wait until the first request reaches the provider (the pending
    // flag is taken before that point).
    while wallet.account_request_count() == 0 {
        thread::yield_now();
    }

    // The overlapping attempt is refused locally.
    assert_eq!(manager.connect(), Err(ClientError::RequestAlreadyPending));
    assert_eq!(wallet.account_request_count(), 1);

    // Release the wallet prompt; the first attempt completes.
    release.send(()).unwrap();
    let account = first.join().unwrap().unwrap();
    assert_eq!(manager.connected_account(), Some(account));

    // The flag was released: a later connect contacts the provider.
    assert!(manager.connect().is_ok());
    assert_eq!(wallet.account_request_count(), 2);
}

#[test]
fn accounts_changed_empty_disconnects_from_any_state() {
    let (wallet, manager, _sync) = setup();
    let events = manager.subscribe();

    manager.connect().unwrap();
    assert!(manager.is_connected());
    let _ = events.try_recv(); // drop the Connected event

    wallet.emit_accounts_changed(Vec::new());
    assert_eq!(manager.process_account_events(), 1);
    assert_eq!(manager.session(), ProviderSession::Disconnected);
    assert_eq!(events.try_recv(), Ok(SessionEvent::Disconnected));

    // Already disconnected: a second empty notification is harmless.
    wallet.emit_accounts_changed(Vec::new());
    assert_eq!(manager.process_account_events(), 1);
    assert_eq!(manager.session(), ProviderSession::Disconnected);
}

// ============================================================================
// READ-AFTER-WRITE CONSISTENCY
// ============================================================================

#[test]
fn increase_and_decrease_refresh_the_cache() {
    let (_wallet, manager, mut sync) = setup();
    manager.connect().unwrap();
    sync.initial_refresh();
    assert_eq!(sync.number_text(), "0");

    sync.increase_number(&manager).unwrap();
    assert_eq!(sync.number_text(), "1");

    sync.increase_number(&manager).unwrap();
    assert_eq!(sync.number_text(), "2");

    sync.decrease_number(&manager).unwrap();
    assert_eq!(sync.number_text(), "1");
}

#[test]
fn failed_refresh_preserves_the_previous_value() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();
    wallet.seed(U256::from(7), "seeded");
    sync.initial_refresh();
    assert_eq!(sync.number_text(), "7");
    assert_eq!(sync.message(), "seeded");

    wallet.set_fail_reads(true);
    assert!(matches!(
        sync.refresh_number(),
        Err(ClientError::ReadFailed(_))
    ));
    assert!(matches!(
        sync.refresh_message(),
        Err(ClientError::ReadFailed(_))
    ));

    // Last-known-good values remain authoritative.
    assert_eq!(sync.number_text(), "7");
    assert_eq!(sync.message(), "seeded");
}

#[test]
fn stale_read_completion_is_discarded() {
    let (_wallet, _manager, mut sync) = setup();

    // Two overlapping number reads; the earlier one completes last.
    let earlier = sync.stamp_number_read();
    let later = sync.stamp_number_read();

    assert!(sync.apply_number_read(later, U256::from(10)));
    assert!(!sync.apply_number_read(earlier, U256::from(9)));
    assert_eq!(sync.number_text(), "10");

    // Same protocol for the message field.
    let earlier = sync.stamp_message_read();
    let later = sync.stamp_message_read();
    assert!(sync.apply_message_read(later, "new".to_string()));
    assert!(!sync.apply_message_read(earlier, "old".to_string()));
    assert_eq!(sync.message(), "new");
}

// ============================================================================
// SET INITIAL NUMBER
// ============================================================================

#[test]
fn non_numeric_input_issues_zero_provider_calls() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();
    let calls_before = wallet.provider_call_count();

    assert!(matches!(
        sync.set_initial_number(&manager, "abc"),
        Err(ClientError::InvalidInput(_))
    ));
    assert_eq!(wallet.provider_call_count(), calls_before);
}

#[test]
fn numeric_input_without_account_issues_zero_writes() {
    let (wallet, manager, mut sync) = setup();

    assert_eq!(
        sync.set_initial_number(&manager, "5"),
        Err(ClientError::NotConnected)
    );
    assert_eq!(wallet.transaction_count(), 0);
}

#[test]
fn set_initial_number_writes_marker_then_increment() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();

    sync.set_initial_number(&manager, "5").unwrap();

    assert_eq!(wallet.transaction_count(), 2);
    assert_eq!(wallet.number(), U256::from(1));
    assert_eq!(wallet.message(), "Initial Number Set");
    // Both refreshes ran after the writes.
    assert_eq!(sync.number_text(), "1");
    assert_eq!(sync.message(), "Initial Number Set");
}

#[test]
fn failed_marker_write_aborts_the_sequence() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();
    wallet.fail_next_write();

    assert!(matches!(
        sync.set_initial_number(&manager, "5"),
        Err(ClientError::TransactionFailed(_))
    ));

    // Only the marker write was attempted; the increment never was.
    assert_eq!(wallet.transaction_count(), 1);
    assert_eq!(wallet.number(), U256::ZERO);
    // No refresh ran, the cache still shows the sentinel.
    assert_eq!(sync.number_text(), "none");
}

#[test]
fn failed_number_refresh_still_attempts_the_message_refresh() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();
    wallet.set_fail_reads(true);
    let reads_before = wallet.read_count();

    assert!(matches!(
        sync.set_initial_number(&manager, "5"),
        Err(ClientError::ReadFailed(_))
    ));

    // Both writes went through, and both refreshes were attempted
    // even though the number read failed first.
    assert_eq!(wallet.transaction_count(), 2);
    assert_eq!(wallet.read_count(), reads_before + 2);
    // The cache keeps its last-known-good (here: sentinel) values.
    assert_eq!(sync.number_text(), "none");
    assert_eq!(sync.message(), "");
}

#[test]
fn rejected_write_leaves_cache_untouched() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();
    sync.initial_refresh();
    wallet.reject_next_write();

    assert_eq!(
        sync.increase_number(&manager),
        Err(ClientError::UserRejected)
    );
    assert_eq!(sync.number_text(), "0");
    assert_eq!(wallet.number(), U256::ZERO);
}

// ============================================================================
// UPDATE MESSAGE
// ============================================================================

#[test]
fn empty_message_issues_no_calls() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();
    let calls_before = wallet.provider_call_count();

    assert!(matches!(
        sync.update_message(&manager, ""),
        Err(ClientError::InvalidInput(_))
    ));
    assert_eq!(wallet.provider_call_count(), calls_before);
}

#[test]
fn update_message_is_one_write_then_one_refresh() {
    let (wallet, manager, mut sync) = setup();
    manager.connect().unwrap();

    let tx_before = wallet.transaction_count();
    let reads_before = wallet.read_count();

    sync.update_message(&manager, "hi").unwrap();

    assert_eq!(wallet.transaction_count(), tx_before + 1);
    assert_eq!(wallet.read_count(), reads_before + 1);
    assert_eq!(sync.message(), "hi");
}

// ============================================================================
// ACCOUNT SWITCHING
// ============================================================================

#[test]
fn writes_follow_the_switched_account() {
    let first = Address::repeat_byte(0x01);
    let second = Address::repeat_byte(0x02);
    let wallet = Arc::new(MockWallet::new().with_accounts(vec![first, second]));
    let manager = ProviderManager::new(Some(Arc::clone(&wallet)));
    let client = ContractClient::new(Arc::clone(&wallet), ContractBinding::counter());
    let mut sync = StateSync::new(client);

    assert_eq!(manager.connect().unwrap(), first);

    wallet.emit_accounts_changed(vec![second]);
    manager.process_account_events();
    assert_eq!(manager.connected_account(), Some(second));

    // The write goes out under the new account.
    sync.increase_number(&manager).unwrap();
    assert_eq!(sync.number_text(), "1");
}
