//! Contract Test: Driver Loop
//!
//! Constraints verified:
//! - The address is resolved once per cycle, before any domain is touched
//! - A failed lookup skips every domain and waits for the error interval
//! - Partial failure is counted but classified as an overall failure
//! - A fully successful cycle waits for the success interval
//!
//! Timing tests run on paused tokio time, so a 300 s wait completes
//! instantly while `Instant` still observes the full interval.

mod common;

use common::*;
use ddns_core::error::Error;
use ddns_core::{CycleOutcome, CycleStatus, DdnsEngine, EngineEvent, WaitState};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn partial_failure_reports_successes_out_of_total() {
    let store = FakeRecordStore::new()
        .with_record("rec-2", "d2.example.com", "2001:db8::99")
        .failing_writes_for("d2.example.com");
    let store_handle = FakeRecordStore::sharing_state_with(&store);

    let (engine, _events) = DdnsEngine::new(
        Box::new(ScriptedAddressSource::fixed(addr("2001:db8::1"))),
        Box::new(store),
        test_config(&["d1.example.com", "d2.example.com", "d3.example.com"], 300, 60),
    )
    .expect("engine construction succeeds");

    let outcome = engine.run_cycle().await;
    let report = outcome.report().expect("cycle completed");

    assert_eq!(report.successes(), 2);
    assert_eq!(report.total(), 3);
    assert_eq!(
        report.status(),
        CycleStatus::PartiallySucceeded {
            succeeded: 2,
            total: 3
        }
    );

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "d2.example.com");

    assert_eq!(
        engine.wait_state(&outcome),
        WaitState::Error(Duration::from_secs(60))
    );

    // d2 failing did not stop d3
    assert_eq!(store_handle.records_named("d3.example.com").len(), 1);
    assert_eq!(store_handle.updated_ids(), vec!["rec-2".to_string()]);
}

#[tokio::test]
async fn every_error_survives_aggregation() {
    let store = FakeRecordStore::new()
        .failing_fetch_for("d1.example.com")
        .failing_writes_for("d2.example.com");

    let (engine, _events) = DdnsEngine::new(
        Box::new(ScriptedAddressSource::fixed(addr("2001:db8::1"))),
        Box::new(store),
        test_config(&["d1.example.com", "d2.example.com"], 300, 60),
    )
    .unwrap();

    let outcome = engine.run_cycle().await;
    let report = outcome.report().unwrap();

    assert_eq!(report.status(), CycleStatus::AllFailed);

    let failures = report.failures();
    assert!(matches!(failures[0], ("d1.example.com", Error::Transport(_))));
    assert!(matches!(failures[1], ("d2.example.com", Error::Provider { .. })));
}

#[tokio::test]
async fn lookup_failure_skips_all_domains() {
    let store = FakeRecordStore::new();
    let store_handle = FakeRecordStore::sharing_state_with(&store);

    let (engine, mut events) = DdnsEngine::new(
        Box::new(ScriptedAddressSource::scripted(
            vec![Err(Error::not_found("no IPv6 address found for interface eth0"))],
            addr("2001:db8::1"),
        )),
        Box::new(store),
        test_config(&["a.example.com"], 300, 60),
    )
    .unwrap();

    let outcome = engine.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::LookupFailed(Error::NotFound(_))));
    assert_eq!(
        engine.wait_state(&outcome),
        WaitState::Error(Duration::from_secs(60))
    );
    assert_eq!(store_handle.fetch_call_count(), 0, "No domain may be touched");

    let event = events.recv().await.unwrap();
    assert!(matches!(event, EngineEvent::AddressLookupFailed { .. }));
}

#[tokio::test(start_paused = true)]
async fn end_to_end_creates_both_records_and_sleeps_success_interval() {
    let store = FakeRecordStore::new();
    let store_handle = FakeRecordStore::sharing_state_with(&store);
    let source = ScriptedAddressSource::fixed(addr("2001:db8::1"));
    let resolve_calls = source.call_counter();

    let (engine, mut events) = DdnsEngine::new(
        Box::new(source),
        Box::new(store),
        test_config(&["a.example.com", "b.example.com"], 300, 60),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle =
        tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::Started { domains_count: 2 }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::AddressResolved {
            address: addr("2001:db8::1")
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::RecordCreated {
            domain: "a.example.com".to_string(),
            address: addr("2001:db8::1"),
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::RecordCreated {
            domain: "b.example.com".to_string(),
            address: addr("2001:db8::1"),
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::CycleCompleted {
            status: CycleStatus::AllSucceeded
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::Waiting {
            state: WaitState::Success(Duration::from_secs(300))
        }
    );

    let waiting_since = Instant::now();
    wait_for_event(&mut events, |e| matches!(e, EngineEvent::AddressResolved { .. })).await;
    assert!(waiting_since.elapsed() >= Duration::from_secs(300));

    // Second cycle finds both records in place
    wait_for_event(&mut events, |e| matches!(e, EngineEvent::Waiting { .. })).await;
    assert_eq!(store_handle.create_call_count(), 2);
    assert_eq!(store_handle.update_call_count(), 0);
    assert_eq!(resolve_calls.load(Ordering::SeqCst), 2);

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();

    assert_eq!(
        wait_for_event(&mut events, |e| matches!(e, EngineEvent::Stopped { .. })).await,
        EngineEvent::Stopped {
            reason: "Shutdown signal".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn lookup_failure_retries_after_error_interval() {
    let (engine, mut events) = DdnsEngine::new(
        Box::new(ScriptedAddressSource::scripted(
            vec![Err(Error::lookup("interface eth0 not found"))],
            addr("2001:db8::1"),
        )),
        Box::new(FakeRecordStore::new()),
        test_config(&["a.example.com"], 300, 60),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle =
        tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    wait_for_event(&mut events, |e| matches!(e, EngineEvent::AddressLookupFailed { .. })).await;
    assert_eq!(
        wait_for_event(&mut events, |e| matches!(e, EngineEvent::Waiting { .. })).await,
        EngineEvent::Waiting {
            state: WaitState::Error(Duration::from_secs(60))
        }
    );

    let waiting_since = Instant::now();
    wait_for_event(&mut events, |e| matches!(e, EngineEvent::AddressResolved { .. })).await;
    let waited = waiting_since.elapsed();
    assert!(waited >= Duration::from_secs(60));
    assert!(waited < Duration::from_secs(300));

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn engine_rejects_invalid_config() {
    let result = DdnsEngine::new(
        Box::new(ScriptedAddressSource::fixed(addr("2001:db8::1"))),
        Box::new(FakeRecordStore::new()),
        test_config(&[], 300, 60),
    );

    assert!(matches!(result, Err(Error::Config(_))));
}
