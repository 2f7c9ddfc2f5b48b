//! Test doubles and common utilities for contract tests
//!
//! These fakes stand in for the provider API and the OS interface table,
//! and count every call so tests can assert on side effects.

#![allow(dead_code)]

use ddns_core::config::{CloudflareConfig, DdnsConfig, IntervalConfig, NetworkConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressSource, DnsRecord, RecordStore};
use ddns_core::EngineEvent;
use std::collections::{HashSet, VecDeque};
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const ZONE: &str = "023e105f4ecef8ad9ca31a8372d0c353";

pub fn addr(s: &str) -> Ipv6Addr {
    s.parse().expect("valid IPv6 literal")
}

/// An in-memory record store that tracks calls
pub struct FakeRecordStore {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    fetch_call_count: Arc<AtomicUsize>,
    create_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    /// Record ids passed to update(), in call order
    updated_ids: Arc<Mutex<Vec<String>>>,
    failing_fetches: Arc<Mutex<HashSet<String>>>,
    failing_writes: Arc<Mutex<HashSet<String>>>,
    next_id: Arc<AtomicUsize>,
}

impl FakeRecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
            create_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updated_ids: Arc::new(Mutex::new(Vec::new())),
            failing_fetches: Arc::new(Mutex::new(HashSet::new())),
            failing_writes: Arc::new(Mutex::new(HashSet::new())),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Create a new FakeRecordStore that shares records and counters with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            fetch_call_count: Arc::clone(&other.fetch_call_count),
            create_call_count: Arc::clone(&other.create_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            updated_ids: Arc::clone(&other.updated_ids),
            failing_fetches: Arc::clone(&other.failing_fetches),
            failing_writes: Arc::clone(&other.failing_writes),
            next_id: Arc::clone(&other.next_id),
        }
    }

    /// Seed an existing AAAA record
    pub fn with_record(self, id: &str, name: &str, content: &str) -> Self {
        self.records.lock().unwrap().push(DnsRecord {
            id: Some(id.to_string()),
            record_type: "AAAA".to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: 1,
        });
        self
    }

    /// Make fetch() fail for `name`
    pub fn failing_fetch_for(self, name: &str) -> Self {
        self.failing_fetches.lock().unwrap().insert(name.to_string());
        self
    }

    /// Make create() and update() fail for `name`
    pub fn failing_writes_for(self, name: &str) -> Self {
        self.failing_writes.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn write_call_count(&self) -> usize {
        self.create_call_count() + self.update_call_count()
    }

    pub fn updated_ids(&self) -> Vec<String> {
        self.updated_ids.lock().unwrap().clone()
    }

    /// All stored records named `name`
    pub fn records_named(&self, name: &str) -> Vec<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl RecordStore for FakeRecordStore {
    async fn fetch(&self, _zone: &str, name: &str) -> Result<Option<DnsRecord>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);

        if self.failing_fetches.lock().unwrap().contains(name) {
            return Err(Error::transport("connection reset by peer"));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name && r.record_type == "AAAA")
            .cloned())
    }

    async fn create(&self, _zone: &str, record: &DnsRecord) -> Result<()> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);

        if self.failing_writes.lock().unwrap().contains(&record.name) {
            return Err(Error::provider("fake", "Record quota exceeded"));
        }

        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut stored = record.clone();
        stored.id = Some(id);
        self.records.lock().unwrap().push(stored);
        Ok(())
    }

    async fn update(&self, _zone: &str, record_id: &str, record: &DnsRecord) -> Result<()> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updated_ids.lock().unwrap().push(record_id.to_string());

        if self.failing_writes.lock().unwrap().contains(&record.name) {
            return Err(Error::provider("fake", "Record is locked"));
        }

        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(record_id))
            .ok_or_else(|| Error::provider("fake", "Record does not exist"))?;

        existing.record_type = record.record_type.clone();
        existing.name = record.name.clone();
        existing.content = record.content.clone();
        existing.ttl = record.ttl;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// An address source that replays scripted results, then a fixed address
pub struct ScriptedAddressSource {
    script: Mutex<VecDeque<Result<Ipv6Addr>>>,
    fallback: Ipv6Addr,
    resolve_call_count: Arc<AtomicUsize>,
}

impl ScriptedAddressSource {
    /// Always resolve to `address`
    pub fn fixed(address: Ipv6Addr) -> Self {
        Self::scripted(Vec::new(), address)
    }

    /// Return `script` in order, then `fallback` forever
    pub fn scripted(script: Vec<Result<Ipv6Addr>>, fallback: Ipv6Addr) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.resolve_call_count)
    }
}

#[async_trait::async_trait]
impl AddressSource for ScriptedAddressSource {
    async fn resolve(&self, _interface: &str) -> Result<Ipv6Addr> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.fallback))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Helper to create a valid DdnsConfig for testing
pub fn test_config(domains: &[&str], success: u64, error: u64) -> DdnsConfig {
    DdnsConfig {
        cloudflare: CloudflareConfig {
            api_token: "test-token".to_string(),
            zone_id: ZONE.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
            api_base: ddns_core::config::DEFAULT_API_BASE.to_string(),
        },
        network: NetworkConfig {
            interface: "eth0".to_string(),
        },
        interval: IntervalConfig { success, error },
    }
}

/// Receive events until one matches `pred`
pub async fn wait_for_event<F>(rx: &mut mpsc::Receiver<EngineEvent>, pred: F) -> EngineEvent
where
    F: Fn(&EngineEvent) -> bool,
{
    loop {
        let event = rx.recv().await.expect("engine event channel closed");
        if pred(&event) {
            return event;
        }
    }
}
