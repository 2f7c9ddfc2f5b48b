// # ddns-core
//
// Core library for the IPv6 dynamic-DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping AAAA records in
// sync with the address bound to a network interface:
// - **AddressSource**: Trait for discovering the interface's IPv6 address
// - **RecordStore**: Trait for reading and writing records at the provider
// - **reconcile**: Create / update / skip decision for one domain
// - **DdnsEngine**: Polling loop with separate success and error intervals
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from I/O adapters
// 2. **Injected Collaborators**: The engine only sees trait objects
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: Re-running a cycle with an unchanged address writes nothing

pub mod config;
pub mod engine;
pub mod error;
pub mod reconcile;
pub mod traits;

// Re-export core types for convenience
pub use config::DdnsConfig;
pub use engine::{CycleOutcome, CycleReport, CycleStatus, DdnsEngine, EngineEvent, WaitState};
pub use error::{Error, Result};
pub use reconcile::{ReconcileOutcome, reconcile};
pub use traits::{AddressSource, DnsRecord, RecordStore};
