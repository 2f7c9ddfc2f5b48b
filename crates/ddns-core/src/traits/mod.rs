//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces the engine is built against,
//! so real collaborators and test fakes are interchangeable.
//!
//! - [`AddressSource`]: Discover the address bound to an interface
//! - [`RecordStore`]: Read and write AAAA records at the DNS provider

pub mod address_source;
pub mod record_store;

pub use address_source::{AddressSource, select_address};
pub use record_store::{DnsRecord, RecordStore, RECORD_TYPE_AAAA, TTL_AUTOMATIC};
