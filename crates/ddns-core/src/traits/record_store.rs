// # Record Store Trait
//
// Defines the interface to the remote store of DNS records, scoped by zone.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsRecord, RecordStore};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* RecordStore implementation */;
//
//     match store.fetch("zone", "example.com").await? {
//         Some(record) => println!("current: {}", record.content),
//         None => store.create("zone", &DnsRecord::aaaa("example.com", addr)).await?,
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;

/// The only record type this system manages
pub const RECORD_TYPE_AAAA: &str = "AAAA";

/// Provider sentinel meaning "let the provider choose the TTL"
pub const TTL_AUTOMATIC: u32 = 1;

/// A DNS record as exchanged with the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identifier, absent on records not yet created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Record type, always "AAAA" here
    #[serde(rename = "type")]
    pub record_type: String,

    /// The domain name
    pub name: String,

    /// The record value (an IPv6 literal)
    pub content: String,

    /// Time-to-live, [`TTL_AUTOMATIC`] for provider-managed
    pub ttl: u32,
}

impl DnsRecord {
    /// Build the desired AAAA record for `name`
    pub fn aaaa(name: impl Into<String>, address: Ipv6Addr) -> Self {
        Self {
            id: None,
            record_type: RECORD_TYPE_AAAA.to_string(),
            name: name.into(),
            content: address.to_string(),
            ttl: TTL_AUTOMATIC,
        }
    }

    /// Whether the record already points at `address`
    ///
    /// Content is compared as an address when it parses as one, so
    /// differently formatted literals of the same address are equal.
    pub fn points_to(&self, address: Ipv6Addr) -> bool {
        match self.content.parse::<Ipv6Addr>() {
            Ok(current) => current == address,
            Err(_) => self.content == address.to_string(),
        }
    }
}

/// Trait for record store implementations
///
/// # Errors
///
/// All three operations distinguish two failure kinds:
/// - [`Error::Transport`](crate::Error::Transport): network failure or a
///   response that could not be decoded
/// - [`Error::Provider`](crate::Error::Provider): the provider answered but
///   reported failure; the message is the first one it supplied
///
/// # Trust Level: Untrusted
///
/// Record stores execute exactly one API call per operation. They must not
/// retry, back off, cache, or decide whether a write is needed; that is
/// owned by the reconciler.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the AAAA record for `name`
    ///
    /// Returns `Ok(None)` when no record exists. When the zone holds several
    /// matching records only the first is returned; duplicates are neither
    /// detected nor merged.
    async fn fetch(&self, zone: &str, name: &str) -> Result<Option<DnsRecord>, crate::Error>;

    /// Insert a new record
    async fn create(&self, zone: &str, record: &DnsRecord) -> Result<(), crate::Error>;

    /// Replace the fields of the record identified by `record_id`
    async fn update(
        &self,
        zone: &str,
        record_id: &str,
        record: &DnsRecord,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
