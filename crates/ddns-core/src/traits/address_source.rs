// # Address Source Trait
//
// Defines the interface for discovering the public IPv6 address bound to a
// network interface.
//
// ## Implementations
//
// - OS interface enumeration: `ddns-ip-interface` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     let address = source.resolve("eth0").await?;
//     println!("eth0 has {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::{IpAddr, Ipv6Addr};

/// Trait for address source implementations
///
/// # Errors
///
/// - [`Error::Lookup`](crate::Error::Lookup): the interface does not exist or
///   enumeration failed at the OS level
/// - [`Error::NotFound`](crate::Error::NotFound): enumeration succeeded but no
///   address passes [`select_address`]
///
/// # Trust Level: Semi-Trusted
///
/// Address sources may perform platform-specific I/O, but must not
/// update DNS, retry, or decide when a cycle runs. They are **observers**,
/// not **decision-makers**.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Resolve the address currently bound to `interface`
    ///
    /// Called once per engine cycle. A fresh value is produced on every
    /// call; nothing is cached between cycles.
    async fn resolve(&self, interface: &str) -> Result<Ipv6Addr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Pick the first address that is IPv6 and not link-local
///
/// Addresses are considered in enumeration order and the first match wins;
/// there is no preference between several global or ULA addresses.
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are treated as IPv4.
pub fn select_address<I>(addresses: I) -> Option<Ipv6Addr>
where
    I: IntoIterator<Item = IpAddr>,
{
    addresses.into_iter().find_map(|addr| match addr {
        IpAddr::V6(v6) if is_candidate(&v6) => Some(v6),
        _ => None,
    })
}

fn is_candidate(addr: &Ipv6Addr) -> bool {
    addr.to_ipv4_mapped().is_none() && !addr.is_unicast_link_local()
}
