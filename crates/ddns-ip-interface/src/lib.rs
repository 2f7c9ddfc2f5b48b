// # Interface Address Source
//
// This crate provides an `AddressSource` that reads the addresses bound to a
// network interface from the operating system.
//
// ## Selection
//
// All addresses of the named interface are enumerated with `getifaddrs(3)`
// through `nix`, then `ddns_core::traits::select_address` picks the first
// IPv6 address that is not link-local.
//
// ## Errors
//
// - `Error::Lookup`: the interface does not exist or enumeration failed
// - `Error::NotFound`: the interface exists but has no qualifying address
//
// ## Platform Support
//
// Enumeration is implemented for Unix targets. Elsewhere every lookup fails
// with `Error::Lookup`.

use async_trait::async_trait;
use ddns_core::traits::{AddressSource, select_address};
use ddns_core::{Error, Result};
use std::net::{IpAddr, Ipv6Addr};

/// Lists every address bound to an interface
pub type Enumerator = fn(&str) -> Result<Vec<IpAddr>>;

/// Address source backed by the OS interface table
#[derive(Debug, Clone, Copy)]
pub struct InterfaceAddressSource {
    enumerate: Enumerator,
}

impl InterfaceAddressSource {
    pub fn new() -> Self {
        Self::with_enumerator(interface_addresses)
    }

    /// Use a custom enumeration function instead of the OS table
    pub fn with_enumerator(enumerate: Enumerator) -> Self {
        Self { enumerate }
    }
}

impl Default for InterfaceAddressSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AddressSource for InterfaceAddressSource {
    async fn resolve(&self, interface: &str) -> Result<Ipv6Addr> {
        let name = interface.to_string();
        let enumerate = self.enumerate;

        // getifaddrs is a blocking syscall
        let addresses = tokio::task::spawn_blocking(move || enumerate(&name))
            .await
            .map_err(|e| Error::lookup(format!("address enumeration task failed: {}", e)))??;

        tracing::debug!("Interface {} has {} address(es)", interface, addresses.len());

        select_address(addresses).ok_or_else(|| {
            Error::not_found(format!("no IPv6 address found for interface {}", interface))
        })
    }

    fn source_name(&self) -> &'static str {
        "interface"
    }
}

pub use os::interface_addresses;

#[cfg(unix)]
mod os {
    use ddns_core::{Error, Result};
    use nix::ifaddrs::getifaddrs;
    use nix::net::if_::if_nametoindex;
    use std::net::IpAddr;

    /// Every IPv4 and IPv6 address bound to `interface`, in kernel order
    pub fn interface_addresses(interface: &str) -> Result<Vec<IpAddr>> {
        if_nametoindex(interface)
            .map_err(|e| Error::lookup(format!("error getting interface {}: {}", interface, e)))?;

        let entries =
            getifaddrs().map_err(|e| Error::lookup(format!("error getting addresses: {}", e)))?;

        let addresses = entries
            .filter(|entry| entry.interface_name == interface)
            .filter_map(|entry| entry.address)
            .filter_map(|addr| {
                if let Some(v6) = addr.as_sockaddr_in6() {
                    Some(IpAddr::V6(v6.ip()))
                } else {
                    addr.as_sockaddr_in().map(|v4| IpAddr::V4(v4.ip()))
                }
            })
            .collect();

        Ok(addresses)
    }
}

#[cfg(not(unix))]
mod os {
    use ddns_core::{Error, Result};
    use std::net::IpAddr;

    pub fn interface_addresses(_interface: &str) -> Result<Vec<IpAddr>> {
        Err(Error::lookup(
            "interface enumeration is only supported on Unix",
        ))
    }
}
