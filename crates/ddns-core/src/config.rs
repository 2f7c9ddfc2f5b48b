//! Configuration types for the DDNS system
//!
//! The configuration is a YAML file loaded once at startup:
//!
//! ```yaml
//! cloudflare:
//!   api_token: "..."
//!   zone_id: "..."
//!   domains:
//!     - a.example.com
//!     - b.example.com
//! network:
//!   interface: eth0
//! interval:
//!   success: 300
//!   error: 60
//! ```
//!
//! After [`DdnsConfig::from_file`] returns, the configuration is an immutable
//! snapshot; there is no reload.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default Cloudflare API v4 base URL
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// DNS provider settings and managed domains
    pub cloudflare: CloudflareConfig,

    /// Where to read the address from
    pub network: NetworkConfig,

    /// Wait intervals between cycles
    pub interval: IntervalConfig,
}

impl DdnsConfig {
    /// Read, parse and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("error reading config file {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
    }

    /// Parse and validate a YAML document
    ///
    /// Domains are stored without a trailing root dot.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(raw)
            .map_err(|e| Error::config(format!("error parsing config file: {}", e)))?;
        for domain in &mut config.cloudflare.domains {
            if let Some(stripped) = domain.strip_suffix('.') {
                *domain = stripped.to_string();
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.cloudflare.validate()?;
        self.network.validate()?;
        self.interval.validate()?;
        Ok(())
    }
}

/// Cloudflare provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CloudflareConfig {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zone holding the managed records
    pub zone_id: String,

    /// Records to keep in sync, processed in this order
    pub domains: Vec<String>,

    /// API base URL, overridable for testing
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("domains", &self.domains)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }
        if self.zone_id.trim().is_empty() {
            return Err(Error::config("Cloudflare zone ID cannot be empty"));
        }
        if self.domains.is_empty() {
            return Err(Error::config("No domains configured"));
        }
        for domain in &self.domains {
            validate_domain_name(domain)?;
        }
        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            return Err(Error::config(format!(
                "Cloudflare API base must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            )));
        }
        Ok(())
    }
}

/// Network interface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network interface to read the address from (e.g., "eth0")
    pub interface: String,
}

impl NetworkConfig {
    fn validate(&self) -> Result<()> {
        if self.interface.trim().is_empty() {
            return Err(Error::config("Network interface cannot be empty"));
        }
        Ok(())
    }
}

/// Wait intervals, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Wait after a fully successful cycle
    pub success: u64,

    /// Wait after a cycle with any failure
    pub error: u64,
}

impl IntervalConfig {
    fn validate(&self) -> Result<()> {
        if self.success == 0 {
            return Err(Error::config("Success interval must be > 0"));
        }
        if self.error == 0 {
            return Err(Error::config("Error interval must be > 0"));
        }
        Ok(())
    }

    pub fn success_duration(&self) -> Duration {
        Duration::from_secs(self.success)
    }

    pub fn error_duration(&self) -> Duration {
        Duration::from_secs(self.error)
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Validate that a string is a usable record name
///
/// Only the RFC 1035 length limits are enforced, plus a ban on whitespace.
/// A leading `*` label (wildcard record) and underscore labels such as
/// `_acme-challenge` pass, since the provider accepts them.
pub fn validate_domain_name(domain: &str) -> Result<()> {
    let name = domain.strip_suffix('.').unwrap_or(domain);

    if name.is_empty() {
        return Err(Error::config("Domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if name.len() > 253 {
        return Err(Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            name.len(),
            domain
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if label.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::config(format!(
                "Domain label contains whitespace. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
