//! Record reconciliation
//!
//! Decides, for one domain, whether the record store needs a create, an
//! update, or nothing at all:
//!
//! | existing record          | action                         | outcome     |
//! |--------------------------|--------------------------------|-------------|
//! | present, same address    | none                           | `Unchanged` |
//! | absent                   | `create`                       | `Created`   |
//! | present, other address   | `update` by the existing id    | `Updated`   |
//!
//! The decision uses nothing but the single fetch result, so repeated calls
//! with the same address settle on `Unchanged` after the first write.

use crate::error::{Error, Result};
use crate::traits::{DnsRecord, RecordStore};
use std::net::Ipv6Addr;
use tracing::{debug, info};

/// Successful result of reconciling one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Record already pointed at the address; nothing was written
    Unchanged,

    /// Record did not exist and was created
    Created,

    /// Record existed with different content and was updated
    Updated {
        /// Content the record held before the update
        previous: String,
    },
}

/// Bring the AAAA record for `domain` in line with `address`
///
/// A failure of the fetch, create or update call is returned as-is; no
/// further calls are made after the first failing one.
pub async fn reconcile(
    store: &dyn RecordStore,
    zone: &str,
    domain: &str,
    address: Ipv6Addr,
) -> Result<ReconcileOutcome> {
    debug!("Querying existing record for {}", domain);
    let existing = store.fetch(zone, domain).await?;

    let desired = DnsRecord::aaaa(domain, address);

    match existing {
        Some(current) if current.points_to(address) => {
            info!("Record {} already points to {}, no update needed", domain, address);
            Ok(ReconcileOutcome::Unchanged)
        }
        None => {
            info!("No record for {}, creating it with {}", domain, address);
            store.create(zone, &desired).await?;
            Ok(ReconcileOutcome::Created)
        }
        Some(current) => {
            let record_id = current.id.as_deref().ok_or_else(|| {
                Error::provider(
                    store.provider_name(),
                    format!("existing record for {} has no identifier", domain),
                )
            })?;

            info!("Updating {}: {} -> {}", domain, current.content, address);
            store.update(zone, record_id, &desired).await?;
            Ok(ReconcileOutcome::Updated {
                previous: current.content,
            })
        }
    }
}
