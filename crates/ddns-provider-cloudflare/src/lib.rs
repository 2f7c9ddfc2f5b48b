// # Cloudflare Record Store
//
// This crate provides the Cloudflare implementation of `RecordStore` for the
// DDNS system.
//
// - ✅ One HTTP request per operation (fetch, create, update)
// - ✅ Bearer-token authentication; token never logged
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Provider-reported failures and transport failures kept apart
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry or backoff (the engine waits for the error interval instead)
// - ❌ NO caching between calls
//
// ## Response Envelope
//
// Every Cloudflare v4 endpoint answers with
//
// ```json
// { "success": false, "errors": [{ "code": 9109, "message": "..." }], "result": ... }
// ```
//
// `success` decides the outcome regardless of the HTTP status. A body that
// is not such an envelope is a transport error.
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=AAAA&name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::{CloudflareConfig, DEFAULT_API_BASE};
use ddns_core::traits::{DnsRecord, RecordStore};
use ddns_core::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "cloudflare";

/// Message used when the API reports failure without any detail
const UNKNOWN_API_ERROR: &str = "unknown cloudflare API error";

/// Environment variable that switches on dry-run mode (`DDNS_MODE=dry-run`)
pub const MODE_ENV_VAR: &str = "DDNS_MODE";

/// Cloudflare API response envelope
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Option<Vec<ApiMessage>>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
}

/// Cloudflare record store client
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the client will:
/// - Perform all GET requests (record lookup)
/// - Log the intended create/update payload
/// - **NOT** actually modify DNS records
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareClient {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a client against the public Cloudflare API
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        Self::with_api_base(api_token, DEFAULT_API_BASE, dry_run)
    }

    /// Create a client against a custom API base URL
    pub fn with_api_base(
        api_token: impl Into<String>,
        api_base: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        if dry_run {
            tracing::warn!("Cloudflare client running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    /// Create a client from the `cloudflare` configuration section
    pub fn from_config(config: &CloudflareConfig, dry_run: bool) -> Result<Self> {
        Self::with_api_base(config.api_token.clone(), config.api_base.clone(), dry_run)
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self, zone: &str) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, zone)
    }

    /// Send one request and unwrap the response envelope
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::transport(format!(
                "{}: unreadable response body: {}",
                describe_status(status),
                e
            ))
        })?;

        if !envelope.success {
            return Err(api_error(envelope.errors.as_deref().unwrap_or_default()));
        }

        Ok(envelope.result)
    }
}

/// Build the error for an envelope with `success: false`
///
/// Only the first entry is consulted; a missing or blank message falls back
/// to a generic one.
fn api_error(errors: &[ApiMessage]) -> Error {
    let message = errors
        .first()
        .and_then(|e| e.message.as_deref())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(UNKNOWN_API_ERROR);
    Error::provider(PROVIDER_NAME, message)
}

/// Describe an HTTP status for transport error messages
fn describe_status(status: StatusCode) -> String {
    match status.as_u16() {
        200..=299 => format!("Unexpected response. Status: {}", status),
        401 | 403 => format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("Zone or record not found. Status: {}", status),
        409 => format!(
            "Conflict: Record is being updated by another process. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Status: {}", status),
        500..=599 => format!("Cloudflare server error (transient). Status: {}", status),
        _ => format!("Request failed. Status: {}", status),
    }
}

#[async_trait]
impl RecordStore for CloudflareClient {
    async fn fetch(&self, zone: &str, name: &str) -> Result<Option<DnsRecord>> {
        tracing::debug!("Querying existing AAAA record for {}", name);

        let request = self
            .client
            .get(self.records_url(zone))
            .query(&[("type", "AAAA"), ("name", name)]);

        let records = self
            .execute::<Vec<DnsRecord>>(request)
            .await?
            .unwrap_or_default();

        match records.into_iter().next() {
            Some(record) => {
                tracing::debug!(
                    "Found existing record: type={}, name={}, content={}, ttl={}",
                    record.record_type,
                    record.name,
                    record.content,
                    record.ttl
                );
                Ok(Some(record))
            }
            None => {
                tracing::debug!("No existing AAAA record for {}", name);
                Ok(None)
            }
        }
    }

    async fn create(&self, zone: &str, record: &DnsRecord) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would POST {} with payload: {}",
                self.records_url(zone),
                serde_json::to_string(record).unwrap_or_default()
            );
            return Ok(());
        }

        tracing::info!("Creating record {} -> {}", record.name, record.content);

        let request = self.client.post(self.records_url(zone)).json(record);
        self.execute::<serde_json::Value>(request).await?;

        tracing::info!("Created record {}", record.name);
        Ok(())
    }

    async fn update(&self, zone: &str, record_id: &str, record: &DnsRecord) -> Result<()> {
        let url = format!("{}/{}", self.records_url(zone), record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would PUT {} with payload: {}",
                url,
                serde_json::to_string(record).unwrap_or_default()
            );
            return Ok(());
        }

        tracing::info!("Updating record {} -> {}", record.name, record.content);

        let request = self.client.put(url).json(record);
        self.execute::<serde_json::Value>(request).await?;

        tracing::info!("Updated record {}", record.name);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Whether the environment asks for dry-run mode (`DDNS_MODE=dry-run`)
pub fn dry_run_requested() -> bool {
    std::env::var(MODE_ENV_VAR)
        .map(|mode| mode.eq_ignore_ascii_case("dry-run"))
        .unwrap_or(false)
}
