// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::cache::TtlCache;
use super::error::DiscoveryError;
use super::transport::{DiscoveryTransport, HttpTransport, TransportResponse};
use super::types::{Host, HostDetails, HostFilter, HostListResponse};

/// Default roster/detail cache TTL
const DEFAULT_CACHE_TTL_MS: u64 = 60_000;
/// Default number of fetch attempts per request
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default per-attempt timeout
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
/// Base delay for exponential backoff (100ms, 200ms, 400ms, ...)
const RETRY_BASE_DELAY_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub discovery_url: String,
    pub cache_ttl: Duration,
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl DiscoveryConfig {
    pub fn new(discovery_url: impl Into<String>) -> Self {
        Self {
            discovery_url: discovery_url.into(),
            ..Default::default()
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            discovery_url: "http://localhost:3000".to_string(),
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

/// Client for the marketplace discovery service.
///
/// Roster reads degrade to the last-known-good response instead of failing:
/// a marketplace UI built on this treats `discover_hosts` as
/// always-succeeding (possibly with stale or empty data), while
/// `get_host_details` fails loudly because stale details for a host the
/// caller is about to transact with would be worse than no answer.
pub struct DiscoveryClient {
    config: DiscoveryConfig,
    transport: Arc<dyn DiscoveryTransport>,
    roster_cache: RwLock<TtlCache<Vec<Host>>>,
    detail_cache: RwLock<TtlCache<HostDetails>>,
}

impl DiscoveryClient {
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let transport = Arc::new(HttpTransport::new(config.request_timeout)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Construct with an injected transport. Tests use this to script
    /// failures and count attempts.
    pub fn with_transport(config: DiscoveryConfig, transport: Arc<dyn DiscoveryTransport>) -> Self {
        Self {
            roster_cache: RwLock::new(TtlCache::new(config.cache_ttl)),
            detail_cache: RwLock::new(TtlCache::new(config.cache_ttl)),
            config,
            transport,
        }
    }

    /// Fetch the current roster, filtered locally.
    ///
    /// The cache stores the unfiltered roster under the filter's canonical
    /// key; the filter is applied on every return path, never baked into the
    /// cached payload. On any fetch failure the last cached roster for the
    /// key is returned (even if expired), or an empty list when nothing was
    /// ever cached. This method does not fail.
    pub async fn discover_hosts(&self, filter: &HostFilter) -> Vec<Host> {
        let key = filter.cache_key();

        if !filter.force_refresh {
            let cached = self.roster_cache.read().await.get_fresh(&key);
            if let Some(roster) = cached {
                debug!("Roster cache hit for key '{}' ({} hosts)", key, roster.len());
                return apply_filter(roster, filter);
            }
        }

        let url = format!("{}/api/hosts", self.config.discovery_url);
        match self.fetch_with_retry(&url).await {
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<HostListResponse>(&response.body) {
                    Ok(parsed) => {
                        let mut cache = self.roster_cache.write().await;
                        cache.insert(key, parsed.hosts.clone());
                        info!("Stored fresh roster of {} hosts", parsed.hosts.len());
                        apply_filter(parsed.hosts, filter)
                    }
                    Err(err) => {
                        warn!("Failed to decode roster response: {}", err);
                        self.stale_roster_or_empty(&key, filter).await
                    }
                }
            }
            Ok(response) => {
                warn!(
                    "Discovery returned HTTP {}, falling back to cached roster",
                    response.status
                );
                self.stale_roster_or_empty(&key, filter).await
            }
            Err(err) => {
                warn!("Discovery fetch failed: {}", err);
                self.stale_roster_or_empty(&key, filter).await
            }
        }
    }

    /// Fetch the detail record for one host.
    ///
    /// Unlike the roster call there is no safe empty fallback here, so
    /// non-OK responses and exhausted retries surface as errors.
    pub async fn get_host_details(&self, host_id: &str) -> Result<HostDetails, DiscoveryError> {
        let cached = self.detail_cache.read().await.get_fresh(host_id);
        if let Some(details) = cached {
            debug!("Detail cache hit for host {}", host_id);
            return Ok(details);
        }

        let url = format!("{}/api/hosts/{}", self.config.discovery_url, host_id);
        let response = self.fetch_with_retry(&url).await?;

        if response.status == 404 {
            return Err(DiscoveryError::HostNotFound(host_id.to_string()));
        }
        if !response.is_success() {
            return Err(DiscoveryError::BadStatus {
                status: response.status,
            });
        }

        let details: HostDetails = serde_json::from_str(&response.body)?;
        self.detail_cache
            .write()
            .await
            .insert(host_id.to_string(), details.clone());
        Ok(details)
    }

    /// Probe a host's liveness over HTTP and return the observed round-trip
    /// time in milliseconds, or `None` on any failure. Peer-transport
    /// schemes are rewritten to their HTTP equivalents first. Never errors.
    pub async fn ping_host(&self, host_url: &str) -> Option<u64> {
        let started = Instant::now();
        let ping_url = http_probe_url(host_url)?;

        let attempt = tokio::time::timeout(
            self.config.request_timeout,
            self.transport.get(&ping_url),
        )
        .await;

        match attempt {
            Ok(Ok(response)) if response.is_success() => {
                let elapsed = started.elapsed().as_millis() as u64;
                debug!("Ping {} -> {}ms", ping_url, elapsed);
                Some(elapsed)
            }
            Ok(Ok(response)) => {
                debug!("Ping {} returned HTTP {}", ping_url, response.status);
                None
            }
            Ok(Err(err)) => {
                debug!("Ping {} failed: {}", ping_url, err);
                None
            }
            Err(_) => {
                debug!(
                    "Ping {} timed out after {}ms",
                    ping_url,
                    self.config.request_timeout.as_millis()
                );
                None
            }
        }
    }

    /// Ping every host concurrently and write measured latencies back onto
    /// the roster. Hosts that do not answer keep their previous value.
    pub async fn probe_hosts(&self, hosts: &mut [Host]) {
        let urls: Vec<String> = hosts.iter().map(|h| h.url.clone()).collect();
        let measured = futures::future::join_all(urls.iter().map(|u| self.ping_host(u))).await;

        for (host, latency) in hosts.iter_mut().zip(measured) {
            if let Some(ms) = latency {
                host.latency = Some(ms);
            }
        }
    }

    /// File an issue report against a host. Fire-and-forget: failures are
    /// logged and absorbed.
    pub async fn report_host(&self, host_id: &str, issue: &str) {
        let url = format!("{}/api/hosts/{}/report", self.config.discovery_url, host_id);
        let body = serde_json::json!({ "issue": issue });

        match self.transport.post_json(&url, body).await {
            Ok(response) if response.is_success() => {
                debug!("Filed issue report for host {}", host_id);
            }
            Ok(response) => {
                warn!(
                    "Issue report for host {} returned HTTP {}",
                    host_id, response.status
                );
            }
            Err(err) => {
                warn!("Failed to report host {}: {}", host_id, err);
            }
        }
    }

    /// Drop all cached rosters and detail records.
    pub async fn clear_cache(&self) {
        self.roster_cache.write().await.clear();
        self.detail_cache.write().await.clear();
    }

    /// GET with per-attempt cancellation and exponential backoff.
    ///
    /// Transient failures (network errors, timeouts) retry up to
    /// `max_retries` attempts with `2^attempt * 100ms` waits between them
    /// and none after the last. Non-OK responses are returned to the caller
    /// un-retried; the per-endpoint policies decide what they mean.
    async fn fetch_with_retry(&self, url: &str) -> Result<TransportResponse, DiscoveryError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            let outcome =
                tokio::time::timeout(self.config.request_timeout, self.transport.get(url)).await;

            let err = match outcome {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) if err.is_transient() => err,
                Ok(Err(err)) => return Err(err),
                Err(_) => {
                    DiscoveryError::Timeout(self.config.request_timeout.as_millis() as u64)
                }
            };

            warn!(
                "Fetch attempt {}/{} for {} failed: {}",
                attempt + 1,
                self.config.max_retries,
                url,
                err
            );
            last_error = Some(err);

            if attempt + 1 < self.config.max_retries {
                let delay_ms = RETRY_BASE_DELAY_MS * 2u64.pow(attempt);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| DiscoveryError::Network("no fetch attempts made".to_string())))
    }

    async fn stale_roster_or_empty(&self, key: &str, filter: &HostFilter) -> Vec<Host> {
        match self.roster_cache.read().await.get_stale(key) {
            Some(roster) => {
                info!(
                    "Serving stale roster of {} hosts for key '{}'",
                    roster.len(),
                    key
                );
                apply_filter(roster, filter)
            }
            None => Vec::new(),
        }
    }
}

fn apply_filter(hosts: Vec<Host>, filter: &HostFilter) -> Vec<Host> {
    hosts
        .into_iter()
        .filter(|h| h.matches_filter(filter))
        .collect()
}

/// Rewrite a host endpoint to something an HTTP probe can reach
/// (`wss://` -> `https://`, `ws://` -> `http://`) and append the ping path.
fn http_probe_url(host_url: &str) -> Option<String> {
    let mut url = Url::parse(host_url).ok()?;
    let scheme = match url.scheme() {
        "wss" => "https",
        "ws" => "http",
        other => other,
    }
    .to_string();
    url.set_scheme(&scheme).ok()?;
    let base = url.to_string();
    Some(format!("{}/ping", base.trim_end_matches('/')))
}
