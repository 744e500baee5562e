use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compute provider advertised by the discovery service.
///
/// Numeric fields that the backend may omit (`price_per_token`, `latency`)
/// are modeled as `Option` and treated as worst-case by every filter and
/// ranking site; they are never coerced to sentinel values in the data
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    /// Chain/account identifier of the operator. Opaque at this layer.
    pub address: String,
    /// Transport endpoint. May carry a peer scheme (`wss://`, `ws://`)
    /// rather than plain HTTP.
    pub url: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_token: Option<f64>,
    /// Last observed round-trip time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Historical success ratio in [0,1]. `None` means unobserved and
    /// defaults to 0.5 (neutral) at ranking time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f64>,
}

impl Host {
    pub fn serves_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    pub fn has_capabilities(&self, required: &[String]) -> bool {
        required.iter().all(|c| self.capabilities.contains(c))
    }

    /// Local filter application for roster queries. Filtering happens after
    /// the cache read so the cache always stores the unfiltered roster.
    pub fn matches_filter(&self, filter: &HostFilter) -> bool {
        if let Some(model) = &filter.model {
            if !self.serves_model(model) {
                return false;
            }
        }
        if let Some(region) = &filter.region {
            if self.region.as_deref() != Some(region.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Detail record for a single host, a superset of [`Host`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostDetails {
    #[serde(flatten)]
    pub host: Host,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_secs: Option<u64>,
    /// Jobs currently queued on the host, if it reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Roster query filter for [`discover_hosts`](super::DiscoveryClient::discover_hosts).
///
/// `force_refresh` bypasses the cache read but not the cache write, so it is
/// deliberately excluded from the cache key: a forced call refreshes the same
/// slot an unforced call with the same content reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing)]
    pub force_refresh: bool,
}

impl HostFilter {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Canonical cache key derived from the filter content. Fields are
    /// emitted in declaration order, so two logically identical filters
    /// always address the same cache slot.
    pub fn cache_key(&self) -> String {
        let mut parts = Vec::new();
        if let Some(model) = &self.model {
            parts.push(format!("model={}", model));
        }
        if let Some(region) = &self.region {
            parts.push(format!("region={}", region));
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join("&")
        }
    }
}

/// Wire shape of the roster endpoint: `{ "hosts": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostListResponse {
    pub hosts: Vec<Host>,
}
