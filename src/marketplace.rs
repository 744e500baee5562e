// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::discovery::{
    DiscoveryClient, DiscoveryConfig, DiscoveryError, DiscoveryTransport, Host, HostDetails,
    HostFilter,
};
use crate::selection::{HostSelector, SelectionCriteria, SelectionStats, WeightPreset, Weights};

/// Configuration for the composed marketplace client. Explicit `weights`
/// take precedence over the `preset`.
#[derive(Debug, Clone, Default)]
pub struct MarketplaceConfig {
    pub discovery: DiscoveryConfig,
    pub preset: WeightPreset,
    pub weights: Option<Weights>,
}

impl MarketplaceConfig {
    pub fn new(discovery_url: impl Into<String>) -> Self {
        Self {
            discovery: DiscoveryConfig::new(discovery_url),
            ..Default::default()
        }
    }

    fn selector(&self) -> HostSelector {
        match self.weights {
            Some(weights) => HostSelector::with_weights(weights),
            None => HostSelector::with_preset(self.preset),
        }
    }
}

/// Thin composition of the discovery client and the host selector: discover,
/// merge observed reliability back onto the roster, select, and route
/// outcome reports into the selector. Adds no policy of its own.
///
/// Each instance owns its own cache and selection statistics; construct one
/// per isolation boundary.
pub struct MarketplaceClient {
    discovery: DiscoveryClient,
    selector: Mutex<HostSelector>,
}

impl MarketplaceClient {
    pub fn new(config: MarketplaceConfig) -> Result<Self, DiscoveryError> {
        let selector = config.selector();
        Ok(Self {
            discovery: DiscoveryClient::new(config.discovery)?,
            selector: Mutex::new(selector),
        })
    }

    pub fn with_transport(config: MarketplaceConfig, transport: Arc<dyn DiscoveryTransport>) -> Self {
        let selector = config.selector();
        Self {
            discovery: DiscoveryClient::with_transport(config.discovery, transport),
            selector: Mutex::new(selector),
        }
    }

    pub fn discovery(&self) -> &DiscoveryClient {
        &self.discovery
    }

    /// Discover, fold recorded reliability into the roster, and select.
    ///
    /// Reliability scores are merged for observed hosts only; hosts without
    /// a recorded outcome keep `None` so the ranking applies its neutral
    /// default instead of treating them as fully unreliable.
    pub async fn find_host(
        &self,
        filter: &HostFilter,
        criteria: &SelectionCriteria,
    ) -> Option<Host> {
        let mut hosts = self.discovery.discover_hosts(filter).await;
        if hosts.is_empty() {
            return None;
        }

        let mut selector = self.selector.lock().await;
        let scores = selector.get_selection_stats().host_reliability_scores;
        for host in &mut hosts {
            if let Some(score) = scores.get(&host.id) {
                host.reliability = Some(*score);
            }
        }

        let chosen = selector.select_optimal_host(&hosts, criteria);
        if let Some(host) = &chosen {
            debug!("Marketplace selected host {}", host.id);
        }
        chosen
    }

    pub async fn host_details(&self, host_id: &str) -> Result<HostDetails, DiscoveryError> {
        self.discovery.get_host_details(host_id).await
    }

    /// Report the observed outcome of a session with a host. Feeds the
    /// reliability axis of future composite rankings.
    pub async fn record_outcome(&self, host_id: &str, success: bool) {
        self.selector.lock().await.record_success(host_id, success);
    }

    /// Forward an issue report to the discovery service. Best-effort.
    pub async fn report_issue(&self, host_id: &str, issue: &str) {
        self.discovery.report_host(host_id, issue).await;
    }

    pub async fn stats(&self) -> SelectionStats {
        self.selector.lock().await.get_selection_stats()
    }
}
