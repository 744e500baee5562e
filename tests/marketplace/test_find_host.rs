// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use fabstir_llm_client::discovery::{
    DiscoveryError, DiscoveryTransport, Host, HostFilter, HostListResponse, TransportResponse,
};
use fabstir_llm_client::selection::{SelectionCriteria, SelectionStrategy};
use fabstir_llm_client::{MarketplaceClient, MarketplaceConfig};

/// Transport that always serves one fixed roster and records reports.
struct StaticRoster {
    hosts: Vec<Host>,
    posts: Mutex<Vec<String>>,
}

impl StaticRoster {
    fn new(hosts: Vec<Host>) -> Arc<Self> {
        Arc::new(Self {
            hosts,
            posts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DiscoveryTransport for StaticRoster {
    async fn get(&self, _url: &str) -> Result<TransportResponse, DiscoveryError> {
        if self.hosts.is_empty() {
            return Err(DiscoveryError::Network("backend down".to_string()));
        }
        let body = serde_json::to_string(&HostListResponse {
            hosts: self.hosts.clone(),
        })?;
        Ok(TransportResponse { status: 200, body })
    }

    async fn post_json(
        &self,
        url: &str,
        _body: serde_json::Value,
    ) -> Result<TransportResponse, DiscoveryError> {
        self.posts.lock().unwrap().push(url.to_string());
        Ok(TransportResponse {
            status: 200,
            body: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(id: &str) -> Host {
        Host {
            id: id.to_string(),
            address: format!("0x{}", id),
            url: format!("wss://{}.example.net", id),
            models: vec!["llama-7b".to_string()],
            price_per_token: Some(0.002),
            latency: Some(40),
            region: None,
            capabilities: Vec::new(),
            reliability: None,
        }
    }

    fn client(transport: Arc<StaticRoster>) -> MarketplaceClient {
        MarketplaceClient::with_transport(
            MarketplaceConfig::new("http://discovery.test"),
            transport,
        )
    }

    #[tokio::test]
    async fn test_recorded_outcomes_steer_composite_selection() {
        let transport = StaticRoster::new(vec![host("flaky"), host("steady")]);
        let client = client(transport);

        for _ in 0..4 {
            client.record_outcome("steady", true).await;
            client.record_outcome("flaky", false).await;
        }

        // Identical price and latency: reliability is the only live axis.
        let chosen = client
            .find_host(
                &HostFilter::default(),
                &SelectionCriteria::for_strategy(SelectionStrategy::Composite),
            )
            .await
            .unwrap();
        assert_eq!(chosen.id, "steady");
    }

    #[tokio::test]
    async fn test_unobserved_host_gets_neutral_not_zero_reliability() {
        let transport = StaticRoster::new(vec![host("poor"), host("newcomer")]);
        let client = client(transport);

        client.record_outcome("poor", false).await;
        client.record_outcome("poor", false).await;

        // The newcomer has no history and must rank on the neutral default,
        // not as fully unreliable.
        let chosen = client
            .find_host(
                &HostFilter::default(),
                &SelectionCriteria::for_strategy(SelectionStrategy::Composite),
            )
            .await
            .unwrap();
        assert_eq!(chosen.id, "newcomer");
    }

    #[tokio::test]
    async fn test_empty_discovery_yields_none() {
        let transport = StaticRoster::new(Vec::new());
        let client = client(transport);

        let chosen = client
            .find_host(&HostFilter::default(), &SelectionCriteria::default())
            .await;
        assert!(chosen.is_none());
    }

    #[tokio::test]
    async fn test_stats_reflect_selections_and_outcomes() {
        let transport = StaticRoster::new(vec![host("a")]);
        let client = client(transport);

        client
            .find_host(&HostFilter::default(), &SelectionCriteria::default())
            .await
            .unwrap();
        client.record_outcome("a", true).await;

        let stats = client.stats().await;
        assert_eq!(stats.total_selections, 1);
        assert_eq!(stats.host_selection_counts.get("a"), Some(&1));
        assert_eq!(stats.success_rate, 1.0);
    }

    #[tokio::test]
    async fn test_report_issue_reaches_discovery_endpoint() {
        let transport = StaticRoster::new(vec![host("a")]);
        let client = client(transport.clone());

        client.report_issue("a", "stalled mid-stream").await;

        let posts = transport.posts.lock().unwrap();
        assert_eq!(posts.as_slice(), ["http://discovery.test/api/hosts/a/report"]);
    }
}
