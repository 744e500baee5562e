// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::error::DiscoveryError;

/// Raw response handed back by a transport. Statuses are carried as plain
/// numbers so the per-endpoint policies in the client decide what a non-OK
/// response means (fallback vs. raise).
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP boundary of the discovery client. Tests substitute scripted
/// implementations to drive the retry and fallback paths.
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, DiscoveryError>;

    async fn post_json(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<TransportResponse, DiscoveryError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// The timeout here is a client-level backstop; each attempt is
    /// additionally cancelled by the retry loop's own deadline.
    pub fn new(request_timeout: Duration) -> Result<Self, DiscoveryError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DiscoveryTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, DiscoveryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }

    async fn post_json(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<TransportResponse, DiscoveryError> {
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}
