// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {0}ms")]
    Timeout(u64),
    #[error("Discovery endpoint returned HTTP {status}")]
    BadStatus { status: u16 },
    #[error("Failed to decode discovery response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Host not found: {0}")]
    HostNotFound(String),
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest reports its own client-level timeout as an error kind
            // rather than a status; the retry loop treats both the same way.
            DiscoveryError::Timeout(0)
        } else {
            DiscoveryError::Network(err.to_string())
        }
    }
}

impl DiscoveryError {
    /// Transient failures are worth retrying; decode errors and HTTP
    /// statuses are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, DiscoveryError::Network(_) | DiscoveryError::Timeout(_))
    }
}
