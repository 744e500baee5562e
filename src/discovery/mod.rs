// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cache;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use cache::{CacheEntry, TtlCache};
pub use client::{DiscoveryClient, DiscoveryConfig};
pub use error::DiscoveryError;
pub use transport::{DiscoveryTransport, HttpTransport, TransportResponse};
pub use types::{Host, HostDetails, HostFilter, HostListResponse};
