// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Client-side discovery and selection engine for the Fabstir LLM
//! marketplace.
//!
//! Two components, composed by [`MarketplaceClient`]:
//!
//! - [`discovery`] fetches the host roster and per-host details from a
//!   discovery service, behind a time-bounded cache with retry/backoff and
//!   graceful degradation to the last-known-good roster.
//! - [`selection`] picks one host from a roster under hard constraints and a
//!   strategy (price, latency, capability match, weighted composite,
//!   round-robin), tracking outcomes to weight future rankings.
//!
//! The selector performs no I/O; everything network-facing lives in the
//! discovery client and suspends at its awaits.

pub mod discovery;
pub mod marketplace;
pub mod selection;

pub use discovery::{
    DiscoveryClient, DiscoveryConfig, DiscoveryError, DiscoveryTransport, Host, HostDetails,
    HostFilter, HostListResponse, HttpTransport, TransportResponse,
};
pub use marketplace::{MarketplaceClient, MarketplaceConfig};
pub use selection::{
    rank_hosts, select_top_hosts, HostRequirements, HostScore, HostSelector, ScoreBreakdown,
    SelectionCriteria, SelectionStats, SelectionStrategy, WeightPreset, Weights,
};
