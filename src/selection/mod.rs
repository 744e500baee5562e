// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod criteria;
pub mod scoring;
pub mod selector;

pub use criteria::{HostRequirements, SelectionCriteria, SelectionStrategy, WeightPreset, Weights};
pub use scoring::{rank_hosts, select_top_hosts, HostScore, ScoreBreakdown, NEUTRAL_RELIABILITY};
pub use selector::{HostSelector, SelectionStats, LATENCY_TIEBREAK_MS};
