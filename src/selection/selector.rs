use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::criteria::{
    HostRequirements, SelectionCriteria, SelectionStrategy, WeightPreset, Weights,
};
use super::scoring::rank_hosts;
use crate::discovery::types::Host;

/// A latency-strategy candidate within this many milliseconds of the current
/// best may still win on region affinity. Tunable policy parameter.
pub const LATENCY_TIEBREAK_MS: u64 = 10;

#[derive(Debug, Clone, Copy, Default)]
struct SuccessRecord {
    success: u64,
    total: u64,
}

/// Snapshot of the selector's bookkeeping. `host_reliability_scores` only
/// carries hosts with at least one recorded outcome; absent hosts read as
/// zero on the caller side.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionStats {
    pub total_selections: u64,
    pub success_rate: f64,
    pub host_selection_counts: HashMap<String, u64>,
    pub host_reliability_scores: HashMap<String, f64>,
}

/// Chooses one host from a candidate list under hard constraints and a
/// selection strategy, and tracks selection frequency and observed outcomes
/// to inform future composite ranking.
///
/// All state is owned by the instance: construct one selector per isolation
/// boundary (per marketplace client, per test). Nothing is persisted and
/// nothing is shared; a fresh selector is the only reset.
pub struct HostSelector {
    weights: Weights,
    selection_history: HashMap<String, u64>,
    success_history: HashMap<String, SuccessRecord>,
    total_selections: u64,
    round_robin_index: usize,
    last_fingerprint: Option<String>,
}

impl HostSelector {
    pub fn new() -> Self {
        Self::with_weights(Weights::balanced())
    }

    pub fn with_weights(weights: Weights) -> Self {
        Self {
            weights,
            selection_history: HashMap::new(),
            success_history: HashMap::new(),
            total_selections: 0,
            round_robin_index: 0,
            last_fingerprint: None,
        }
    }

    pub fn with_preset(preset: WeightPreset) -> Self {
        Self::with_weights(preset.weights())
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Apply the hard constraints, then pick per the strategy.
    ///
    /// An empty post-filter candidate set is a normal outcome, not an error:
    /// `None` means "no eligible host". A successful pick is counted in the
    /// selection history before it is returned.
    pub fn select_optimal_host(
        &mut self,
        hosts: &[Host],
        criteria: &SelectionCriteria,
    ) -> Option<Host> {
        let candidates = hard_filter(hosts, criteria);
        if candidates.is_empty() {
            debug!("No hosts satisfy the hard constraints");
            return None;
        }

        let chosen = match criteria.strategy {
            SelectionStrategy::Price => cheapest(&candidates),
            SelectionStrategy::Latency => {
                lowest_latency(&candidates, criteria.preferred_region.as_deref())
            }
            SelectionStrategy::Capability => {
                best_capability_match(&candidates, &criteria.preferred_capabilities)
            }
            SelectionStrategy::Composite => rank_hosts(&candidates, &self.weights)
                .into_iter()
                .next()
                .map(|scored| scored.host),
            SelectionStrategy::RoundRobin => self.load_balance(&candidates),
            SelectionStrategy::FirstAvailable => candidates.first().cloned(),
        };

        if let Some(host) = &chosen {
            *self.selection_history.entry(host.id.clone()).or_insert(0) += 1;
            self.total_selections += 1;
            debug!("Selected host {} via {:?}", host.id, criteria.strategy);
        }
        chosen
    }

    /// General-purpose filter usable outside `select_optimal_host`:
    /// any-of `models`, all-of `capabilities`, price/latency bounds (a host
    /// must have a known latency within bound), exact `region`.
    pub fn filter_by_requirements(
        &self,
        hosts: &[Host],
        requirements: &HostRequirements,
    ) -> Vec<Host> {
        hosts
            .iter()
            .filter(|host| {
                if !requirements.models.is_empty()
                    && !requirements.models.iter().any(|m| host.serves_model(m))
                {
                    return false;
                }
                if !host.has_capabilities(&requirements.capabilities) {
                    return false;
                }
                if let Some(max_price) = requirements.max_price {
                    if !host.price_per_token.map_or(false, |p| p <= max_price) {
                        return false;
                    }
                }
                if let Some(max_latency) = requirements.max_latency {
                    if !host.latency.map_or(false, |l| l <= max_latency) {
                        return false;
                    }
                }
                if let Some(region) = &requirements.region {
                    if host.region.as_deref() != Some(region.as_str()) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    }

    /// Round-robin over a stable candidate set.
    ///
    /// The rotation is keyed to a fingerprint of the ordered candidate ids;
    /// any change in membership or order resets the cursor, so fairness is
    /// only guaranteed while the set stays put.
    pub fn load_balance(&mut self, hosts: &[Host]) -> Option<Host> {
        if hosts.is_empty() {
            return None;
        }

        let fingerprint = hosts
            .iter()
            .map(|h| h.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        if self.last_fingerprint.as_deref() != Some(fingerprint.as_str()) {
            debug!("Candidate set changed, resetting round-robin cursor");
            self.round_robin_index = 0;
            self.last_fingerprint = Some(fingerprint);
        }

        let host = hosts[self.round_robin_index % hosts.len()].clone();
        self.round_robin_index += 1;
        Some(host)
    }

    /// Record an observed outcome for a host. This is the only way
    /// reliability statistics change.
    pub fn record_success(&mut self, host_id: &str, success: bool) {
        let record = self.success_history.entry(host_id.to_string()).or_default();
        record.total += 1;
        if success {
            record.success += 1;
        }
    }

    pub fn get_selection_stats(&self) -> SelectionStats {
        let total_success: u64 = self.success_history.values().map(|r| r.success).sum();
        let total_outcomes: u64 = self.success_history.values().map(|r| r.total).sum();
        let success_rate = if total_outcomes > 0 {
            total_success as f64 / total_outcomes as f64
        } else {
            0.0
        };

        let host_reliability_scores = self
            .success_history
            .iter()
            .map(|(id, record)| {
                let ratio = if record.total > 0 {
                    record.success as f64 / record.total as f64
                } else {
                    0.0
                };
                (id.clone(), ratio)
            })
            .collect();

        SelectionStats {
            total_selections: self.total_selections,
            success_rate,
            host_selection_counts: self.selection_history.clone(),
            host_reliability_scores,
        }
    }
}

impl Default for HostSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Unknown values compare as worse than any known value. Shared rule for
/// every strategy that minimizes an optional numeric field.
fn better_known(candidate: Option<f64>, incumbent: Option<f64>) -> bool {
    match (candidate, incumbent) {
        (Some(c), Some(i)) => c < i,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn hard_filter(hosts: &[Host], criteria: &SelectionCriteria) -> Vec<Host> {
    hosts
        .iter()
        .filter(|host| {
            if let Some(max_price) = criteria.max_price {
                if !host.price_per_token.map_or(false, |p| p <= max_price) {
                    return false;
                }
            }
            if let Some(max_latency) = criteria.max_latency {
                if !host.latency.map_or(false, |l| l <= max_latency) {
                    return false;
                }
            }
            if let Some(model) = &criteria.required_model {
                if !host.serves_model(model) {
                    return false;
                }
            }
            if !host.has_capabilities(&criteria.required_capabilities) {
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

fn cheapest(hosts: &[Host]) -> Option<Host> {
    let mut best: Option<&Host> = None;
    for host in hosts {
        match best {
            None => best = Some(host),
            Some(current) if better_known(host.price_per_token, current.price_per_token) => {
                best = Some(host)
            }
            _ => {}
        }
    }
    best.cloned()
}

fn lowest_latency(hosts: &[Host], preferred_region: Option<&str>) -> Option<Host> {
    let mut best: Option<&Host> = None;
    for host in hosts {
        let current = match best {
            None => {
                best = Some(host);
                continue;
            }
            Some(current) => current,
        };

        if better_known(
            host.latency.map(|ms| ms as f64),
            current.latency.map(|ms| ms as f64),
        ) {
            best = Some(host);
            continue;
        }

        // Region affinity: a near-tie may go to the host in the preferred
        // region even though it is not strictly faster.
        if let (Some(region), Some(host_latency), Some(best_latency)) =
            (preferred_region, host.latency, current.latency)
        {
            let within_window = host_latency <= best_latency.saturating_add(LATENCY_TIEBREAK_MS);
            let host_in_region = host.region.as_deref() == Some(region);
            let best_in_region = current.region.as_deref() == Some(region);
            if within_window && host_in_region && !best_in_region {
                best = Some(host);
            }
        }
    }
    best.cloned()
}

fn best_capability_match(hosts: &[Host], preferred: &[String]) -> Option<Host> {
    if preferred.is_empty() {
        return hosts.first().cloned();
    }

    let mut best: Option<(&Host, usize)> = None;
    for host in hosts {
        let overlap = preferred
            .iter()
            .filter(|c| host.capabilities.contains(c))
            .count();
        match best {
            None => best = Some((host, overlap)),
            Some((_, best_overlap)) if overlap > best_overlap => best = Some((host, overlap)),
            _ => {}
        }
    }
    best.map(|(host, _)| host.clone())
}
