use serde::Serialize;
use tracing::debug;

use super::criteria::Weights;
use crate::discovery::types::Host;

/// Reliability assumed for hosts with no recorded outcomes.
pub const NEUTRAL_RELIABILITY: f64 = 0.5;
/// Axis score when every candidate shares one value and the axis carries no
/// information to discriminate on.
const DEGENERATE_AXIS_SCORE: f64 = 0.5;

/// Normalized per-axis sub-scores, each in [0,1] with higher meaning better.
/// Kept alongside the final score so callers can inspect why a host ranked
/// where it did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub price: f64,
    pub latency: f64,
    pub reliability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostScore {
    pub host: Host,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

pub(crate) fn effective_reliability(host: &Host) -> f64 {
    host.reliability.unwrap_or(NEUTRAL_RELIABILITY)
}

/// Rank hosts by weighted composite score, best first.
///
/// Price and latency are min/max-normalized over the candidates with a
/// *known* value and then inverted (lower is better); hosts with an unknown
/// value score 0.0 on that axis instead of polluting the min/max.
/// Reliability is normalized directly over all candidates with 0.5 standing
/// in for unobserved hosts. A degenerate axis (min == max) contributes 0.5
/// for every candidate. The sort is stable, so ties keep input order.
pub fn rank_hosts(hosts: &[Host], weights: &Weights) -> Vec<HostScore> {
    if hosts.is_empty() {
        return Vec::new();
    }

    let price_range = known_range(hosts.iter().map(|h| h.price_per_token));
    let latency_range = known_range(hosts.iter().map(|h| h.latency.map(|ms| ms as f64)));
    let reliability_range = known_range(hosts.iter().map(|h| Some(effective_reliability(h))));

    let mut ranked: Vec<HostScore> = hosts
        .iter()
        .map(|host| {
            let breakdown = ScoreBreakdown {
                price: inverted_axis_score(host.price_per_token, price_range),
                latency: inverted_axis_score(host.latency.map(|ms| ms as f64), latency_range),
                reliability: direct_axis_score(
                    Some(effective_reliability(host)),
                    reliability_range,
                ),
            };
            let score = weights.price * breakdown.price
                + weights.latency * breakdown.latency
                + weights.reliability * breakdown.reliability;
            HostScore {
                host: host.clone(),
                score,
                breakdown,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    if let Some(top) = ranked.first() {
        debug!(
            "Ranked {} hosts, top {} with score {:.3}",
            ranked.len(),
            top.host.id,
            top.score
        );
    }
    ranked
}

/// The `n` best-ranked hosts.
pub fn select_top_hosts(hosts: &[Host], n: usize, weights: &Weights) -> Vec<HostScore> {
    let mut ranked = rank_hosts(hosts, weights);
    ranked.truncate(n);
    ranked
}

fn known_range(values: impl Iterator<Item = Option<f64>>) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for value in values.flatten() {
        range = Some(match range {
            None => (value, value),
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
        });
    }
    range
}

/// Normalize into [0,1] and invert, for axes where lower raw values win.
fn inverted_axis_score(value: Option<f64>, range: Option<(f64, f64)>) -> f64 {
    match (value, range) {
        (Some(v), Some((lo, hi))) if hi > lo => 1.0 - (v - lo) / (hi - lo),
        (Some(_), Some(_)) => DEGENERATE_AXIS_SCORE,
        // Unknown value, or no candidate had one on this axis.
        _ => 0.0,
    }
}

fn direct_axis_score(value: Option<f64>, range: Option<(f64, f64)>) -> f64 {
    match (value, range) {
        (Some(v), Some((lo, hi))) if hi > lo => (v - lo) / (hi - lo),
        (Some(_), Some(_)) => DEGENERATE_AXIS_SCORE,
        _ => 0.0,
    }
}
