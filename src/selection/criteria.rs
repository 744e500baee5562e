use serde::{Deserialize, Serialize};

/// How `select_optimal_host` chooses among the hosts that survive the hard
/// constraints. `FirstAvailable` is the unspecified-strategy behavior: take
/// the first eligible candidate unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    Price,
    Latency,
    Capability,
    Composite,
    RoundRobin,
    #[default]
    FirstAvailable,
}

/// Caller-supplied, per-call selection policy. Hard constraints
/// (`max_price`, `max_latency`, `required_model`, `required_capabilities`)
/// are AND-composed; the preferences only steer tie-breaks and scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionCriteria {
    pub strategy: SelectionStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_latency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_model: Option<String>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_region: Option<String>,
    #[serde(default)]
    pub preferred_capabilities: Vec<String>,
}

impl SelectionCriteria {
    pub fn for_strategy(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }
}

/// Relative axis weights for composite ranking. They do not need to sum to
/// one; the ranking is order-preserving under positive rescaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub price: f64,
    pub latency: f64,
    pub reliability: f64,
}

impl Weights {
    pub fn balanced() -> Self {
        Self {
            price: 0.33,
            latency: 0.33,
            reliability: 0.34,
        }
    }

    pub fn price_focused() -> Self {
        Self {
            price: 0.6,
            latency: 0.2,
            reliability: 0.2,
        }
    }

    pub fn latency_focused() -> Self {
        Self {
            price: 0.2,
            latency: 0.6,
            reliability: 0.2,
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Named weight presets, the selector-level configuration surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightPreset {
    PriceFocused,
    LatencyFocused,
    #[default]
    Balanced,
}

impl WeightPreset {
    pub fn weights(self) -> Weights {
        match self {
            WeightPreset::PriceFocused => Weights::price_focused(),
            WeightPreset::LatencyFocused => Weights::latency_focused(),
            WeightPreset::Balanced => Weights::balanced(),
        }
    }
}

/// General-purpose host filter, usable outside `select_optimal_host`.
/// `models` is any-of, `capabilities` is all-of, `region` is an exact match,
/// and `max_latency` only accepts hosts with a known latency within bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRequirements {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_latency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}
