// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use fabstir_llm_client::discovery::Host;
use fabstir_llm_client::selection::{HostSelector, SelectionCriteria, SelectionStrategy};

#[cfg(test)]
mod tests {
    use super::*;

    fn host(id: &str, price: Option<f64>, latency: Option<u64>) -> Host {
        Host {
            id: id.to_string(),
            address: format!("0x{}", id),
            url: format!("wss://{}.example.net", id),
            models: vec!["llama-7b".to_string()],
            price_per_token: price,
            latency,
            region: None,
            capabilities: Vec::new(),
            reliability: None,
        }
    }

    #[test]
    fn test_hard_constraints_are_and_composed() {
        let mut cheap_distant = host("cheap-distant", Some(0.001), Some(400));
        cheap_distant.capabilities = vec!["streaming".to_string()];
        let mut fast_pricey = host("fast-pricey", Some(0.01), Some(20));
        fast_pricey.capabilities = vec!["streaming".to_string()];
        let mut fits_all = host("fits-all", Some(0.002), Some(40));
        fits_all.capabilities = vec!["streaming".to_string(), "batching".to_string()];

        let criteria = SelectionCriteria {
            strategy: SelectionStrategy::FirstAvailable,
            max_price: Some(0.005),
            max_latency: Some(100),
            required_model: Some("llama-7b".to_string()),
            required_capabilities: vec!["streaming".to_string(), "batching".to_string()],
            ..Default::default()
        };

        let mut selector = HostSelector::new();
        let chosen = selector.select_optimal_host(
            &[cheap_distant, fast_pricey, fits_all],
            &criteria,
        );

        // Only the host satisfying every constraint simultaneously survives.
        assert_eq!(chosen.unwrap().id, "fits-all");
    }

    #[test]
    fn test_unknown_price_excluded_by_price_bound() {
        let criteria = SelectionCriteria {
            max_price: Some(1.0),
            ..Default::default()
        };
        let mut selector = HostSelector::new();
        let chosen = selector.select_optimal_host(&[host("mystery", None, Some(10))], &criteria);
        assert!(chosen.is_none());
    }

    #[test]
    fn test_price_strategy_picks_cheapest_known() {
        let hosts = vec![
            host("unknown", None, Some(10)),
            host("mid", Some(0.002), Some(50)),
            host("cheap", Some(0.001), Some(300)),
        ];
        let mut selector = HostSelector::new();
        let chosen = selector
            .select_optimal_host(&hosts, &SelectionCriteria::for_strategy(SelectionStrategy::Price))
            .unwrap();
        assert_eq!(chosen.id, "cheap");
    }

    #[test]
    fn test_price_strategy_never_prefers_unknown_over_known() {
        let hosts = vec![
            host("unknown", None, Some(10)),
            host("known", Some(5.0), Some(900)),
        ];
        let mut selector = HostSelector::new();
        let chosen = selector
            .select_optimal_host(&hosts, &SelectionCriteria::for_strategy(SelectionStrategy::Price))
            .unwrap();
        assert_eq!(chosen.id, "known");
    }

    #[test]
    fn test_latency_strategy_picks_fastest() {
        let hosts = vec![
            host("slow", Some(0.001), Some(200)),
            host("fast", Some(0.01), Some(25)),
            host("unknown", Some(0.001), None),
        ];
        let mut selector = HostSelector::new();
        let chosen = selector
            .select_optimal_host(
                &hosts,
                &SelectionCriteria::for_strategy(SelectionStrategy::Latency),
            )
            .unwrap();
        assert_eq!(chosen.id, "fast");
    }

    #[test]
    fn test_latency_region_affinity_tiebreak() {
        let mut fast = host("fast", Some(0.002), Some(30));
        fast.region = Some("us-east".to_string());
        let mut near_tie_local = host("near-tie-local", Some(0.002), Some(38));
        near_tie_local.region = Some("eu-west".to_string());

        let criteria = SelectionCriteria {
            strategy: SelectionStrategy::Latency,
            preferred_region: Some("eu-west".to_string()),
            ..Default::default()
        };

        let mut selector = HostSelector::new();
        // 38ms is within the 10ms affinity window of 30ms, and the slower
        // host sits in the preferred region.
        let chosen = selector
            .select_optimal_host(&[fast.clone(), near_tie_local], &criteria)
            .unwrap();
        assert_eq!(chosen.id, "near-tie-local");

        // Outside the window, raw latency wins regardless of region.
        let mut far_local = host("far-local", Some(0.002), Some(90));
        far_local.region = Some("eu-west".to_string());
        let chosen = selector
            .select_optimal_host(&[fast, far_local], &criteria)
            .unwrap();
        assert_eq!(chosen.id, "fast");
    }

    #[test]
    fn test_capability_strategy_maximizes_overlap() {
        let mut one = host("one", Some(0.002), Some(50));
        one.capabilities = vec!["batching".to_string()];
        let mut two = host("two", Some(0.002), Some(50));
        two.capabilities = vec!["batching".to_string(), "tool-calling".to_string()];

        let criteria = SelectionCriteria {
            strategy: SelectionStrategy::Capability,
            preferred_capabilities: vec![
                "batching".to_string(),
                "tool-calling".to_string(),
                "vision".to_string(),
            ],
            ..Default::default()
        };

        let mut selector = HostSelector::new();
        let chosen = selector.select_optimal_host(&[one, two], &criteria).unwrap();
        assert_eq!(chosen.id, "two");
    }

    #[test]
    fn test_capability_strategy_without_preferences_takes_first() {
        let hosts = vec![host("a", Some(0.002), Some(50)), host("b", Some(0.001), Some(10))];
        let mut selector = HostSelector::new();
        let chosen = selector
            .select_optimal_host(
                &hosts,
                &SelectionCriteria::for_strategy(SelectionStrategy::Capability),
            )
            .unwrap();
        assert_eq!(chosen.id, "a");
    }

    #[test]
    fn test_default_strategy_takes_first_candidate() {
        let hosts = vec![host("a", Some(0.01), Some(500)), host("b", Some(0.001), Some(10))];
        let mut selector = HostSelector::new();
        let chosen = selector
            .select_optimal_host(&hosts, &SelectionCriteria::default())
            .unwrap();
        assert_eq!(chosen.id, "a");
    }

    #[test]
    fn test_empty_candidate_set_is_none_not_error() {
        let mut selector = HostSelector::new();
        assert!(selector
            .select_optimal_host(&[], &SelectionCriteria::default())
            .is_none());

        let criteria = SelectionCriteria {
            required_model: Some("nonexistent-model".to_string()),
            ..Default::default()
        };
        assert!(selector
            .select_optimal_host(&[host("a", Some(0.001), Some(10))], &criteria)
            .is_none());
    }

    #[test]
    fn test_selection_is_counted() {
        let hosts = vec![host("a", Some(0.001), Some(10))];
        let mut selector = HostSelector::new();
        selector.select_optimal_host(&hosts, &SelectionCriteria::default());
        selector.select_optimal_host(&hosts, &SelectionCriteria::default());

        let stats = selector.get_selection_stats();
        assert_eq!(stats.total_selections, 2);
        assert_eq!(stats.host_selection_counts.get("a"), Some(&2));
    }

    #[test]
    fn test_no_selection_recorded_when_nothing_matches() {
        let mut selector = HostSelector::new();
        let criteria = SelectionCriteria {
            max_price: Some(0.0001),
            ..Default::default()
        };
        selector.select_optimal_host(&[host("a", Some(1.0), Some(10))], &criteria);
        assert_eq!(selector.get_selection_stats().total_selections, 0);
    }
}
