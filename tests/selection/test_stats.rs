use fabstir_llm_client::selection::HostSelector;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reliability_ratio_after_mixed_outcomes() {
        let mut selector = HostSelector::new();
        for _ in 0..9 {
            selector.record_success("a", true);
        }
        selector.record_success("a", false);

        let stats = selector.get_selection_stats();
        assert_eq!(stats.host_reliability_scores.get("a"), Some(&0.9));
    }

    #[test]
    fn test_overall_success_rate_spans_hosts() {
        let mut selector = HostSelector::new();
        selector.record_success("a", true);
        selector.record_success("a", true);
        selector.record_success("b", false);
        selector.record_success("b", true);

        let stats = selector.get_selection_stats();
        assert_eq!(stats.success_rate, 0.75);
        assert_eq!(stats.host_reliability_scores.get("a"), Some(&1.0));
        assert_eq!(stats.host_reliability_scores.get("b"), Some(&0.5));
    }

    #[test]
    fn test_fresh_selector_reports_zero_everything() {
        let selector = HostSelector::new();
        let stats = selector.get_selection_stats();

        assert_eq!(stats.total_selections, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.host_selection_counts.is_empty());
        assert!(stats.host_reliability_scores.is_empty());
    }

    #[test]
    fn test_unrecorded_host_is_absent_from_scores() {
        let mut selector = HostSelector::new();
        selector.record_success("a", true);

        let stats = selector.get_selection_stats();
        assert!(stats.host_reliability_scores.get("never-seen").is_none());
    }

    #[test]
    fn test_selectors_are_statistically_isolated() {
        let mut one = HostSelector::new();
        one.record_success("a", false);

        // State is instance-owned; a second selector starts clean.
        let two = HostSelector::new();
        assert!(two.get_selection_stats().host_reliability_scores.is_empty());
        assert_eq!(one.get_selection_stats().success_rate, 0.0);
    }
}
