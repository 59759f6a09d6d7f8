//! Metric extraction and threshold comparison for automation rules.

use revoa_core::types::EntityMetrics;
use revoa_insights::types::{RuleComparison, RuleCondition, RuleMetric};

/// Pull the watched metric out of a snapshot. Optional metrics that were
/// never derived return `None`, and the rule check is skipped for this
/// pass rather than treated as zero.
pub fn metric_value(metrics: &EntityMetrics, metric: RuleMetric) -> Option<f64> {
    match metric {
        RuleMetric::Roas => Some(metrics.roas),
        RuleMetric::Spend => Some(metrics.spend),
        RuleMetric::Profit => metrics.profit,
        RuleMetric::Cpa => metrics.cpa,
        RuleMetric::Ctr => metrics.ctr,
    }
}

pub fn condition_met(condition: &RuleCondition, value: f64) -> bool {
    match condition.comparison {
        RuleComparison::Below => value < condition.threshold,
        RuleComparison::Above => value > condition.threshold,
    }
}
