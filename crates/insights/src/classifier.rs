//! Suggestion classifier — maps one entity's performance snapshot, plus
//! account benchmarks, to at most one recommended action with rationale.
//!
//! Branches are evaluated in a fixed priority order (highest commercial
//! urgency first) and the first match wins. The ordering is load-bearing:
//! several predicates overlap, and reordering them changes which
//! classification a snapshot receives.

use chrono::{Duration, Utc};
use revoa_core::types::{AccountBenchmarks, EntityKind, EntityMetrics};
use uuid::Uuid;

use crate::format::{money, multiple, percent, signed_money};
use crate::types::{
    AutomationProposal, EstimatedImpact, ImpactConfidence, MetricsSnapshot, Reasoning, RiskLevel,
    RuleAction, RuleComparison, RuleCondition, RuleMetric, SituationKind, Suggestion, Urgency,
};

/// Hours a generated suggestion stays actionable.
const SUGGESTION_TTL_HOURS: i64 = 72;

// Branch thresholds. A separately maintained table exists in `rex.rs`;
// the two are intentionally not unified (see module doc there).
const SCALE_MIN_ROAS: f64 = 2.5;
const SCALE_MIN_SPEND: f64 = 50.0;
const SCALE_BUDGET_STEP: f64 = 0.5;
const SCALE_GUARD_FRACTION: f64 = 0.75;
const STOP_LOSS_ROAS: f64 = 1.0;
const STOP_LOSS_MIN_SPEND: f64 = 100.0;
const LAGGARD_BENCHMARK_FRACTION: f64 = 0.7;
const LAGGARD_MIN_SPEND: f64 = 50.0;
const LAGGARD_BUDGET_CUT: f64 = 0.5;
const NEGATIVE_ROI_MIN_SPEND: f64 = 100.0;
const HIGH_CPA_FACTOR: f64 = 1.5;
const LOW_CTR_FRACTION: f64 = 0.5;
const MODERATE_MIN_ROAS: f64 = 1.5;
const MODERATE_MIN_SPEND: f64 = 50.0;
const MODERATE_BUDGET_STEP: f64 = 0.2;
const MODERATE_GUARD_FRACTION: f64 = 0.8;

type BranchCheck = fn(&EntityMetrics, &AccountBenchmarks) -> bool;
type BranchBuild = fn(&EntityMetrics, EntityKind, &AccountBenchmarks) -> Suggestion;

/// Ordered `(predicate, builder)` table. Evaluated top to bottom;
/// the first predicate that holds selects the builder.
const BRANCHES: &[(BranchCheck, BranchBuild)] = &[
    (scale_applies, build_scale),
    (stop_loss_applies, build_stop_loss),
    (laggard_applies, build_laggard),
    (negative_roi_applies, build_negative_roi),
    (high_cpa_applies, build_high_cpa),
    (low_ctr_applies, build_low_ctr),
    (moderate_applies, build_moderate),
];

/// Classify one entity snapshot against account benchmarks.
///
/// Returns `None` when no branch matches. Pure apart from the generated
/// id and created/expires timestamps. Missing optional metrics disable
/// the branches that need them; a non-positive `avg_roas` disables the
/// benchmark-relative branch instead of poisoning the arithmetic.
pub fn classify(
    metrics: &EntityMetrics,
    entity_kind: EntityKind,
    benchmarks: &AccountBenchmarks,
) -> Option<Suggestion> {
    BRANCHES
        .iter()
        .find(|(check, _)| check(metrics, benchmarks))
        .map(|(_, build)| build(metrics, entity_kind, benchmarks))
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn scale_applies(m: &EntityMetrics, _b: &AccountBenchmarks) -> bool {
    m.roas >= SCALE_MIN_ROAS && m.spend >= SCALE_MIN_SPEND
}

fn stop_loss_applies(m: &EntityMetrics, _b: &AccountBenchmarks) -> bool {
    m.roas < STOP_LOSS_ROAS && m.spend >= STOP_LOSS_MIN_SPEND
}

fn laggard_applies(m: &EntityMetrics, b: &AccountBenchmarks) -> bool {
    b.avg_roas > 0.0
        && m.roas < b.avg_roas * LAGGARD_BENCHMARK_FRACTION
        && m.spend >= LAGGARD_MIN_SPEND
}

fn negative_roi_applies(m: &EntityMetrics, _b: &AccountBenchmarks) -> bool {
    matches!(m.profit, Some(p) if p < 0.0) && m.spend >= NEGATIVE_ROI_MIN_SPEND
}

fn high_cpa_applies(m: &EntityMetrics, b: &AccountBenchmarks) -> bool {
    match (m.cpa, b.avg_cpa) {
        (Some(cpa), Some(avg)) => cpa > avg * HIGH_CPA_FACTOR,
        _ => false,
    }
}

fn low_ctr_applies(m: &EntityMetrics, b: &AccountBenchmarks) -> bool {
    match (m.ctr, b.avg_ctr) {
        (Some(ctr), Some(avg)) => ctr < avg * LOW_CTR_FRACTION,
        _ => false,
    }
}

fn moderate_applies(m: &EntityMetrics, _b: &AccountBenchmarks) -> bool {
    m.roas >= MODERATE_MIN_ROAS && m.roas < SCALE_MIN_ROAS && m.spend >= MODERATE_MIN_SPEND
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn build_scale(m: &EntityMetrics, kind: EntityKind, _b: &AccountBenchmarks) -> Suggestion {
    let budget_delta = m.spend * SCALE_BUDGET_STEP;
    let projected_revenue = budget_delta * m.roas;
    let guard_roas = m.roas * SCALE_GUARD_FRACTION;

    let message = format!(
        "Your {} \"{}\" on {} is returning {} on {} of spend. \
         Raising the budget by 50% ({}) is projected to add {} in revenue at the current return.",
        kind.label(),
        m.entity_name,
        m.platform.label(),
        multiple(m.roas),
        money(m.spend),
        signed_money(budget_delta),
        money(projected_revenue),
    );

    finish(
        m,
        kind,
        SituationKind::ScaleHighPerformer,
        format!("Scale opportunity: {}", m.entity_name),
        message,
        95,
        90,
        Reasoning {
            triggers: vec![
                format!("roas {} >= {}", multiple(m.roas), multiple(SCALE_MIN_ROAS)),
                format!("spend {} >= {}", money(m.spend), money(SCALE_MIN_SPEND)),
            ],
            risk_level: RiskLevel::Low,
            urgency: Urgency::High,
            snapshot: MetricsSnapshot::from_metrics(m),
            analysis: "Return is well above the scale threshold with enough spend behind \
                       it to trust the signal. A 50% budget step keeps the downside \
                       bounded while the guard rule below protects against decay."
                .to_string(),
        },
        Some(AutomationProposal {
            name: format!("Scale guard for {}", m.entity_name),
            description: format!(
                "Pause this {} if ROAS falls below {} (75% of the current {}).",
                kind.label(),
                multiple(guard_roas),
                multiple(m.roas),
            ),
            condition: RuleCondition {
                metric: RuleMetric::Roas,
                comparison: RuleComparison::Below,
                threshold: guard_roas,
            },
            action: RuleAction::PauseEntity,
            check_frequency_hours: 24,
            requires_approval: false,
        }),
        Some(EstimatedImpact {
            projected_spend_change: budget_delta,
            projected_revenue_change: projected_revenue,
            projected_profit_change: projected_revenue - budget_delta,
            confidence: ImpactConfidence::High,
        }),
    )
}

fn build_stop_loss(m: &EntityMetrics, kind: EntityKind, _b: &AccountBenchmarks) -> Suggestion {
    let message = format!(
        "Your {} \"{}\" on {} has spent {} to return {}, earning {} for every dollar in. \
         Pausing it now stops the bleed.",
        kind.label(),
        m.entity_name,
        m.platform.label(),
        money(m.spend),
        money(m.revenue),
        money(m.roas),
    );

    finish(
        m,
        kind,
        SituationKind::PauseUnderperforming,
        format!("Pause recommended: {}", m.entity_name),
        message,
        90,
        85,
        Reasoning {
            triggers: vec![
                format!("roas {} < {}", multiple(m.roas), multiple(STOP_LOSS_ROAS)),
                format!("spend {} >= {}", money(m.spend), money(STOP_LOSS_MIN_SPEND)),
            ],
            risk_level: RiskLevel::High,
            urgency: Urgency::Critical,
            snapshot: MetricsSnapshot::from_metrics(m),
            analysis: "Returning less than break-even at meaningful spend. This is an \
                       unconditional stop-loss; no benchmark context changes the call."
                .to_string(),
        },
        Some(AutomationProposal {
            name: format!("Stop-loss for {}", m.entity_name),
            description: format!(
                "Pause this {} whenever ROAS sits below {}.",
                kind.label(),
                multiple(STOP_LOSS_ROAS),
            ),
            condition: RuleCondition {
                metric: RuleMetric::Roas,
                comparison: RuleComparison::Below,
                threshold: STOP_LOSS_ROAS,
            },
            action: RuleAction::PauseEntity,
            check_frequency_hours: 6,
            requires_approval: false,
        }),
        Some(EstimatedImpact {
            projected_spend_change: -m.spend,
            projected_revenue_change: -m.revenue,
            projected_profit_change: m.spend - m.revenue,
            confidence: ImpactConfidence::High,
        }),
    )
}

fn build_laggard(m: &EntityMetrics, kind: EntityKind, b: &AccountBenchmarks) -> Suggestion {
    let budget_cut = m.spend * LAGGARD_BUDGET_CUT;
    let benchmark_line = b.avg_roas * LAGGARD_BENCHMARK_FRACTION;

    let message = format!(
        "Your {} \"{}\" on {} is returning {} against an account average of {}. \
         Cutting its budget by 50% ({}) frees spend for your stronger performers.",
        kind.label(),
        m.entity_name,
        m.platform.label(),
        multiple(m.roas),
        multiple(b.avg_roas),
        signed_money(-budget_cut),
    );

    finish(
        m,
        kind,
        SituationKind::ReallocateBudget,
        format!("Underperforming vs account: {}", m.entity_name),
        message,
        80,
        75,
        Reasoning {
            triggers: vec![
                format!(
                    "roas {} < {} (70% of account average {})",
                    multiple(m.roas),
                    multiple(benchmark_line),
                    multiple(b.avg_roas),
                ),
                format!("spend {} >= {}", money(m.spend), money(LAGGARD_MIN_SPEND)),
            ],
            risk_level: RiskLevel::Medium,
            urgency: Urgency::High,
            snapshot: MetricsSnapshot::from_metrics(m),
            analysis: "Profitable in isolation but well below the account baseline; the \
                       same dollars earn more elsewhere in the account."
                .to_string(),
        },
        Some(AutomationProposal {
            name: format!("Budget reallocation for {}", m.entity_name),
            description: format!(
                "Cut this {}'s budget by 50% while ROAS stays below {}.",
                kind.label(),
                multiple(benchmark_line),
            ),
            condition: RuleCondition {
                metric: RuleMetric::Roas,
                comparison: RuleComparison::Below,
                threshold: benchmark_line,
            },
            action: RuleAction::AdjustBudget {
                percent: -(LAGGARD_BUDGET_CUT * 100.0),
            },
            check_frequency_hours: 24,
            requires_approval: false,
        }),
        Some(EstimatedImpact {
            projected_spend_change: -budget_cut,
            projected_revenue_change: -(budget_cut * m.roas),
            projected_profit_change: budget_cut * (1.0 - m.roas),
            confidence: ImpactConfidence::Medium,
        }),
    )
}

fn build_negative_roi(m: &EntityMetrics, kind: EntityKind, _b: &AccountBenchmarks) -> Suggestion {
    let loss = m.profit.unwrap_or(m.revenue - m.spend);

    let message = format!(
        "Your {} \"{}\" on {} is {} in the red after {} of spend. \
         Pausing it protects your margin while you rework it.",
        kind.label(),
        m.entity_name,
        m.platform.label(),
        money(loss.abs()),
        money(m.spend),
    );

    finish(
        m,
        kind,
        SituationKind::NegativeRoi,
        format!("Losing money: {}", m.entity_name),
        message,
        75,
        80,
        Reasoning {
            triggers: vec![
                format!("profit {} < $0.00", money(loss)),
                format!(
                    "spend {} >= {}",
                    money(m.spend),
                    money(NEGATIVE_ROI_MIN_SPEND)
                ),
            ],
            risk_level: RiskLevel::High,
            urgency: Urgency::High,
            snapshot: MetricsSnapshot::from_metrics(m),
            analysis: "Net profit is negative once costs beyond ad spend are counted. \
                       Revenue alone overstates how this entity is doing."
                .to_string(),
        },
        Some(AutomationProposal {
            name: format!("Profit floor for {}", m.entity_name),
            description: format!("Pause this {} while net profit is negative.", kind.label()),
            condition: RuleCondition {
                metric: RuleMetric::Profit,
                comparison: RuleComparison::Below,
                threshold: 0.0,
            },
            action: RuleAction::PauseEntity,
            check_frequency_hours: 12,
            requires_approval: false,
        }),
        Some(EstimatedImpact {
            projected_spend_change: -m.spend,
            projected_revenue_change: -m.revenue,
            projected_profit_change: -loss,
            confidence: ImpactConfidence::High,
        }),
    )
}

fn build_high_cpa(m: &EntityMetrics, kind: EntityKind, b: &AccountBenchmarks) -> Suggestion {
    // Guarded by the predicate.
    let cpa = m.cpa.unwrap_or_default();
    let avg_cpa = b.avg_cpa.unwrap_or_default();
    let ceiling = avg_cpa * HIGH_CPA_FACTOR;
    let potential_savings = (cpa - avg_cpa) * m.conversions as f64;

    let message = format!(
        "Your {} \"{}\" on {} pays {} per conversion against an account average of {}. \
         A creative and targeting review is the usual fix; closing the gap would save \
         about {} at current volume.",
        kind.label(),
        m.entity_name,
        m.platform.label(),
        money(cpa),
        money(avg_cpa),
        money(potential_savings),
    );

    finish(
        m,
        kind,
        SituationKind::HighCpa,
        format!("Acquisition cost running hot: {}", m.entity_name),
        message,
        70,
        70,
        Reasoning {
            triggers: vec![format!(
                "cpa {} > {} (1.5x account average {})",
                money(cpa),
                money(ceiling),
                money(avg_cpa),
            )],
            risk_level: RiskLevel::Medium,
            urgency: Urgency::Medium,
            snapshot: MetricsSnapshot::from_metrics(m),
            analysis: "Each conversion costs half again the account norm. Creative or \
                       audience fatigue is the usual driver at this stage."
                .to_string(),
        },
        Some(AutomationProposal {
            name: format!("CPA watch for {}", m.entity_name),
            description: format!(
                "Flag this {} for review whenever CPA exceeds {}.",
                kind.label(),
                money(ceiling),
            ),
            condition: RuleCondition {
                metric: RuleMetric::Cpa,
                comparison: RuleComparison::Above,
                threshold: ceiling,
            },
            action: RuleAction::FlagForReview,
            check_frequency_hours: 24,
            requires_approval: true,
        }),
        Some(EstimatedImpact {
            projected_spend_change: -potential_savings,
            projected_revenue_change: 0.0,
            projected_profit_change: potential_savings,
            confidence: ImpactConfidence::Medium,
        }),
    )
}

fn build_low_ctr(m: &EntityMetrics, kind: EntityKind, b: &AccountBenchmarks) -> Suggestion {
    // Guarded by the predicate.
    let ctr = m.ctr.unwrap_or_default();
    let avg_ctr = b.avg_ctr.unwrap_or_default();
    let floor = avg_ctr * LOW_CTR_FRACTION;

    let message = format!(
        "Your {} \"{}\" on {} has a click-through rate of {} against an account \
         average of {}. Audiences are seeing it and scrolling past; refresh the creative.",
        kind.label(),
        m.entity_name,
        m.platform.label(),
        percent(ctr),
        percent(avg_ctr),
    );

    // Only worth projecting clicks when we know the impression volume.
    let estimated_impact = m.impressions.map(|imps| {
        let extra_clicks = imps as f64 * (avg_ctr - ctr) / 100.0;
        let revenue_per_click = m
            .clicks
            .filter(|&c| c > 0)
            .map(|c| m.revenue / c as f64)
            .unwrap_or(0.0);
        EstimatedImpact {
            projected_spend_change: 0.0,
            projected_revenue_change: extra_clicks * revenue_per_click,
            projected_profit_change: extra_clicks * revenue_per_click,
            confidence: ImpactConfidence::Low,
        }
    });

    finish(
        m,
        kind,
        SituationKind::LowCtr,
        format!("Creative not landing: {}", m.entity_name),
        message,
        65,
        65,
        Reasoning {
            triggers: vec![format!(
                "ctr {} < {} (50% of account average {})",
                percent(ctr),
                percent(floor),
                percent(avg_ctr),
            )],
            risk_level: RiskLevel::Low,
            urgency: Urgency::Medium,
            snapshot: MetricsSnapshot::from_metrics(m),
            analysis: "Delivery is fine but engagement is not; the creative itself is the \
                       lever, not the budget."
                .to_string(),
        },
        Some(AutomationProposal {
            name: format!("Creative refresh watch for {}", m.entity_name),
            description: format!(
                "Flag this {} for a creative refresh whenever CTR drops below {}.",
                kind.label(),
                percent(floor),
            ),
            condition: RuleCondition {
                metric: RuleMetric::Ctr,
                comparison: RuleComparison::Below,
                threshold: floor,
            },
            action: RuleAction::FlagForReview,
            check_frequency_hours: 24,
            requires_approval: false,
        }),
        estimated_impact,
    )
}

fn build_moderate(m: &EntityMetrics, kind: EntityKind, _b: &AccountBenchmarks) -> Suggestion {
    let budget_delta = m.spend * MODERATE_BUDGET_STEP;
    let projected_revenue = budget_delta * m.roas;
    let guard_roas = m.roas * MODERATE_GUARD_FRACTION;

    let message = format!(
        "Your {} \"{}\" on {} is returning {}: profitable, but short of the {} \
         scale line. A 20% budget test ({}) will show whether it can climb.",
        kind.label(),
        m.entity_name,
        m.platform.label(),
        multiple(m.roas),
        multiple(SCALE_MIN_ROAS),
        signed_money(budget_delta),
    );

    finish(
        m,
        kind,
        SituationKind::OptimizeModerate,
        format!("Room to optimize: {}", m.entity_name),
        message,
        50,
        60,
        Reasoning {
            triggers: vec![
                format!(
                    "roas {} in [{}, {})",
                    multiple(m.roas),
                    multiple(MODERATE_MIN_ROAS),
                    multiple(SCALE_MIN_ROAS),
                ),
                format!("spend {} >= {}", money(m.spend), money(MODERATE_MIN_SPEND)),
            ],
            risk_level: RiskLevel::Low,
            urgency: Urgency::Low,
            snapshot: MetricsSnapshot::from_metrics(m),
            analysis: "Solidly profitable without being a breakout. Small budget tests and \
                       creative iteration are the right pace here."
                .to_string(),
        },
        Some(AutomationProposal {
            name: format!("Optimization test for {}", m.entity_name),
            description: format!(
                "Raise this {}'s budget by 20%, rolling back if ROAS falls below {}.",
                kind.label(),
                multiple(guard_roas),
            ),
            condition: RuleCondition {
                metric: RuleMetric::Roas,
                comparison: RuleComparison::Below,
                threshold: guard_roas,
            },
            action: RuleAction::AdjustBudget {
                percent: MODERATE_BUDGET_STEP * 100.0,
            },
            check_frequency_hours: 48,
            requires_approval: false,
        }),
        Some(EstimatedImpact {
            projected_spend_change: budget_delta,
            projected_revenue_change: projected_revenue,
            projected_profit_change: projected_revenue - budget_delta,
            confidence: ImpactConfidence::Low,
        }),
    )
}

#[allow(clippy::too_many_arguments)]
fn finish(
    m: &EntityMetrics,
    kind: EntityKind,
    situation: SituationKind,
    title: String,
    message: String,
    priority: u8,
    confidence: u8,
    reasoning: Reasoning,
    automation: Option<AutomationProposal>,
    estimated_impact: Option<EstimatedImpact>,
) -> Suggestion {
    let now = Utc::now();
    Suggestion {
        id: Uuid::new_v4(),
        entity_id: m.entity_id.clone(),
        entity_kind: kind,
        platform: m.platform,
        kind: situation,
        title,
        message,
        priority,
        confidence,
        reasoning,
        automation,
        estimated_impact,
        created_at: now,
        expires_at: now + Duration::hours(SUGGESTION_TTL_HOURS),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use revoa_core::types::{EntityStatus, Platform};

    fn metrics(spend: f64, revenue: f64, roas: f64, conversions: u64) -> EntityMetrics {
        EntityMetrics {
            entity_id: "cmp-1".to_string(),
            entity_name: "Summer Sale".to_string(),
            platform: Platform::Facebook,
            status: EntityStatus::Active,
            spend,
            revenue,
            roas,
            conversions,
            profit: None,
            cpa: None,
            ctr: None,
            impressions: None,
            clicks: None,
        }
    }

    fn benchmarks(avg_roas: f64) -> AccountBenchmarks {
        AccountBenchmarks {
            avg_roas,
            avg_cpa: None,
            avg_ctr: None,
            target_profit_margin: None,
        }
    }

    // 1. Branch selection ---------------------------------------------------

    #[test]
    fn test_scale_scenario() {
        // spend 200, revenue 700, roas 3.5 -> scale, guard 2.625, step +100
        let s = classify(
            &metrics(200.0, 700.0, 3.5, 15),
            EntityKind::Campaign,
            &benchmarks(2.0),
        )
        .unwrap();

        assert_eq!(s.kind, SituationKind::ScaleHighPerformer);
        let rule = s.automation.unwrap();
        assert!((rule.condition.threshold - 2.625).abs() < f64::EPSILON);
        let impact = s.estimated_impact.unwrap();
        assert!((impact.projected_spend_change - 100.0).abs() < f64::EPSILON);
        assert!((impact.projected_revenue_change - 350.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stop_loss_beats_laggard_and_negative_roi() {
        // roas 0.33 at spend 150 also satisfies the laggard predicate
        // (0.33 < 2.0 * 0.7) and negative ROI; the stop-loss branch must win.
        let mut m = metrics(150.0, 50.0, 0.33, 5);
        m.profit = Some(-100.0);
        let s = classify(&m, EntityKind::Campaign, &benchmarks(2.0)).unwrap();
        assert_eq!(s.kind, SituationKind::PauseUnderperforming);
    }

    #[test]
    fn test_stop_loss_ignores_benchmarks() {
        let s = classify(
            &metrics(150.0, 50.0, 0.33, 5),
            EntityKind::Campaign,
            &benchmarks(0.0),
        )
        .unwrap();
        assert_eq!(s.kind, SituationKind::PauseUnderperforming);
    }

    #[test]
    fn test_laggard_branch() {
        // roas 1.2 >= 1.0 so no stop-loss, but 1.2 < 2.5 * 0.7 = 1.75.
        let s = classify(
            &metrics(80.0, 96.0, 1.2, 4),
            EntityKind::AdSet,
            &benchmarks(2.5),
        )
        .unwrap();
        assert_eq!(s.kind, SituationKind::ReallocateBudget);
        let rule = s.automation.unwrap();
        assert!((rule.condition.threshold - 1.75).abs() < 1e-9);
        assert_eq!(
            rule.action,
            RuleAction::AdjustBudget { percent: -50.0 }
        );
    }

    #[test]
    fn test_negative_roi_branch() {
        // Profitable-looking roas but negative net profit, spend >= 100.
        let mut m = metrics(120.0, 180.0, 1.5, 6);
        // roas 1.5 with avg 1.6: not a laggard (1.5 >= 1.12), moderate would
        // match later but negative ROI is checked first.
        m.profit = Some(-20.0);
        let s = classify(&m, EntityKind::Campaign, &benchmarks(1.6)).unwrap();
        assert_eq!(s.kind, SituationKind::NegativeRoi);
        let impact = s.estimated_impact.unwrap();
        assert!((impact.projected_profit_change - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_high_cpa_branch_requires_approval() {
        let mut m = metrics(40.0, 60.0, 1.4, 2);
        m.cpa = Some(20.0);
        let b = AccountBenchmarks {
            avg_roas: 1.5,
            avg_cpa: Some(10.0),
            avg_ctr: None,
            target_profit_margin: None,
        };
        let s = classify(&m, EntityKind::Ad, &b).unwrap();
        assert_eq!(s.kind, SituationKind::HighCpa);
        assert!(s.automation.unwrap().requires_approval);
    }

    #[test]
    fn test_low_ctr_branch() {
        let mut m = metrics(30.0, 45.0, 1.5, 2);
        m.ctr = Some(0.4);
        let b = AccountBenchmarks {
            avg_roas: 1.5,
            avg_cpa: None,
            avg_ctr: Some(1.0),
            target_profit_margin: None,
        };
        let s = classify(&m, EntityKind::Ad, &b).unwrap();
        assert_eq!(s.kind, SituationKind::LowCtr);
        // No impressions supplied -> no projection.
        assert!(s.estimated_impact.is_none());
    }

    #[test]
    fn test_moderate_branch() {
        let s = classify(
            &metrics(100.0, 200.0, 2.0, 8),
            EntityKind::Campaign,
            &benchmarks(2.0),
        )
        .unwrap();
        assert_eq!(s.kind, SituationKind::OptimizeModerate);
    }

    #[test]
    fn test_no_suggestion_below_spend_floors() {
        // Every spend guard fails; cpa/ctr absent disable those branches.
        let s = classify(
            &metrics(10.0, 5.0, 0.5, 1),
            EntityKind::Campaign,
            &benchmarks(2.0),
        );
        assert!(s.is_none());
    }

    // 2. Boundaries ---------------------------------------------------------

    #[test]
    fn test_scale_thresholds_inclusive() {
        let s = classify(
            &metrics(50.0, 125.0, 2.5, 5),
            EntityKind::Campaign,
            &benchmarks(2.0),
        )
        .unwrap();
        assert_eq!(s.kind, SituationKind::ScaleHighPerformer);
    }

    #[test]
    fn test_stop_loss_threshold_exclusive() {
        // roas exactly 1.0 must not stop-loss; with avg 2.0 it is a laggard.
        let s = classify(
            &metrics(150.0, 150.0, 1.0, 5),
            EntityKind::Campaign,
            &benchmarks(2.0),
        )
        .unwrap();
        assert_ne!(s.kind, SituationKind::PauseUnderperforming);
        assert_eq!(s.kind, SituationKind::ReallocateBudget);
    }

    #[test]
    fn test_moderate_upper_bound_exclusive() {
        // roas 2.5 belongs to the scale branch, never moderate.
        let s = classify(
            &metrics(60.0, 150.0, 2.5, 6),
            EntityKind::Campaign,
            &benchmarks(2.4),
        )
        .unwrap();
        assert_eq!(s.kind, SituationKind::ScaleHighPerformer);
    }

    // 3. Purity -------------------------------------------------------------

    #[test]
    fn test_idempotent_apart_from_ids_and_timestamps() {
        let m = metrics(200.0, 700.0, 3.5, 15);
        let b = benchmarks(2.0);
        let a = classify(&m, EntityKind::Campaign, &b).unwrap();
        let c = classify(&m, EntityKind::Campaign, &b).unwrap();

        assert_eq!(a.kind, c.kind);
        assert_eq!(a.title, c.title);
        assert_eq!(a.message, c.message);
        assert_eq!(a.priority, c.priority);
        assert_eq!(a.confidence, c.confidence);
        assert_eq!(a.reasoning.triggers, c.reasoning.triggers);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_zero_avg_roas_disables_laggard_branch() {
        // roas 1.2 at spend 80 would be a laggard against any positive
        // average; with no baseline it must fall through to no suggestion.
        let s = classify(
            &metrics(80.0, 96.0, 1.2, 4),
            EntityKind::Campaign,
            &benchmarks(0.0),
        );
        assert!(s.is_none());
    }

    // 4. Templating ---------------------------------------------------------

    #[test]
    fn test_entity_kind_only_affects_text() {
        let m = metrics(200.0, 700.0, 3.5, 15);
        let b = benchmarks(2.0);
        let campaign = classify(&m, EntityKind::Campaign, &b).unwrap();
        let ad_set = classify(&m, EntityKind::AdSet, &b).unwrap();

        assert_eq!(campaign.kind, ad_set.kind);
        assert_eq!(campaign.priority, ad_set.priority);
        assert!(campaign.message.contains("campaign"));
        assert!(ad_set.message.contains("ad set"));
    }

    #[test]
    fn test_message_formats_currency_two_decimals() {
        let s = classify(
            &metrics(200.0, 700.0, 3.5, 15),
            EntityKind::Campaign,
            &benchmarks(2.0),
        )
        .unwrap();
        assert!(s.message.contains("$200.00"));
        assert!(s.message.contains("3.50x"));
    }
}
