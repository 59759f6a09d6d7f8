//! Proactive intelligence analyzer ("Rex") — the merchant-voiced second
//! opinion that runs on a schedule rather than on demand.
//!
//! Unlike the classifier, every check runs independently and all matches
//! are returned, so one entity can produce several drafts in a single
//! pass. The threshold table here overlaps with `classifier.rs` but is
//! maintained separately; the two sets are numerically different (for
//! example the stop-loss here keys on negative profit over $50 of spend,
//! not on ROAS under 1.0 over $100) and are kept apart pending a product
//! decision on consolidation.

use chrono::{Duration, Utc};
use revoa_core::types::{AccountBenchmarks, EntityKind, EntityMetrics};

use crate::format::{money, multiple, percent};
use crate::types::{MetricsSnapshot, RexCheck, RexSuggestionDraft, Urgency};

/// Hours a proactive draft stays actionable. Shorter than the classifier
/// TTL; this feed refreshes on every sync pass.
const PROACTIVE_TTL_HOURS: i64 = 48;

const PAUSE_MIN_SPEND: f64 = 50.0;
const SCALE_MIN_ROAS: f64 = 2.8;
const SCALE_MIN_SPEND: f64 = 30.0;
const FATIGUE_MIN_IMPRESSIONS: u64 = 10_000;
const FATIGUE_MAX_CTR: f64 = 0.8;
const LAGGARD_BENCHMARK_FRACTION: f64 = 0.6;
const LAGGARD_MIN_SPEND: f64 = 40.0;
const LOW_CVR_MIN_CLICKS: u64 = 200;
const LOW_CVR_MAX_RATE: f64 = 0.01;

/// Conversational openers, one per check. Selection is by the check's
/// position in [`RexCheck`], so output is deterministic per call.
const OPENERS: [&str; 5] = [
    "Heads up:",
    "Good news:",
    "Worth a look:",
    "Flagging this one:",
    "Something to check:",
];

fn opener(check: RexCheck) -> &'static str {
    OPENERS[check as usize % OPENERS.len()]
}

/// Run every proactive check against one entity snapshot.
///
/// Returns all matches, ordered by check. Missing optional metrics skip
/// the checks that need them; creative fatigue only applies to ads.
pub fn analyze(
    metrics: &EntityMetrics,
    entity_kind: EntityKind,
    benchmarks: &AccountBenchmarks,
) -> Vec<RexSuggestionDraft> {
    let mut drafts = Vec::new();

    check_negative_roi(metrics, entity_kind, &mut drafts);
    check_scale_opportunity(metrics, entity_kind, &mut drafts);
    check_creative_fatigue(metrics, entity_kind, &mut drafts);
    check_underperformance(metrics, entity_kind, benchmarks, &mut drafts);
    check_low_conversion_rate(metrics, entity_kind, &mut drafts);

    drafts
}

fn check_negative_roi(m: &EntityMetrics, kind: EntityKind, out: &mut Vec<RexSuggestionDraft>) {
    let Some(profit) = m.profit else { return };
    if !(m.spend > PAUSE_MIN_SPEND && profit < 0.0) {
        return;
    }

    out.push(draft(
        m,
        kind,
        RexCheck::NegativeRoi,
        format!("{} is losing money", m.entity_name),
        format!(
            "{} your {} \"{}\" on {} is {} in the red after {} of spend. \
             I'd pause it before the loss grows.",
            opener(RexCheck::NegativeRoi),
            kind.label(),
            m.entity_name,
            m.platform.label(),
            money(profit.abs()),
            money(m.spend),
        ),
        Urgency::Critical,
        92,
    ));
}

fn check_scale_opportunity(m: &EntityMetrics, kind: EntityKind, out: &mut Vec<RexSuggestionDraft>) {
    if !(m.roas >= SCALE_MIN_ROAS && m.spend >= SCALE_MIN_SPEND) {
        return;
    }

    out.push(draft(
        m,
        kind,
        RexCheck::ScaleOpportunity,
        format!("{} is ready to scale", m.entity_name),
        format!(
            "{} your {} \"{}\" on {} is returning {} on {} of spend. \
             There's headroom here; a budget bump should pay for itself.",
            opener(RexCheck::ScaleOpportunity),
            kind.label(),
            m.entity_name,
            m.platform.label(),
            multiple(m.roas),
            money(m.spend),
        ),
        Urgency::High,
        85,
    ));
}

fn check_creative_fatigue(m: &EntityMetrics, kind: EntityKind, out: &mut Vec<RexSuggestionDraft>) {
    // Fatigue is a per-creative signal; campaigns and ad sets aggregate it away.
    if kind != EntityKind::Ad {
        return;
    }
    let (Some(ctr), Some(impressions)) = (m.ctr, m.impressions) else {
        return;
    };
    if !(impressions >= FATIGUE_MIN_IMPRESSIONS && ctr < FATIGUE_MAX_CTR) {
        return;
    }

    out.push(draft(
        m,
        kind,
        RexCheck::CreativeFatigue,
        format!("{} looks fatigued", m.entity_name),
        format!(
            "{} your ad \"{}\" on {} has {} impressions but only a {} click-through \
             rate. Audiences have likely seen it too often; rotate in fresh creative.",
            opener(RexCheck::CreativeFatigue),
            m.entity_name,
            m.platform.label(),
            impressions,
            percent(ctr),
        ),
        Urgency::Medium,
        70,
    ));
}

fn check_underperformance(
    m: &EntityMetrics,
    kind: EntityKind,
    b: &AccountBenchmarks,
    out: &mut Vec<RexSuggestionDraft>,
) {
    if b.avg_roas <= 0.0 {
        return;
    }
    if !(m.roas < b.avg_roas * LAGGARD_BENCHMARK_FRACTION && m.spend >= LAGGARD_MIN_SPEND) {
        return;
    }

    out.push(draft(
        m,
        kind,
        RexCheck::Underperformance,
        format!("{} is trailing your account", m.entity_name),
        format!(
            "{} your {} \"{}\" on {} is returning {} while your account averages {}. \
             That budget would work harder on your top performers.",
            opener(RexCheck::Underperformance),
            kind.label(),
            m.entity_name,
            m.platform.label(),
            multiple(m.roas),
            multiple(b.avg_roas),
        ),
        Urgency::High,
        75,
    ));
}

fn check_low_conversion_rate(
    m: &EntityMetrics,
    kind: EntityKind,
    out: &mut Vec<RexSuggestionDraft>,
) {
    let Some(clicks) = m.clicks else { return };
    if clicks < LOW_CVR_MIN_CLICKS {
        return;
    }
    let rate = m.conversions as f64 / clicks as f64;
    if rate >= LOW_CVR_MAX_RATE {
        return;
    }

    out.push(draft(
        m,
        kind,
        RexCheck::LowConversionRate,
        format!("{} gets clicks but not sales", m.entity_name),
        format!(
            "{} your {} \"{}\" on {} turned {} clicks into {} conversions ({}). \
             The ad is working; the landing page or offer probably isn't.",
            opener(RexCheck::LowConversionRate),
            kind.label(),
            m.entity_name,
            m.platform.label(),
            clicks,
            m.conversions,
            percent(rate * 100.0),
        ),
        Urgency::Medium,
        65,
    ));
}

fn draft(
    m: &EntityMetrics,
    kind: EntityKind,
    check: RexCheck,
    headline: String,
    body: String,
    urgency: Urgency,
    priority: u8,
) -> RexSuggestionDraft {
    RexSuggestionDraft {
        entity_id: m.entity_id.clone(),
        entity_kind: kind,
        platform: m.platform,
        check,
        headline,
        body,
        urgency,
        priority,
        snapshot: MetricsSnapshot::from_metrics(m),
        expires_at: Utc::now() + Duration::hours(PROACTIVE_TTL_HOURS),
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
            entity_id: "ad-7".to_string(),
            entity_name: "UGC Hook v3".to_string(),
            platform: Platform::Tiktok,
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

    // 1. Multiple simultaneous matches --------------------------------------

    #[test]
    fn test_multiple_checks_can_fire_together() {
        // Negative profit over $50 spend AND well below the account average.
        let mut m = metrics(120.0, 80.0, 0.67, 3);
        m.profit = Some(-40.0);
        let drafts = analyze(&m, EntityKind::Campaign, &benchmarks(2.0));

        let checks: Vec<RexCheck> = drafts.iter().map(|d| d.check).collect();
        assert!(checks.contains(&RexCheck::NegativeRoi));
        assert!(checks.contains(&RexCheck::Underperformance));
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn test_no_matches_returns_empty() {
        let drafts = analyze(
            &metrics(20.0, 40.0, 2.0, 2),
            EntityKind::Campaign,
            &benchmarks(2.0),
        );
        assert!(drafts.is_empty());
    }

    // 2. Threshold divergence from the classifier ---------------------------

    #[test]
    fn test_pause_keys_on_profit_not_roas() {
        // roas above 1.0 but profit negative: Rex flags it, the classifier's
        // stop-loss would not.
        let mut m = metrics(60.0, 90.0, 1.5, 3);
        m.profit = Some(-10.0);
        let drafts = analyze(&m, EntityKind::Campaign, &benchmarks(1.5));
        assert!(drafts.iter().any(|d| d.check == RexCheck::NegativeRoi));
    }

    #[test]
    fn test_pause_spend_guard_is_strict() {
        // spend exactly 50 fails the strict > 50 guard.
        let mut m = metrics(50.0, 20.0, 0.4, 1);
        m.profit = Some(-30.0);
        let drafts = analyze(&m, EntityKind::Campaign, &benchmarks(0.0));
        assert!(drafts.iter().all(|d| d.check != RexCheck::NegativeRoi));
    }

    #[test]
    fn test_scale_thresholds_differ_from_classifier() {
        // roas 2.6 scales under the classifier but not here (needs 2.8).
        let drafts = analyze(
            &metrics(100.0, 260.0, 2.6, 10),
            EntityKind::Campaign,
            &benchmarks(2.0),
        );
        assert!(drafts.iter().all(|d| d.check != RexCheck::ScaleOpportunity));

        let drafts = analyze(
            &metrics(100.0, 300.0, 3.0, 10),
            EntityKind::Campaign,
            &benchmarks(2.0),
        );
        assert!(drafts.iter().any(|d| d.check == RexCheck::ScaleOpportunity));
    }

    // 3. Entity-kind gating -------------------------------------------------

    #[test]
    fn test_creative_fatigue_is_ad_only() {
        let mut m = metrics(80.0, 160.0, 2.0, 5);
        m.ctr = Some(0.5);
        m.impressions = Some(50_000);

        let as_campaign = analyze(&m, EntityKind::Campaign, &benchmarks(2.0));
        assert!(as_campaign
            .iter()
            .all(|d| d.check != RexCheck::CreativeFatigue));

        let as_ad = analyze(&m, EntityKind::Ad, &benchmarks(2.0));
        assert!(as_ad.iter().any(|d| d.check == RexCheck::CreativeFatigue));
    }

    #[test]
    fn test_low_conversion_rate_needs_click_volume() {
        let mut m = metrics(80.0, 120.0, 1.5, 1);
        m.clicks = Some(150);
        let drafts = analyze(&m, EntityKind::Ad, &benchmarks(1.5));
        assert!(drafts
            .iter()
            .all(|d| d.check != RexCheck::LowConversionRate));

        m.clicks = Some(400);
        let drafts = analyze(&m, EntityKind::Ad, &benchmarks(1.5));
        assert!(drafts
            .iter()
            .any(|d| d.check == RexCheck::LowConversionRate));
    }

    // 4. Determinism --------------------------------------------------------

    #[test]
    fn test_output_is_deterministic() {
        let mut m = metrics(120.0, 80.0, 0.67, 3);
        m.profit = Some(-40.0);
        let a = analyze(&m, EntityKind::Campaign, &benchmarks(2.0));
        let b = analyze(&m, EntityKind::Campaign, &benchmarks(2.0));

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.headline, y.headline);
            assert_eq!(x.body, y.body);
            assert_eq!(x.priority, y.priority);
        }
    }

    #[test]
    fn test_openers_are_stable_per_check() {
        let mut m = metrics(120.0, 80.0, 0.67, 3);
        m.profit = Some(-40.0);
        let drafts = analyze(&m, EntityKind::Campaign, &benchmarks(2.0));
        let negative = drafts
            .iter()
            .find(|d| d.check == RexCheck::NegativeRoi)
            .unwrap();
        assert!(negative.body.starts_with("Heads up:"));
    }
}
