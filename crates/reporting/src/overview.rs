//! Account overview — aggregate metrics across every tracked entity.

use chrono::{DateTime, Utc};
use revoa_core::types::{EntityStatus, Platform};
use serde::{Deserialize, Serialize};

use crate::tracker::PerformanceTracker;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub platform: Platform,
    pub spend: f64,
    pub revenue: f64,
    pub roas: f64,
    pub entities: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOverview {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub overall_roas: f64,
    pub total_conversions: u64,
    pub total_clicks: u64,
    pub total_impressions: u64,
    pub tracked_entities: u64,
    pub active_entities: u64,
    pub platform_breakdown: Vec<PlatformBreakdown>,
    pub generated_at: DateTime<Utc>,
}

impl PerformanceTracker {
    /// Aggregate view across every tracked entity, broken down per platform.
    pub fn overview(&self) -> AccountOverview {
        let all = self.all_metrics();

        let total_spend: f64 = all.iter().map(|m| m.spend).sum();
        let total_revenue: f64 = all.iter().map(|m| m.revenue).sum();
        let total_conversions: u64 = all.iter().map(|m| m.conversions).sum();
        let total_clicks: u64 = all.iter().filter_map(|m| m.clicks).sum();
        let total_impressions: u64 = all.iter().filter_map(|m| m.impressions).sum();
        let active = all
            .iter()
            .filter(|m| m.status == EntityStatus::Active)
            .count() as u64;

        let mut breakdown = Vec::new();
        for platform in Platform::all() {
            let on_platform: Vec<_> = all.iter().filter(|m| m.platform == platform).collect();
            if on_platform.is_empty() {
                continue;
            }
            let spend: f64 = on_platform.iter().map(|m| m.spend).sum();
            let revenue: f64 = on_platform.iter().map(|m| m.revenue).sum();
            breakdown.push(PlatformBreakdown {
                platform,
                spend,
                revenue,
                roas: if spend > 0.0 { revenue / spend } else { 0.0 },
                entities: on_platform.len() as u64,
            });
        }

        AccountOverview {
            total_spend,
            total_revenue,
            overall_roas: if total_spend > 0.0 {
                total_revenue / total_spend
            } else {
                0.0
            },
            total_conversions,
            total_clicks,
            total_impressions,
            tracked_entities: all.len() as u64,
            active_entities: active,
            platform_breakdown: breakdown,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::PerformanceSnapshot;
    use revoa_core::types::EntityKind;

    fn snapshot(id: &str, platform: Platform, spend: f64, revenue: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            entity_id: id.to_string(),
            entity_name: format!("Entity {id}"),
            platform,
            kind: EntityKind::Campaign,
            status: EntityStatus::Active,
            spend,
            revenue,
            conversions: 5,
            clicks: 50,
            impressions: 5_000,
            other_costs: None,
        }
    }

    #[test]
    fn test_overview_totals_and_breakdown() {
        let tracker = PerformanceTracker::new();
        tracker.record(snapshot("c1", Platform::Facebook, 100.0, 300.0));
        tracker.record(snapshot("c2", Platform::Facebook, 100.0, 100.0));
        tracker.record(snapshot("c3", Platform::Tiktok, 50.0, 200.0));

        let o = tracker.overview();
        assert!((o.total_spend - 250.0).abs() < f64::EPSILON);
        assert!((o.total_revenue - 600.0).abs() < f64::EPSILON);
        assert!((o.overall_roas - 2.4).abs() < f64::EPSILON);
        assert_eq!(o.tracked_entities, 3);
        assert_eq!(o.active_entities, 3);

        // Google has no entities and is skipped.
        assert_eq!(o.platform_breakdown.len(), 2);
        let facebook = o
            .platform_breakdown
            .iter()
            .find(|b| b.platform == Platform::Facebook)
            .unwrap();
        assert!((facebook.roas - 2.0).abs() < f64::EPSILON);
        assert_eq!(facebook.entities, 2);
    }

    #[test]
    fn test_overview_empty_account() {
        let tracker = PerformanceTracker::new();
        let o = tracker.overview();
        assert!((o.overall_roas).abs() < f64::EPSILON);
        assert!(o.platform_breakdown.is_empty());
    }
}
