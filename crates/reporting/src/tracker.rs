//! Per-entity performance tracking, derived metrics, and account benchmarks.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use revoa_core::types::{
    AccountBenchmarks, EntityKind, EntityMetrics, EntityStatus, Platform,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Raw reporting row for one entity over one reporting window.
/// Counters are deltas for the window and accumulate in the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub entity_id: String,
    pub entity_name: String,
    pub platform: Platform,
    pub kind: EntityKind,
    pub status: EntityStatus,
    pub spend: f64,
    pub revenue: f64,
    pub conversions: u64,
    pub clicks: u64,
    pub impressions: u64,
    /// Costs beyond ad spend (goods, fees) when the platform reports them;
    /// enables net-profit derivation.
    #[serde(default)]
    pub other_costs: Option<f64>,
}

/// Whether a recorded snapshot created a new entity or updated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
struct TrackedEntity {
    entity_name: String,
    platform: Platform,
    kind: EntityKind,
    status: EntityStatus,
    spend: f64,
    revenue: f64,
    conversions: u64,
    clicks: u64,
    impressions: u64,
    other_costs: Option<f64>,
    updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// PerformanceTracker
// ---------------------------------------------------------------------------

/// Concurrent per-entity performance store backed by `DashMap`.
pub struct PerformanceTracker {
    entities: DashMap<String, TrackedEntity>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
        }
    }

    /// Record one reporting row, accumulating counters and refreshing the
    /// entity's name and status.
    pub fn record(&self, snapshot: PerformanceSnapshot) -> RecordOutcome {
        let now = Utc::now();
        match self.entities.get_mut(&snapshot.entity_id) {
            Some(mut entry) => {
                let e = entry.value_mut();
                e.entity_name = snapshot.entity_name;
                e.status = snapshot.status;
                e.spend += snapshot.spend;
                e.revenue += snapshot.revenue;
                e.conversions += snapshot.conversions;
                e.clicks += snapshot.clicks;
                e.impressions += snapshot.impressions;
                if let Some(costs) = snapshot.other_costs {
                    e.other_costs = Some(e.other_costs.unwrap_or(0.0) + costs);
                }
                e.updated_at = now;
                RecordOutcome::Updated
            }
            None => {
                self.entities.insert(
                    snapshot.entity_id.clone(),
                    TrackedEntity {
                        entity_name: snapshot.entity_name,
                        platform: snapshot.platform,
                        kind: snapshot.kind,
                        status: snapshot.status,
                        spend: snapshot.spend,
                        revenue: snapshot.revenue,
                        conversions: snapshot.conversions,
                        clicks: snapshot.clicks,
                        impressions: snapshot.impressions,
                        other_costs: snapshot.other_costs,
                        updated_at: now,
                    },
                );
                RecordOutcome::Created
            }
        }
    }

    /// Derived metrics for one entity, if tracked. Rates guard their
    /// denominators: zero spend yields a 0.0 ROAS, zero conversions or
    /// impressions leave CPA/CTR unset.
    pub fn metrics_for(&self, entity_id: &str) -> Option<EntityMetrics> {
        let entry = self.entities.get(entity_id)?;
        Some(derive_metrics(entity_id, entry.value()))
    }

    /// Derived metrics for every tracked entity.
    pub fn all_metrics(&self) -> Vec<EntityMetrics> {
        self.entities
            .iter()
            .map(|e| derive_metrics(e.key(), e.value()))
            .collect()
    }

    /// The hierarchy level an entity was reported at.
    pub fn kind_of(&self, entity_id: &str) -> Option<EntityKind> {
        self.entities.get(entity_id).map(|e| e.value().kind)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Account-level baselines averaged across tracked entities. Entities
    /// without spend contribute nothing; CPA and CTR average only over the
    /// entities where they can be derived.
    pub fn benchmarks(&self) -> AccountBenchmarks {
        let all = self.all_metrics();

        let spenders: Vec<&EntityMetrics> = all.iter().filter(|m| m.spend > 0.0).collect();
        let avg_roas = if spenders.is_empty() {
            0.0
        } else {
            spenders.iter().map(|m| m.roas).sum::<f64>() / spenders.len() as f64
        };

        let cpas: Vec<f64> = all.iter().filter_map(|m| m.cpa).collect();
        let avg_cpa = if cpas.is_empty() {
            None
        } else {
            Some(cpas.iter().sum::<f64>() / cpas.len() as f64)
        };

        let ctrs: Vec<f64> = all.iter().filter_map(|m| m.ctr).collect();
        let avg_ctr = if ctrs.is_empty() {
            None
        } else {
            Some(ctrs.iter().sum::<f64>() / ctrs.len() as f64)
        };

        AccountBenchmarks {
            avg_roas,
            avg_cpa,
            avg_ctr,
            target_profit_margin: None,
        }
    }
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_metrics(entity_id: &str, e: &TrackedEntity) -> EntityMetrics {
    let roas = if e.spend > 0.0 {
        e.revenue / e.spend
    } else {
        0.0
    };
    let cpa = if e.conversions > 0 {
        Some(e.spend / e.conversions as f64)
    } else {
        None
    };
    let ctr = if e.impressions > 0 {
        Some(e.clicks as f64 / e.impressions as f64 * 100.0)
    } else {
        None
    };
    let profit = e.other_costs.map(|costs| e.revenue - e.spend - costs);

    EntityMetrics {
        entity_id: entity_id.to_string(),
        entity_name: e.entity_name.clone(),
        platform: e.platform,
        status: e.status,
        spend: e.spend,
        revenue: e.revenue,
        roas,
        conversions: e.conversions,
        profit,
        cpa,
        ctr,
        impressions: Some(e.impressions),
        clicks: Some(e.clicks),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
