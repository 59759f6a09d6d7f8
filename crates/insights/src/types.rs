//! Output records produced by the suggestion generators.

use chrono::{DateTime, Utc};
use revoa_core::types::{EntityKind, EntityMetrics, Platform};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Situation a performance snapshot was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationKind {
    /// Strong ROAS with meaningful spend; worth scaling up.
    ScaleHighPerformer,
    /// Spending at a loss; stop-loss pause.
    PauseUnderperforming,
    /// Well below the account baseline; pull budget back.
    ReallocateBudget,
    /// Confirmed negative profit at meaningful spend.
    NegativeRoi,
    /// Acquisition cost far above the account baseline.
    HighCpa,
    /// Click-through rate far below the account baseline.
    LowCtr,
    /// Decent but not great; room to optimize.
    OptimizeModerate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactConfidence {
    Low,
    Medium,
    High,
}

/// Metric an automation rule condition watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMetric {
    Roas,
    Spend,
    Profit,
    Cpa,
    Ctr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleComparison {
    Below,
    Above,
}

/// Threshold condition for an automation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCondition {
    pub metric: RuleMetric,
    pub comparison: RuleComparison,
    pub threshold: f64,
}

/// Action an automation rule takes when its condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    PauseEntity,
    AdjustBudget { percent: f64 },
    FlagForReview,
}

/// Automation rule proposed alongside a suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationProposal {
    pub name: String,
    pub description: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
    pub check_frequency_hours: u32,
    pub requires_approval: bool,
}

/// Projected dollar effect of acting on a suggestion.
///
/// Linear extrapolation from the current snapshot; signs are deltas
/// against doing nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatedImpact {
    pub projected_spend_change: f64,
    pub projected_revenue_change: f64,
    pub projected_profit_change: f64,
    pub confidence: ImpactConfidence,
}

/// Point-in-time copy of the metrics that produced a suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub spend: f64,
    pub revenue: f64,
    pub roas: f64,
    pub conversions: u64,
    pub profit: Option<f64>,
    pub cpa: Option<f64>,
    pub ctr: Option<f64>,
}

impl MetricsSnapshot {
    pub fn from_metrics(m: &EntityMetrics) -> Self {
        Self {
            spend: m.spend,
            revenue: m.revenue,
            roas: m.roas,
            conversions: m.conversions,
            profit: m.profit,
            cpa: m.cpa,
            ctr: m.ctr,
        }
    }
}

/// Structured rationale attached to a suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reasoning {
    /// Human-readable renditions of the threshold checks that fired.
    pub triggers: Vec<String>,
    pub risk_level: RiskLevel,
    pub urgency: Urgency,
    pub snapshot: MetricsSnapshot,
    pub analysis: String,
}

/// One recommended action for one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub entity_id: String,
    pub entity_kind: EntityKind,
    pub platform: Platform,
    pub kind: SituationKind,
    pub title: String,
    pub message: String,
    /// Fixed per-classification ranking weight, 50–95.
    pub priority: u8,
    /// Fixed per-classification confidence score, 60–90.
    pub confidence: u8,
    pub reasoning: Reasoning,
    pub automation: Option<AutomationProposal>,
    pub estimated_impact: Option<EstimatedImpact>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Check performed by the proactive analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RexCheck {
    NegativeRoi,
    ScaleOpportunity,
    CreativeFatigue,
    Underperformance,
    LowConversionRate,
}

/// Persistence-shaped draft produced by the proactive analyzer.
///
/// Unlike [`Suggestion`], several drafts can be emitted for the same
/// entity in one pass; the caller decides what to store and surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RexSuggestionDraft {
    pub entity_id: String,
    pub entity_kind: EntityKind,
    pub platform: Platform,
    pub check: RexCheck,
    pub headline: String,
    pub body: String,
    pub urgency: Urgency,
    pub priority: u8,
    pub snapshot: MetricsSnapshot,
    pub expires_at: DateTime<Utc>,
}
