use serde::{Deserialize, Serialize};

/// Advertising platform an entity lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Google,
    Tiktok,
}

impl Platform {
    /// Display name used in merchant-facing text.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Google => "Google",
            Platform::Tiktok => "TikTok",
        }
    }

    pub fn all() -> [Platform; 3] {
        [Platform::Facebook, Platform::Google, Platform::Tiktok]
    }
}

/// Level of the platform's advertising hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Campaign,
    AdSet,
    Ad,
}

impl EntityKind {
    /// Display name used in merchant-facing text.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaign",
            EntityKind::AdSet => "ad set",
            EntityKind::Ad => "ad",
        }
    }
}

/// Lifecycle status reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Active,
    Paused,
    Archived,
}

/// Performance snapshot for a single advertising entity.
///
/// Supplied wholesale by the caller. `roas` is the caller-derived
/// revenue/spend ratio; the optional fields simply disable the analysis
/// branches that depend on them when absent. CTR is a percentage
/// (clicks/impressions * 100), CPA a dollar amount per conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub entity_id: String,
    pub entity_name: String,
    pub platform: Platform,
    pub status: EntityStatus,
    pub spend: f64,
    pub revenue: f64,
    pub roas: f64,
    pub conversions: u64,
    #[serde(default)]
    pub profit: Option<f64>,
    #[serde(default)]
    pub cpa: Option<f64>,
    #[serde(default)]
    pub ctr: Option<f64>,
    #[serde(default)]
    pub impressions: Option<u64>,
    #[serde(default)]
    pub clicks: Option<u64>,
}

/// Account-level comparison baselines.
///
/// `avg_roas` is always present; the other baselines are optional and
/// gate the analysis branches that compare against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBenchmarks {
    pub avg_roas: f64,
    #[serde(default)]
    pub avg_cpa: Option<f64>,
    #[serde(default)]
    pub avg_ctr: Option<f64>,
    #[serde(default)]
    pub target_profit_margin: Option<f64>,
}

impl Default for AccountBenchmarks {
    fn default() -> Self {
        Self {
            avg_roas: 0.0,
            avg_cpa: None,
            avg_ctr: None,
            target_profit_margin: None,
        }
    }
}
