//! Platform reporting clients — one per ad platform.
//! Each client translates the platform's reporting API rows into our
//! normalized row format.

use revoa_core::types::{EntityKind, EntityStatus, Platform};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Connection settings for one platform client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub access_token: String,
    pub api_version: String,
    pub page_size: u32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_version: "v1".to_string(),
            page_size: 500,
        }
    }
}

/// Normalized reporting row fetched from a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformRow {
    pub entity_id: String,
    pub entity_name: String,
    pub kind: EntityKind,
    pub status: EntityStatus,
    pub spend: f64,
    pub revenue: f64,
    pub conversions: u64,
    pub clicks: u64,
    pub impressions: u64,
    #[serde(default)]
    pub other_costs: Option<f64>,
}

/// One page of a paginated report pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPage {
    pub rows: Vec<PlatformRow>,
    pub next_cursor: Option<String>,
}

/// Trait for platform reporting clients.
pub trait PlatformConnector: Send + Sync {
    fn platform(&self) -> Platform;
    fn fetch_page(&self, account_id: &str, cursor: Option<&str>) -> anyhow::Result<ReportPage>;
}

// ─── Facebook (Meta Graph API) ──────────────────────────────────────────────

pub struct FacebookAdsClient {
    _config: ConnectorConfig,
}

impl FacebookAdsClient {
    pub fn new(config: ConnectorConfig) -> Self {
        Self { _config: config }
    }
}

impl PlatformConnector for FacebookAdsClient {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    fn fetch_page(&self, account_id: &str, cursor: Option<&str>) -> anyhow::Result<ReportPage> {
        debug!(
            platform = "facebook",
            account_id,
            cursor = cursor.unwrap_or("-"),
            "Fetching insights page"
        );

        // In production: HTTP GET against the Graph API insights endpoint,
        // following `paging.cursors.after`.
        Ok(ReportPage {
            rows: Vec::new(),
            next_cursor: None,
        })
    }
}

// ─── Google Ads ─────────────────────────────────────────────────────────────

pub struct GoogleAdsClient {
    _config: ConnectorConfig,
}

impl GoogleAdsClient {
    pub fn new(config: ConnectorConfig) -> Self {
        Self { _config: config }
    }
}

impl PlatformConnector for GoogleAdsClient {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    fn fetch_page(&self, account_id: &str, cursor: Option<&str>) -> anyhow::Result<ReportPage> {
        debug!(
            platform = "google",
            account_id,
            cursor = cursor.unwrap_or("-"),
            "Fetching report page"
        );

        // In production: searchStream GAQL query with a page token.
        Ok(ReportPage {
            rows: Vec::new(),
            next_cursor: None,
        })
    }
}

// ─── TikTok Ads ─────────────────────────────────────────────────────────────

pub struct TiktokAdsClient {
    _config: ConnectorConfig,
}

impl TiktokAdsClient {
    pub fn new(config: ConnectorConfig) -> Self {
        Self { _config: config }
    }
}

impl PlatformConnector for TiktokAdsClient {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    fn fetch_page(&self, account_id: &str, cursor: Option<&str>) -> anyhow::Result<ReportPage> {
        debug!(
            platform = "tiktok",
            account_id,
            cursor = cursor.unwrap_or("-"),
            "Fetching report page"
        );

        // In production: POST to the reporting integrated endpoint with a
        // page number in the body.
        Ok(ReportPage {
            rows: Vec::new(),
            next_cursor: None,
        })
    }
}
