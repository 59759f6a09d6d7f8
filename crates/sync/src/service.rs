//! Connector registry — one client per platform, shared sync entry point.

use std::sync::Arc;

use revoa_core::error::{RevoaError, RevoaResult};
use revoa_core::types::Platform;
use revoa_reporting::PerformanceTracker;

use crate::clients::{
    ConnectorConfig, FacebookAdsClient, GoogleAdsClient, PlatformConnector, TiktokAdsClient,
};
use crate::runner::{SyncReport, SyncRunner};

/// Holds a connector for every supported platform and the shared runner.
pub struct SyncService {
    runner: SyncRunner,
    connectors: Vec<Box<dyn PlatformConnector>>,
}

impl SyncService {
    /// Build the default registry with one client per platform.
    pub fn new(tracker: Arc<PerformanceTracker>, config: ConnectorConfig) -> Self {
        let connectors: Vec<Box<dyn PlatformConnector>> = vec![
            Box::new(FacebookAdsClient::new(config.clone())),
            Box::new(GoogleAdsClient::new(config.clone())),
            Box::new(TiktokAdsClient::new(config)),
        ];
        Self {
            runner: SyncRunner::new(tracker),
            connectors,
        }
    }

    /// Pull one platform's report for an account.
    pub fn sync_platform(&self, platform: Platform, account_id: &str) -> RevoaResult<SyncReport> {
        let connector = self
            .connectors
            .iter()
            .find(|c| c.platform() == platform)
            .ok_or_else(|| {
                RevoaError::Sync(format!("no connector registered for {:?}", platform))
            })?;
        self.runner.run(connector.as_ref(), account_id)
    }

    /// Pull every registered platform in turn. Individual platform failures
    /// are returned in place so one bad platform doesn't hide the others.
    pub fn sync_all(&self, account_id: &str) -> Vec<RevoaResult<SyncReport>> {
        self.connectors
            .iter()
            .map(|c| self.runner.run(c.as_ref(), account_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_platform() {
        let tracker = Arc::new(PerformanceTracker::new());
        let service = SyncService::new(tracker, ConnectorConfig::default());

        for platform in Platform::all() {
            let report = service.sync_platform(platform, "acct-1").unwrap();
            assert_eq!(report.platform, platform);
        }
    }

    #[test]
    fn test_sync_all_returns_one_report_per_platform() {
        let tracker = Arc::new(PerformanceTracker::new());
        let service = SyncService::new(tracker, ConnectorConfig::default());
        let reports = service.sync_all("acct-1");
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.is_ok()));
    }
}
