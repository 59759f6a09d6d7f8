//! Paginated fetch-and-upsert sync loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use revoa_core::error::{RevoaError, RevoaResult};
use revoa_core::types::Platform;
use revoa_reporting::{PerformanceSnapshot, PerformanceTracker, RecordOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{PlatformConnector, PlatformRow};

/// Upper bound on pages per pull; a cursor that never terminates is a
/// platform bug we refuse to follow forever.
const MAX_PAGES: u32 = 1_000;

/// A row that could not be ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncIssue {
    pub entity_id: Option<String>,
    pub error: String,
}

/// Outcome of one platform pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub id: Uuid,
    pub platform: Platform,
    pub account_id: String,
    pub records_processed: u64,
    pub records_created: u64,
    pub records_updated: u64,
    pub records_failed: u64,
    pub issues: Vec<SyncIssue>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Runs report pulls against a connector and upserts rows into the tracker.
pub struct SyncRunner {
    tracker: Arc<PerformanceTracker>,
}

impl SyncRunner {
    pub fn new(tracker: Arc<PerformanceTracker>) -> Self {
        Self { tracker }
    }

    /// Pull every report page for one account and record the rows.
    pub fn run(
        &self,
        connector: &dyn PlatformConnector,
        account_id: &str,
    ) -> RevoaResult<SyncReport> {
        let started = Utc::now();
        let platform = connector.platform();
        info!(platform = ?platform, account_id, "Starting platform sync");

        let mut processed = 0u64;
        let mut created = 0u64;
        let mut updated = 0u64;
        let mut failed = 0u64;
        let mut issues = Vec::new();

        let mut cursor: Option<String> = None;
        let mut pages = 0u32;
        loop {
            let page = connector
                .fetch_page(account_id, cursor.as_deref())
                .map_err(|e| RevoaError::Sync(e.to_string()))?;

            for row in page.rows {
                processed += 1;
                if let Err(error) = validate_row(&row) {
                    failed += 1;
                    issues.push(SyncIssue {
                        entity_id: Some(row.entity_id.clone()),
                        error: error.to_string(),
                    });
                    continue;
                }
                match self.tracker.record(to_snapshot(platform, row)) {
                    RecordOutcome::Created => created += 1,
                    RecordOutcome::Updated => updated += 1,
                }
            }

            pages += 1;
            match page.next_cursor {
                Some(next) if pages < MAX_PAGES => cursor = Some(next),
                Some(_) => {
                    warn!(platform = ?platform, pages, "Page limit reached, truncating sync");
                    issues.push(SyncIssue {
                        entity_id: None,
                        error: format!("pagination truncated after {} pages", pages),
                    });
                    break;
                }
                None => break,
            }
        }

        let completed = Utc::now();
        let report = SyncReport {
            id: Uuid::new_v4(),
            platform,
            account_id: account_id.to_string(),
            records_processed: processed,
            records_created: created,
            records_updated: updated,
            records_failed: failed,
            issues,
            started_at: started,
            completed_at: completed,
            duration_ms: (completed - started).num_milliseconds().max(0) as u64,
        };

        info!(
            platform = ?platform,
            processed = report.records_processed,
            created = report.records_created,
            updated = report.records_updated,
            failed = report.records_failed,
            "Platform sync finished"
        );

        Ok(report)
    }
}

fn validate_row(row: &PlatformRow) -> Result<(), &'static str> {
    if row.entity_id.is_empty() {
        return Err("row 'entity_id' must not be empty");
    }
    if row.spend < 0.0 {
        return Err("row 'spend' must be non-negative");
    }
    if row.revenue < 0.0 {
        return Err("row 'revenue' must be non-negative");
    }
    if row.clicks > row.impressions {
        return Err("row reports more clicks than impressions");
    }
    Ok(())
}

fn to_snapshot(platform: Platform, row: PlatformRow) -> PerformanceSnapshot {
    PerformanceSnapshot {
        entity_id: row.entity_id,
        entity_name: row.entity_name,
        platform,
        kind: row.kind,
        status: row.status,
        spend: row.spend,
        revenue: row.revenue,
        conversions: row.conversions,
        clicks: row.clicks,
        impressions: row.impressions,
        other_costs: row.other_costs,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ReportPage;
    use revoa_core::types::{EntityKind, EntityStatus};

    fn row(id: &str, spend: f64) -> PlatformRow {
        PlatformRow {
            entity_id: id.to_string(),
            entity_name: format!("Entity {id}"),
            kind: EntityKind::Campaign,
            status: EntityStatus::Active,
            spend,
            revenue: spend * 2.0,
            conversions: 3,
            clicks: 30,
            impressions: 3_000,
            other_costs: None,
        }
    }

    /// Serves a fixed list of pages; the cursor is the next page index.
    struct MockConnector {
        pages: Vec<ReportPage>,
    }

    impl MockConnector {
        fn paged(rows: Vec<Vec<PlatformRow>>) -> Self {
            let last = rows.len().saturating_sub(1);
            let pages = rows
                .into_iter()
                .enumerate()
                .map(|(i, rows)| ReportPage {
                    rows,
                    next_cursor: if i < last {
                        Some((i + 1).to_string())
                    } else {
                        None
                    },
                })
                .collect();
            Self { pages }
        }
    }

    impl PlatformConnector for MockConnector {
        fn platform(&self) -> Platform {
            Platform::Google
        }

        fn fetch_page(
            &self,
            _account_id: &str,
            cursor: Option<&str>,
        ) -> anyhow::Result<ReportPage> {
            let index: usize = cursor.map(|c| c.parse()).transpose()?.unwrap_or(0);
            self.pages
                .get(index)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no page {index}"))
        }
    }

    // 1. Pagination and upsert counts ----------------------------------------

    #[test]
    fn test_sync_walks_all_pages() {
        let tracker = Arc::new(PerformanceTracker::new());
        let runner = SyncRunner::new(tracker.clone());
        let connector = MockConnector::paged(vec![
            vec![row("c1", 100.0), row("c2", 50.0)],
            vec![row("c3", 25.0), row("c1", 10.0)], // c1 repeats -> update
        ]);

        let report = runner.run(&connector, "acct-1").unwrap();
        assert_eq!(report.records_processed, 4);
        assert_eq!(report.records_created, 3);
        assert_eq!(report.records_updated, 1);
        assert_eq!(report.records_failed, 0);
        assert_eq!(tracker.entity_count(), 3);

        // The repeated row accumulated.
        let c1 = tracker.metrics_for("c1").unwrap();
        assert!((c1.spend - 110.0).abs() < f64::EPSILON);
    }

    // 2. Row validation -----------------------------------------------------

    #[test]
    fn test_invalid_rows_are_counted_not_fatal() {
        let tracker = Arc::new(PerformanceTracker::new());
        let runner = SyncRunner::new(tracker.clone());

        let mut bad = row("c2", 50.0);
        bad.spend = -1.0;
        let connector = MockConnector::paged(vec![vec![row("c1", 100.0), bad]]);

        let report = runner.run(&connector, "acct-1").unwrap();
        assert_eq!(report.records_processed, 2);
        assert_eq!(report.records_created, 1);
        assert_eq!(report.records_failed, 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].entity_id.as_deref(), Some("c2"));
        assert!(tracker.metrics_for("c2").is_none());
    }

    #[test]
    fn test_empty_pull_reports_zero() {
        let tracker = Arc::new(PerformanceTracker::new());
        let runner = SyncRunner::new(tracker);
        let connector = MockConnector::paged(vec![vec![]]);

        let report = runner.run(&connector, "acct-1").unwrap();
        assert_eq!(report.records_processed, 0);
        assert_eq!(report.platform, Platform::Google);
    }
}
