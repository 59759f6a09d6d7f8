//! REST API handlers for insight generation and operational endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use revoa_automation::{AutomationEngine, AutomationRule, RuleTrigger};
use revoa_core::error::RevoaError;
use revoa_core::types::{AccountBenchmarks, EntityKind, EntityMetrics, Platform};
use revoa_insights::types::{AutomationProposal, RexSuggestionDraft, Suggestion};
use revoa_reporting::{AccountOverview, PerformanceTracker};
use revoa_sync::{SyncReport, SyncService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use uuid::Uuid;

use crate::feed::SuggestionFeed;

/// Maximum string field length (entity IDs, names).
const MAX_FIELD_LEN: usize = 256;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<PerformanceTracker>,
    pub automations: Arc<AutomationEngine>,
    pub sync: Arc<SyncService>,
    pub feed: Arc<SuggestionFeed>,
    pub account_id: String,
    pub node_id: String,
    pub start_time: Instant,
}

/// Body for the analyze and proactive endpoints.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub metrics: EntityMetrics,
    pub entity_kind: EntityKind,
    /// Omit to analyze against the account's tracked benchmarks.
    #[serde(default)]
    pub benchmarks: Option<AccountBenchmarks>,
}

/// Validate an analyze request at the API boundary.
fn validate_analyze_request(request: &AnalyzeRequest) -> Result<(), &'static str> {
    let m = &request.metrics;
    if m.entity_id.is_empty() {
        return Err("metrics 'entity_id' must not be empty");
    }
    if m.entity_id.len() > MAX_FIELD_LEN || m.entity_name.len() > MAX_FIELD_LEN {
        return Err("metrics identity fields exceed maximum length");
    }
    if !m.spend.is_finite() || m.spend < 0.0 {
        return Err("metrics 'spend' must be a non-negative number");
    }
    if !m.revenue.is_finite() || m.revenue < 0.0 {
        return Err("metrics 'revenue' must be a non-negative number");
    }
    if !m.roas.is_finite() || m.roas < 0.0 {
        return Err("metrics 'roas' must be a non-negative number");
    }
    Ok(())
}

fn bad_request(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_request".to_string(),
            message: msg.to_string(),
        }),
    )
}

/// POST /v1/insights/analyze — classify one entity snapshot.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    if let Err(msg) = validate_analyze_request(&request) {
        warn!(entity_id = %request.metrics.entity_id, error = msg, "Analyze validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        return Err(bad_request(msg));
    }

    let benchmarks = request
        .benchmarks
        .unwrap_or_else(|| state.tracker.benchmarks());

    match revoa_insights::classify(&request.metrics, request.entity_kind, &benchmarks) {
        Some(suggestion) => {
            metrics::counter!("api.suggestions_generated").increment(1);
            state.feed.insert(suggestion.clone());
            Ok((StatusCode::OK, Json(suggestion)).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// POST /v1/insights/proactive — run every proactive check on one snapshot.
pub async fn handle_proactive(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Vec<RexSuggestionDraft>>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(msg) = validate_analyze_request(&request) {
        warn!(entity_id = %request.metrics.entity_id, error = msg, "Proactive validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        return Err(bad_request(msg));
    }

    let benchmarks = request
        .benchmarks
        .unwrap_or_else(|| state.tracker.benchmarks());

    let drafts = revoa_insights::analyze(&request.metrics, request.entity_kind, &benchmarks);
    metrics::counter!("api.proactive_drafts").increment(drafts.len() as u64);
    Ok(Json(drafts))
}

/// POST /v1/insights/scan — classify every tracked entity against the
/// account benchmarks and refresh the feed.
pub async fn handle_scan(State(state): State<AppState>) -> Json<Vec<Suggestion>> {
    let generated = state.feed.refresh_from(&state.tracker);
    metrics::counter!("api.suggestions_generated").increment(generated.len() as u64);
    Json(generated)
}

/// GET /v1/suggestions — live suggestion feed, highest priority first.
pub async fn handle_suggestions(State(state): State<AppState>) -> Json<Vec<Suggestion>> {
    Json(state.feed.list())
}

/// DELETE /v1/suggestions/:id — dismiss one suggestion.
pub async fn handle_dismiss_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.feed.dismiss(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// POST /v1/entities/:entity_id/automations — adopt a proposal as a rule.
pub async fn handle_adopt_rule(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
    Json(proposal): Json<AutomationProposal>,
) -> Result<(StatusCode, Json<AutomationRule>), (StatusCode, Json<ErrorResponse>)> {
    if entity_id.is_empty() || entity_id.len() > MAX_FIELD_LEN {
        return Err(bad_request("invalid entity id"));
    }
    let rule = state.automations.adopt(&entity_id, proposal);
    metrics::counter!("api.rules_adopted").increment(1);
    Ok((StatusCode::CREATED, Json(rule)))
}

/// POST /v1/automations/:id/approve — activate a pending rule.
pub async fn handle_approve_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AutomationRule>, (StatusCode, Json<ErrorResponse>)> {
    match state.automations.approve(&id) {
        Ok(()) => {
            // Just approved, so the rule exists.
            let rule = state.automations.get(&id).ok_or_else(|| {
                internal_error("rule disappeared during approval")
            })?;
            Ok(Json(rule))
        }
        Err(RevoaError::UnknownRule(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "rule_not_found".to_string(),
                message: format!("no automation rule {}", id),
            }),
        )),
        Err(e) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "rule_not_pending".to_string(),
                message: e.to_string(),
            }),
        )),
    }
}

/// GET /v1/automations — every registered rule, newest first.
pub async fn handle_list_rules(State(state): State<AppState>) -> Json<Vec<AutomationRule>> {
    Json(state.automations.list())
}

/// POST /v1/automations/evaluate — run active rules against tracked metrics.
pub async fn handle_evaluate_rules(State(state): State<AppState>) -> Json<Vec<RuleTrigger>> {
    let mut fired = Vec::new();
    for metrics in state.tracker.all_metrics() {
        fired.extend(state.automations.evaluate(&metrics));
    }
    metrics::counter!("api.rules_triggered").increment(fired.len() as u64);
    Json(fired)
}

/// GET /v1/overview — account-level aggregates.
pub async fn handle_overview(State(state): State<AppState>) -> Json<AccountOverview> {
    Json(state.tracker.overview())
}

/// POST /v1/sync/:platform — pull one platform's report now.
pub async fn handle_sync(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<Json<SyncReport>, (StatusCode, Json<ErrorResponse>)> {
    let Some(platform) = parse_platform(&platform) else {
        return Err(bad_request("unknown platform; expected facebook, google, or tiktok"));
    };

    match state.sync.sync_platform(platform, &state.account_id) {
        Ok(report) => {
            metrics::counter!("api.syncs_run").increment(1);
            Ok(Json(report))
        }
        Err(e) => {
            error!(error = %e, platform = ?platform, "Platform sync failed");
            metrics::counter!("api.errors").increment(1);
            Err(internal_error("platform sync failed"))
        }
    }
}

pub(crate) fn parse_platform(raw: &str) -> Option<Platform> {
    match raw {
        "facebook" => Some(Platform::Facebook),
        "google" => Some(Platform::Google),
        "tiktok" => Some(Platform::Tiktok),
        _ => None,
    }
}

fn internal_error(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal_error".to_string(),
            message: msg.to_string(),
        }),
    )
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use revoa_core::types::EntityStatus;

    fn request(spend: f64) -> AnalyzeRequest {
        AnalyzeRequest {
            metrics: EntityMetrics {
                entity_id: "c1".to_string(),
                entity_name: "Test".to_string(),
                platform: Platform::Facebook,
                status: EntityStatus::Active,
                spend,
                revenue: 100.0,
                roas: 2.0,
                conversions: 4,
                profit: None,
                cpa: None,
                ctr: None,
                impressions: None,
                clicks: None,
            },
            entity_kind: EntityKind::Campaign,
            benchmarks: None,
        }
    }

    #[test]
    fn test_validate_accepts_normal_request() {
        assert!(validate_analyze_request(&request(50.0)).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_entity_id() {
        let mut r = request(50.0);
        r.metrics.entity_id.clear();
        assert!(validate_analyze_request(&r).is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_numbers() {
        let mut r = request(50.0);
        r.metrics.roas = f64::NAN;
        assert!(validate_analyze_request(&r).is_err());

        let mut r = request(f64::INFINITY);
        r.metrics.roas = 2.0;
        assert!(validate_analyze_request(&r).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_spend() {
        assert!(validate_analyze_request(&request(-1.0)).is_err());
    }

    #[test]
    fn test_parse_platform() {
        assert_eq!(parse_platform("facebook"), Some(Platform::Facebook));
        assert_eq!(parse_platform("google"), Some(Platform::Google));
        assert_eq!(parse_platform("tiktok"), Some(Platform::Tiktok));
        assert_eq!(parse_platform("snapchat"), None);
    }
}
