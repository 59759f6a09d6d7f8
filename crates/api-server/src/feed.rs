//! In-memory suggestion feed — what the dashboard lists between syncs.

use chrono::Utc;
use dashmap::DashMap;
use revoa_core::types::EntityKind;
use revoa_insights::{classify, Suggestion};
use revoa_reporting::PerformanceTracker;
use uuid::Uuid;

/// Keeps generated suggestions until they expire or are dismissed.
pub struct SuggestionFeed {
    items: DashMap<Uuid, Suggestion>,
}

impl SuggestionFeed {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    pub fn insert(&self, suggestion: Suggestion) {
        self.items.insert(suggestion.id, suggestion);
    }

    /// Drop a suggestion the merchant dismissed. Returns `true` if found.
    pub fn dismiss(&self, id: &Uuid) -> bool {
        self.items.remove(id).is_some()
    }

    /// Live suggestions, highest priority first. Expired entries are
    /// pruned as a side effect.
    pub fn list(&self) -> Vec<Suggestion> {
        let now = Utc::now();
        self.items.retain(|_, s| s.expires_at > now);

        let mut live: Vec<Suggestion> = self.items.iter().map(|s| s.clone()).collect();
        live.sort_by(|a, b| b.priority.cmp(&a.priority));
        live
    }

    /// Re-run the classifier over every tracked entity against the account
    /// benchmarks and store whatever it produces. Returns the fresh batch.
    pub fn refresh_from(&self, tracker: &PerformanceTracker) -> Vec<Suggestion> {
        let benchmarks = tracker.benchmarks();
        let mut generated = Vec::new();
        for metrics in tracker.all_metrics() {
            let kind = tracker
                .kind_of(&metrics.entity_id)
                .unwrap_or(EntityKind::Campaign);
            if let Some(suggestion) = classify(&metrics, kind, &benchmarks) {
                self.insert(suggestion.clone());
                generated.push(suggestion);
            }
        }
        generated
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for SuggestionFeed {
    fn default() -> Self {
        Self::new()
    }
}
