//! Automation rule engine — adopts proposals from the suggestion
//! generators, gates risky ones behind approval, and evaluates conditions
//! against fresh metrics on each rule's cadence.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use revoa_core::error::{RevoaError, RevoaResult};
use revoa_core::types::EntityMetrics;
use revoa_insights::types::{AutomationProposal, RuleAction, RuleCondition};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::condition;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    PendingApproval,
    Active,
    Disabled,
}

/// A registered automation rule watching one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: Uuid,
    pub entity_id: String,
    pub name: String,
    pub description: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
    pub check_frequency_hours: u32,
    pub requires_approval: bool,
    pub status: RuleStatus,
    pub created_at: DateTime<Utc>,
    pub last_evaluated_at: Option<DateTime<Utc>>,
    pub times_triggered: u64,
}

/// One firing of a rule's condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTrigger {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub entity_id: String,
    pub action: RuleAction,
    pub observed_value: f64,
    pub threshold: f64,
    pub triggered_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// AutomationEngine
// ---------------------------------------------------------------------------

pub struct AutomationEngine {
    rules: DashMap<Uuid, AutomationRule>,
    triggers: DashMap<Uuid, Vec<RuleTrigger>>,
}

impl AutomationEngine {
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
            triggers: DashMap::new(),
        }
    }

    /// Register a generator proposal as a rule. Proposals flagged
    /// `requires_approval` start pending and never evaluate until approved.
    pub fn adopt(&self, entity_id: &str, proposal: AutomationProposal) -> AutomationRule {
        let status = if proposal.requires_approval {
            RuleStatus::PendingApproval
        } else {
            RuleStatus::Active
        };

        let rule = AutomationRule {
            id: Uuid::new_v4(),
            entity_id: entity_id.to_string(),
            name: proposal.name,
            description: proposal.description,
            condition: proposal.condition,
            action: proposal.action,
            check_frequency_hours: proposal.check_frequency_hours,
            requires_approval: proposal.requires_approval,
            status,
            created_at: Utc::now(),
            last_evaluated_at: None,
            times_triggered: 0,
        };

        info!(
            rule_id = %rule.id,
            entity_id = %rule.entity_id,
            status = ?rule.status,
            "Automation rule adopted"
        );

        self.rules.insert(rule.id, rule.clone());
        rule
    }

    /// Activate a pending rule.
    pub fn approve(&self, rule_id: &Uuid) -> RevoaResult<()> {
        let mut rule = self
            .rules
            .get_mut(rule_id)
            .ok_or_else(|| RevoaError::UnknownRule(rule_id.to_string()))?;
        match rule.status {
            RuleStatus::PendingApproval => {
                rule.status = RuleStatus::Active;
                info!(rule_id = %rule_id, "Automation rule approved");
                Ok(())
            }
            _ => Err(RevoaError::Automation(format!(
                "rule {} is not awaiting approval",
                rule_id
            ))),
        }
    }

    /// Disable a rule. Disabled rules are kept for their history.
    pub fn disable(&self, rule_id: &Uuid) -> RevoaResult<()> {
        let mut rule = self
            .rules
            .get_mut(rule_id)
            .ok_or_else(|| RevoaError::UnknownRule(rule_id.to_string()))?;
        rule.status = RuleStatus::Disabled;
        Ok(())
    }

    pub fn get(&self, rule_id: &Uuid) -> Option<AutomationRule> {
        self.rules.get(rule_id).map(|r| r.clone())
    }

    pub fn list(&self) -> Vec<AutomationRule> {
        let mut rules: Vec<AutomationRule> = self.rules.iter().map(|r| r.clone()).collect();
        rules.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rules
    }

    pub fn rules_for(&self, entity_id: &str) -> Vec<AutomationRule> {
        self.rules
            .iter()
            .filter(|r| r.entity_id == entity_id)
            .map(|r| r.clone())
            .collect()
    }

    /// Evaluate every active rule watching this entity against a fresh
    /// snapshot. Rules outside their check cadence are skipped; rules whose
    /// watched metric is missing from the snapshot are skipped for this
    /// pass. Returns the triggers that fired.
    pub fn evaluate(&self, metrics: &EntityMetrics) -> Vec<RuleTrigger> {
        let now = Utc::now();
        let mut fired = Vec::new();

        for mut entry in self.rules.iter_mut() {
            let rule = entry.value_mut();
            if rule.entity_id != metrics.entity_id || rule.status != RuleStatus::Active {
                continue;
            }
            if let Some(last) = rule.last_evaluated_at {
                if now - last < Duration::hours(rule.check_frequency_hours as i64) {
                    continue;
                }
            }
            rule.last_evaluated_at = Some(now);

            let Some(value) = condition::metric_value(metrics, rule.condition.metric) else {
                continue;
            };
            if !condition::condition_met(&rule.condition, value) {
                continue;
            }

            rule.times_triggered += 1;
            let trigger = RuleTrigger {
                id: Uuid::new_v4(),
                rule_id: rule.id,
                entity_id: rule.entity_id.clone(),
                action: rule.action.clone(),
                observed_value: value,
                threshold: rule.condition.threshold,
                triggered_at: now,
            };

            info!(
                rule_id = %rule.id,
                entity_id = %rule.entity_id,
                observed = value,
                threshold = rule.condition.threshold,
                "Automation rule triggered"
            );

            self.triggers
                .entry(rule.id)
                .or_default()
                .push(trigger.clone());
            fired.push(trigger);
        }

        fired
    }

    /// Trigger history for one rule, most recent first.
    pub fn trigger_log(&self, rule_id: &Uuid) -> Vec<RuleTrigger> {
        let mut log = self
            .triggers
            .get(rule_id)
            .map(|t| t.clone())
            .unwrap_or_default();
        log.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        log
    }
}

impl Default for AutomationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
