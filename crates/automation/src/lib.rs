//! Automation rules — adoption, approval gating, and cadence-driven
//! evaluation of the rules proposed by the suggestion generators.

pub mod condition;
pub mod engine;

pub use engine::{AutomationEngine, AutomationRule, RuleStatus, RuleTrigger};
