//! Performance insight generation — classifies entity-level ad metrics
//! into actionable suggestions and proactive merchant-voiced drafts.

pub mod classifier;
pub mod format;
pub mod rex;
pub mod types;

pub use classifier::classify;
pub use rex::analyze;
pub use types::{
    AutomationProposal, EstimatedImpact, RexSuggestionDraft, SituationKind, Suggestion,
};
