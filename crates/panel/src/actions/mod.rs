//! Relation actions module
//!
//! Provides the orchestrator that adds and removes relations between the
//! open mail and CRM records.

mod orchestrator;

pub use orchestrator::{MutationOutcome, RelationOrchestrator};
