//! Error types for the propagation engine.

use thiserror::Error;

/// Errors raised while building a graph or propagating state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
  /// A state outside the graph's declared set was supplied. Nothing was mutated.
  #[error("invalid state '{state}' for entity '{entity}'")]
  InvalidStateValue { entity: String, state: String },

  /// A link mapping is empty or references undeclared states.
  #[error("invalid link mapping: {message}")]
  InvalidMapping { message: String },

  /// A cascade went deeper than the configured bound. Transitions applied
  /// before the overflow remain in place.
  #[error("cascade exceeded maximum depth {max_depth} at entity '{entity}'")]
  CycleOverflow { entity: String, max_depth: usize },

  /// The declared state set is empty or contains duplicates.
  #[error("invalid state set: {message}")]
  InvalidStateSet { message: String },

  #[error("duplicate entity name: {0}")]
  DuplicateEntity(String),

  #[error("entity not found: {0}")]
  UnknownEntity(String),

  #[error("link not found: {0}")]
  UnknownLink(String),

  #[error("entity '{0}' is not a workflow")]
  NotAWorkflow(String),
}
