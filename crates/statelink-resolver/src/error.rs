use statelink_engine::EngineError;
use thiserror::Error;

/// Errors that can occur while resolving a graph definition.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// A link or workflow refers to an entity that is not defined.
  #[error("{referenced_by} references unknown entity '{entity}'")]
  UnknownEntity {
    entity: String,
    referenced_by: String,
  },

  /// A state label used in the definition is not declared.
  #[error("{referenced_by} uses undeclared state '{state}'")]
  UnknownState {
    state: String,
    referenced_by: String,
  },

  /// Children were listed on an entity that is not a workflow.
  #[error("entity '{0}' lists children but is not a workflow")]
  ChildrenOnTask(String),

  /// The engine rejected the graph while it was being built.
  #[error(transparent)]
  Engine(#[from] EngineError),
}
