use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  /// A leaf unit of work.
  Task,
  /// An aggregate that enumerates child entities.
  Workflow,
}

impl EntityKind {
  /// Capitalised name for narration, e.g. "Workflow".
  pub fn label(&self) -> &'static str {
    match self {
      EntityKind::Task => "Task",
      EntityKind::Workflow => "Workflow",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EntityKind::Task => f.write_str("task"),
      EntityKind::Workflow => f.write_str("workflow"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
  /// Unique name within the graph, e.g. "Sign Up"
  pub name: String,
  pub kind: EntityKind,
  /// Starting state label. Defaults to the first declared state.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub initial_state: Option<String>,
  /// Names of child entities (workflows only).
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_label_is_capitalised() {
    assert_eq!(EntityKind::Task.label(), "Task");
    assert_eq!(EntityKind::Workflow.label(), "Workflow");
    assert_eq!(EntityKind::Workflow.to_string(), "workflow");
  }
}
