use serde::{Deserialize, Serialize};

use crate::entity::EntityDef;
use crate::link::LinkDef;

/// The reference state lexicon, in declaration order.
pub const DEFAULT_STATES: [&str; 3] = ["Pending", "In Progress", "Completed"];

/// A graph definition as loaded from JSON.
///
/// Links are attached in the order they appear in `links`, which fixes the
/// propagation order for links sharing a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
  pub graph_id: String,
  pub name: String,
  /// Declared state labels. Falls back to [`DEFAULT_STATES`] when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub states: Option<Vec<String>>,
  /// Maximum cascade depth before a cascade is aborted.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_depth: Option<usize>,
  pub entities: Vec<EntityDef>,
  #[serde(default)]
  pub links: Vec<LinkDef>,
}

impl GraphDef {
  /// The declared state labels, or the reference lexicon.
  pub fn state_labels(&self) -> Vec<String> {
    match &self.states {
      Some(states) => states.clone(),
      None => DEFAULT_STATES.iter().map(|s| s.to_string()).collect(),
    }
  }
}
