use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A directed link definition.
///
/// `mapping` maps a source state label to the target state label it implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDef {
  pub source: String,
  pub target: String,
  pub mapping: BTreeMap<String, String>,
}
