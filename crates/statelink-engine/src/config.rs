use serde::{Deserialize, Serialize};

/// Default bound on cascade depth.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Configuration for a graph's propagation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Deepest link hop a single cascade may reach. The externally set entity
  /// sits at depth 0; each fired link adds one.
  #[serde(default = "default_max_depth")]
  pub max_depth: usize,
}

fn default_max_depth() -> usize {
  DEFAULT_MAX_DEPTH
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_depth: DEFAULT_MAX_DEPTH,
    }
  }
}
