use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use statelink_config::DEFAULT_STATES;

use crate::error::EngineError;

/// A state token.
///
/// States only need equality. Any ordering of a lexicon is a convention of the
/// links that use it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
  pub fn new(label: impl Into<String>) -> Self {
    Self(label.into())
  }

  /// Human-readable label.
  pub fn label(&self) -> &str {
    &self.0
  }

  pub fn pending() -> Self {
    Self::new(DEFAULT_STATES[0])
  }

  pub fn in_progress() -> Self {
    Self::new(DEFAULT_STATES[1])
  }

  pub fn completed() -> Self {
    Self::new(DEFAULT_STATES[2])
  }
}

impl fmt::Display for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for State {
  fn from(label: &str) -> Self {
    Self::new(label)
  }
}

/// The closed set of states a graph accepts, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSet {
  states: Vec<State>,
}

impl StateSet {
  /// Build a state set from labels. Rejects empty sets and duplicate labels.
  pub fn new<I, S>(labels: I) -> Result<Self, EngineError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let states: Vec<State> = labels.into_iter().map(State::new).collect();
    if states.is_empty() {
      return Err(EngineError::InvalidStateSet {
        message: "at least one state must be declared".to_string(),
      });
    }

    let mut seen = HashSet::new();
    for state in &states {
      if !seen.insert(state.label()) {
        return Err(EngineError::InvalidStateSet {
          message: format!("state '{}' declared more than once", state),
        });
      }
    }

    Ok(Self { states })
  }

  pub fn contains(&self, state: &State) -> bool {
    self.states.contains(state)
  }

  /// Look up a declared state by label.
  pub fn get(&self, label: &str) -> Option<&State> {
    self.states.iter().find(|s| s.label() == label)
  }

  /// The first declared state.
  pub fn initial(&self) -> &State {
    &self.states[0]
  }

  pub fn iter(&self) -> impl Iterator<Item = &State> {
    self.states.iter()
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }
}

impl Default for StateSet {
  /// The reference lexicon: Pending, In Progress, Completed.
  fn default() -> Self {
    Self {
      states: DEFAULT_STATES.iter().map(|s| State::new(*s)).collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_lexicon() {
    let states = StateSet::default();
    assert_eq!(states.len(), 3);
    assert_eq!(states.initial(), &State::pending());
    assert!(states.contains(&State::in_progress()));
    assert!(states.contains(&State::completed()));
    assert_eq!(State::in_progress().label(), "In Progress");
  }

  #[test]
  fn test_custom_set() {
    let states = StateSet::new(["Open", "Closed"]).unwrap();
    assert_eq!(states.initial().label(), "Open");
    assert_eq!(states.get("Closed"), Some(&State::new("Closed")));
    assert!(!states.contains(&State::pending()));
  }

  #[test]
  fn test_empty_set_rejected() {
    let result = StateSet::new(Vec::<String>::new());
    assert!(matches!(result, Err(EngineError::InvalidStateSet { .. })));
  }

  #[test]
  fn test_duplicate_labels_rejected() {
    let result = StateSet::new(["Open", "Open"]);
    assert!(matches!(result, Err(EngineError::InvalidStateSet { .. })));
  }
}
