use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::State;

/// Point-in-time view of every entity's state, keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
  states: BTreeMap<String, State>,
}

impl Snapshot {
  pub(crate) fn new(states: BTreeMap<String, State>) -> Self {
    Self { states }
  }

  pub fn get(&self, name: &str) -> Option<&State> {
    self.states.get(name)
  }

  /// Entries in name order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &State)> {
    self.states.iter().map(|(name, state)| (name.as_str(), state))
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }
}
