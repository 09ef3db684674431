use std::collections::HashMap;
use std::fmt;

use crate::entity::EntityId;
use crate::error::EngineError;
use crate::state::State;

/// Stable handle to a link within a [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub(crate) usize);

impl LinkId {
  pub fn index(&self) -> usize {
    self.0
  }
}

impl fmt::Display for LinkId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "link#{}", self.0)
  }
}

/// Source state → implied target state. At most one target per source state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateMapping {
  entries: HashMap<State, State>,
}

impl StateMapping {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add an entry, replacing any previous target for `from`.
  pub fn with(mut self, from: State, to: State) -> Self {
    self.entries.insert(from, to);
    self
  }

  pub fn insert(&mut self, from: State, to: State) -> Option<State> {
    self.entries.insert(from, to)
  }

  pub fn get(&self, from: &State) -> Option<&State> {
    self.entries.get(from)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&State, &State)> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl FromIterator<(State, State)> for StateMapping {
  fn from_iter<I: IntoIterator<Item = (State, State)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

/// A directed rule from `source` to `target`.
///
/// A link records the relation only; it does not own either endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
  source: EntityId,
  target: EntityId,
  mapping: StateMapping,
}

impl Link {
  /// Create a link. Self-links are allowed; empty mappings are not.
  pub fn new(source: EntityId, target: EntityId, mapping: StateMapping) -> Result<Self, EngineError> {
    if mapping.is_empty() {
      return Err(EngineError::InvalidMapping {
        message: format!("link {} -> {} has an empty mapping", source, target),
      });
    }

    Ok(Self {
      source,
      target,
      mapping,
    })
  }

  pub fn source(&self) -> EntityId {
    self.source
  }

  pub fn target(&self) -> EntityId {
    self.target
  }

  pub fn mapping(&self) -> &StateMapping {
    &self.mapping
  }

  /// The target state implied by `source_state`, if any.
  pub fn implied(&self, source_state: &State) -> Option<&State> {
    self.mapping.get(source_state)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_mapping_rejected() {
    let result = Link::new(EntityId(0), EntityId(1), StateMapping::new());
    assert!(matches!(result, Err(EngineError::InvalidMapping { .. })));
  }

  #[test]
  fn test_self_link_allowed() {
    let mapping = StateMapping::new().with(State::pending(), State::in_progress());
    let link = Link::new(EntityId(3), EntityId(3), mapping).unwrap();
    assert_eq!(link.source(), link.target());
  }

  #[test]
  fn test_implied_lookup() {
    let mapping: StateMapping = [(State::completed(), State::in_progress())]
      .into_iter()
      .collect();
    let link = Link::new(EntityId(0), EntityId(1), mapping).unwrap();

    assert_eq!(link.implied(&State::completed()), Some(&State::in_progress()));
    assert_eq!(link.implied(&State::pending()), None);
  }
}
