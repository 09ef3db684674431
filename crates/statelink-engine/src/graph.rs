//! The graph arena and the propagation algorithm.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use statelink_config::EntityKind;
use tracing::{debug, instrument, trace, warn};

use crate::config::EngineConfig;
use crate::entity::{Entity, EntityId, Stateful};
use crate::error::EngineError;
use crate::events::{NoopNotifier, Transition, TransitionNotifier};
use crate::link::{Link, LinkId, StateMapping};
use crate::snapshot::Snapshot;
use crate::state::{State, StateSet};

/// A graph of entities connected by links.
///
/// Entities and links live in arenas and refer to each other by handle, so
/// cycles in the graph never become ownership cycles. Every mutation takes
/// `&mut self`; callers sharing a graph across threads wrap the whole graph in
/// a single lock.
pub struct Graph {
  name: String,
  states: StateSet,
  config: EngineConfig,
  entities: Vec<Entity>,
  by_name: HashMap<String, EntityId>,
  links: Vec<Link>,
  notifier: Arc<dyn TransitionNotifier>,
}

/// One entity whose outgoing links are still being evaluated.
struct Frame {
  links: Vec<LinkId>,
  next: usize,
  depth: usize,
}

impl Graph {
  /// Create an empty graph over the given state set.
  pub fn new(name: impl Into<String>, states: StateSet) -> Self {
    Self {
      name: name.into(),
      states,
      config: EngineConfig::default(),
      entities: Vec::new(),
      by_name: HashMap::new(),
      links: Vec::new(),
      notifier: Arc::new(NoopNotifier),
    }
  }

  /// Replace the engine configuration, e.g. the cascade depth bound.
  pub fn with_config(mut self, config: EngineConfig) -> Self {
    self.config = config;
    self
  }

  /// Replace the transition notifier.
  pub fn with_notifier(mut self, notifier: Arc<dyn TransitionNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  /// The graph's display name.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The declared state set.
  pub fn states(&self) -> &StateSet {
    &self.states
  }

  /// The engine configuration in effect.
  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Add an entity of the given kind.
  pub fn new_entity(
    &mut self,
    kind: EntityKind,
    name: impl Into<String>,
    initial: State,
  ) -> Result<EntityId, EngineError> {
    let name = name.into();
    if self.by_name.contains_key(&name) {
      return Err(EngineError::DuplicateEntity(name));
    }
    if !self.states.contains(&initial) {
      return Err(EngineError::InvalidStateValue {
        entity: name,
        state: initial.to_string(),
      });
    }

    let id = EntityId(self.entities.len());
    self.by_name.insert(name.clone(), id);
    self.entities.push(Entity::new(kind, name, initial));
    Ok(id)
  }

  /// Add a task entity.
  pub fn new_task(&mut self, name: impl Into<String>, initial: State) -> Result<EntityId, EngineError> {
    self.new_entity(EntityKind::Task, name, initial)
  }

  /// Add a workflow entity with no children.
  pub fn new_workflow(
    &mut self,
    name: impl Into<String>,
    initial: State,
  ) -> Result<EntityId, EngineError> {
    self.new_entity(EntityKind::Workflow, name, initial)
  }

  /// Attach a link to its source entity.
  ///
  /// The link is appended after any links already on the source, which fixes
  /// its place in propagation order. No duplicate detection is done.
  pub fn add_link(&mut self, link: Link) -> Result<LinkId, EngineError> {
    self.require(link.source())?;
    self.require(link.target())?;

    for (from, to) in link.mapping().iter() {
      for state in [from, to] {
        if !self.states.contains(state) {
          return Err(EngineError::InvalidMapping {
            message: format!(
              "link {} -> {} uses undeclared state '{}'",
              self.entities[link.source().0].name(),
              self.entities[link.target().0].name(),
              state
            ),
          });
        }
      }
    }

    let id = LinkId(self.links.len());
    self.entities[link.source().0].push_link(id);
    self.links.push(link);
    Ok(id)
  }

  /// Build a link and attach it in one step.
  pub fn link(
    &mut self,
    source: EntityId,
    target: EntityId,
    mapping: StateMapping,
  ) -> Result<LinkId, EngineError> {
    let link = Link::new(source, target, mapping)?;
    self.add_link(link)
  }

  /// Record `child` as a member of `workflow`. Membership never propagates state.
  pub fn add_task(&mut self, workflow: EntityId, child: EntityId) -> Result<(), EngineError> {
    self.require(child)?;
    self.children_mut(workflow)?.push(child);
    Ok(())
  }

  /// Remove the first occurrence of `child` from `workflow`. Links are untouched.
  pub fn remove_task(&mut self, workflow: EntityId, child: EntityId) -> Result<bool, EngineError> {
    let children = self.children_mut(workflow)?;
    match children.iter().position(|c| *c == child) {
      Some(index) => {
        children.remove(index);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Look up an entity by handle.
  pub fn entity(&self, id: EntityId) -> Option<&Entity> {
    self.entities.get(id.0)
  }

  /// Handle of the entity with the given name.
  pub fn entity_id(&self, name: &str) -> Option<EntityId> {
    self.by_name.get(name).copied()
  }

  /// Look up an entity by name.
  pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
    self.entity_id(name).and_then(|id| self.entity(id))
  }

  /// Look up a link by handle.
  pub fn get_link(&self, id: LinkId) -> Option<&Link> {
    self.links.get(id.0)
  }

  /// Current state of an entity.
  pub fn state_of(&self, id: EntityId) -> Option<&State> {
    self.entity(id).map(|e| e.state())
  }

  /// Entities in creation order.
  pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
    self
      .entities
      .iter()
      .enumerate()
      .map(|(index, entity)| (EntityId(index), entity))
  }

  /// Links in creation order.
  pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
    self
      .links
      .iter()
      .enumerate()
      .map(|(index, link)| (LinkId(index), link))
  }

  /// Children of a workflow, in insertion order.
  pub fn children(&self, workflow: EntityId) -> Result<&[EntityId], EngineError> {
    let entity = self.require(workflow)?;
    entity
      .as_workflow()
      .map(|w| w.children())
      .ok_or_else(|| EngineError::NotAWorkflow(entity.name().to_string()))
  }

  /// Current state of every entity, keyed by name.
  pub fn snapshot(&self) -> Snapshot {
    let states: BTreeMap<String, State> = self
      .entities
      .iter()
      .map(|e| (e.name().to_string(), e.state().clone()))
      .collect();
    Snapshot::new(states)
  }

  /// Set an entity's state and run the resulting cascade to completion.
  ///
  /// The state is assigned and reported even when it equals the current one,
  /// and every outgoing link is re-evaluated. Links only fire when they would
  /// change their target.
  ///
  /// On `CycleOverflow` the transitions made before the bound was hit stay
  /// applied.
  #[instrument(name = "set_state", skip(self), fields(graph = %self.name))]
  pub fn set_state(&mut self, id: EntityId, state: State) -> Result<(), EngineError> {
    let entity = self.require(id)?;
    if !self.states.contains(&state) {
      return Err(EngineError::InvalidStateValue {
        entity: entity.name().to_string(),
        state: state.to_string(),
      });
    }

    self.cascade(id, state)
  }

  /// Evaluate a single link against the current states.
  ///
  /// Does nothing when the source's state is not mapped or the target already
  /// holds the mapped state; otherwise sets the target, cascading from there.
  #[instrument(name = "apply_link", skip(self), fields(graph = %self.name))]
  pub fn apply_link(&mut self, id: LinkId) -> Result<(), EngineError> {
    if self.links.get(id.0).is_none() {
      return Err(EngineError::UnknownLink(id.to_string()));
    }

    match self.evaluate(id) {
      Some((target, candidate)) => self.cascade(target, candidate),
      None => Ok(()),
    }
  }

  /// Depth-first cascade driven by an explicit frame stack.
  ///
  /// Each frame walks its entity's links in declaration order; a link that
  /// fires pushes its target's frame, so the target's whole cascade resolves
  /// before the next sibling link is looked at.
  fn cascade(&mut self, origin: EntityId, state: State) -> Result<(), EngineError> {
    let mut stack = vec![self.enter(origin, state, 0)?];

    while let Some(frame) = stack.last_mut() {
      let Some(link) = frame.links.get(frame.next).copied() else {
        stack.pop();
        continue;
      };
      frame.next += 1;
      let depth = frame.depth + 1;

      if let Some((target, candidate)) = self.evaluate(link) {
        let next = self.enter(target, candidate, depth)?;
        stack.push(next);
      }
    }

    Ok(())
  }

  /// Assign `state` to `id`, notify, and return a frame over its links.
  fn enter(&mut self, id: EntityId, state: State, depth: usize) -> Result<Frame, EngineError> {
    let max_depth = self.config.max_depth;
    let entity = self
      .entities
      .get_mut(id.0)
      .ok_or_else(|| EngineError::UnknownEntity(id.to_string()))?;

    if depth > max_depth {
      warn!(
        graph = %self.name,
        entity = %entity.name(),
        max_depth,
        "cascade depth exceeded"
      );
      return Err(EngineError::CycleOverflow {
        entity: entity.name().to_string(),
        max_depth,
      });
    }

    let from = entity.assign(state.clone());
    let links = entity.links().to_vec();
    let transition = Transition {
      entity: entity.name().to_string(),
      kind: entity.kind(),
      from,
      to: state,
      depth,
    };

    debug!(
      entity = %transition.entity,
      from = %transition.from,
      to = %transition.to,
      depth,
      "state assigned"
    );
    self.notifier.notify(transition);

    Ok(Frame {
      links,
      next: 0,
      depth,
    })
  }

  /// The target and state a link would set right now, if it fires.
  fn evaluate(&self, id: LinkId) -> Option<(EntityId, State)> {
    let link = self.links.get(id.0)?;
    let source = self.entities.get(link.source().0)?;
    let target = self.entities.get(link.target().0)?;

    let Some(candidate) = link.implied(source.state()) else {
      trace!(link = %id, source = %source.name(), state = %source.state(), "link not mapped");
      return None;
    };

    if candidate == target.state() {
      trace!(link = %id, target = %target.name(), state = %candidate, "link already satisfied");
      return None;
    }

    debug!(
      link = %id,
      source = %source.name(),
      target = %target.name(),
      state = %candidate,
      "link fired"
    );
    Some((link.target(), candidate.clone()))
  }

  fn require(&self, id: EntityId) -> Result<&Entity, EngineError> {
    self
      .entities
      .get(id.0)
      .ok_or_else(|| EngineError::UnknownEntity(id.to_string()))
  }

  fn children_mut(&mut self, workflow: EntityId) -> Result<&mut Vec<EntityId>, EngineError> {
    let entity = self
      .entities
      .get_mut(workflow.0)
      .ok_or_else(|| EngineError::UnknownEntity(workflow.to_string()))?;
    let name = entity.name().to_string();
    entity
      .children_mut()
      .ok_or(EngineError::NotAWorkflow(name))
  }
}

impl fmt::Debug for Graph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Graph")
      .field("name", &self.name)
      .field("states", &self.states)
      .field("config", &self.config)
      .field("entities", &self.entities)
      .field("links", &self.links)
      .finish_non_exhaustive()
  }
}
