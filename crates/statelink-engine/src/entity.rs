use std::fmt;

use statelink_config::EntityKind;

use crate::link::LinkId;
use crate::state::State;

/// Stable handle to an entity within a [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
  pub fn index(&self) -> usize {
    self.0
  }
}

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "entity#{}", self.0)
  }
}

/// Capability shared by every entity: a name, a current state, and an ordered
/// list of outgoing links.
///
/// This is read-only on purpose. State only changes through
/// [`Graph::set_state`](crate::Graph::set_state).
pub trait Stateful {
  fn name(&self) -> &str;
  fn kind(&self) -> EntityKind;
  fn state(&self) -> &State;
  /// Outgoing links in declaration order.
  fn links(&self) -> &[LinkId];
}

/// A leaf unit of work.
#[derive(Debug, Clone)]
pub struct Task {
  name: String,
  state: State,
  links: Vec<LinkId>,
}

/// An aggregate entity.
///
/// Children are kept for enumeration only. Propagation never follows them.
#[derive(Debug, Clone)]
pub struct Workflow {
  name: String,
  state: State,
  links: Vec<LinkId>,
  children: Vec<EntityId>,
}

impl Workflow {
  pub fn children(&self) -> &[EntityId] {
    &self.children
  }
}

impl Stateful for Task {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> EntityKind {
    EntityKind::Task
  }

  fn state(&self) -> &State {
    &self.state
  }

  fn links(&self) -> &[LinkId] {
    &self.links
  }
}

impl Stateful for Workflow {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> EntityKind {
    EntityKind::Workflow
  }

  fn state(&self) -> &State {
    &self.state
  }

  fn links(&self) -> &[LinkId] {
    &self.links
  }
}

/// An entity stored in the graph arena.
#[derive(Debug, Clone)]
pub enum Entity {
  Task(Task),
  Workflow(Workflow),
}

impl Entity {
  pub(crate) fn new(kind: EntityKind, name: String, state: State) -> Self {
    match kind {
      EntityKind::Task => Entity::Task(Task {
        name,
        state,
        links: Vec::new(),
      }),
      EntityKind::Workflow => Entity::Workflow(Workflow {
        name,
        state,
        links: Vec::new(),
        children: Vec::new(),
      }),
    }
  }

  pub fn as_workflow(&self) -> Option<&Workflow> {
    match self {
      Entity::Workflow(workflow) => Some(workflow),
      Entity::Task(_) => None,
    }
  }

  pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<EntityId>> {
    match self {
      Entity::Workflow(workflow) => Some(&mut workflow.children),
      Entity::Task(_) => None,
    }
  }

  /// Overwrite the current state, returning the previous one.
  pub(crate) fn assign(&mut self, state: State) -> State {
    let slot = match self {
      Entity::Task(task) => &mut task.state,
      Entity::Workflow(workflow) => &mut workflow.state,
    };
    std::mem::replace(slot, state)
  }

  pub(crate) fn push_link(&mut self, link: LinkId) {
    match self {
      Entity::Task(task) => task.links.push(link),
      Entity::Workflow(workflow) => workflow.links.push(link),
    }
  }
}

impl Stateful for Entity {
  fn name(&self) -> &str {
    match self {
      Entity::Task(task) => task.name(),
      Entity::Workflow(workflow) => workflow.name(),
    }
  }

  fn kind(&self) -> EntityKind {
    match self {
      Entity::Task(_) => EntityKind::Task,
      Entity::Workflow(_) => EntityKind::Workflow,
    }
  }

  fn state(&self) -> &State {
    match self {
      Entity::Task(task) => task.state(),
      Entity::Workflow(workflow) => workflow.state(),
    }
  }

  fn links(&self) -> &[LinkId] {
    match self {
      Entity::Task(task) => task.links(),
      Entity::Workflow(workflow) => workflow.links(),
    }
  }
}
