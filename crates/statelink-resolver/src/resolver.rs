use std::sync::Arc;

use statelink_config::{EntityKind, GraphDef};
use statelink_engine::{
  DEFAULT_MAX_DEPTH, EngineConfig, EntityId, Graph, State, StateMapping, StateSet,
  TransitionNotifier,
};
use tracing::info;

use crate::error::ResolveError;

/// Resolver transforms a GraphDef into a live Graph.
pub trait Resolver: Send + Sync {
  /// Resolve a graph definition into a graph ready for `set_state` calls.
  ///
  /// This process:
  /// 1. Builds the declared state set
  /// 2. Creates every entity with its initial state
  /// 3. Records workflow children
  /// 4. Attaches links in definition order
  fn resolve(&self, def: GraphDef) -> Result<Graph, ResolveError>;
}

/// Standard resolver implementation.
#[derive(Default)]
pub struct StandardResolver {
  notifier: Option<Arc<dyn TransitionNotifier>>,
  max_depth: Option<usize>,
}

impl StandardResolver {
  pub fn new() -> Self {
    Self::default()
  }

  /// Attach a notifier to every graph this resolver builds.
  pub fn with_notifier(mut self, notifier: Arc<dyn TransitionNotifier>) -> Self {
    self.notifier = Some(notifier);
    self
  }

  /// Override the definition's `max_depth`.
  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = Some(max_depth);
    self
  }

  fn lookup_state(states: &StateSet, label: &str, referenced_by: &str) -> Result<State, ResolveError> {
    states
      .get(label)
      .cloned()
      .ok_or_else(|| ResolveError::UnknownState {
        state: label.to_string(),
        referenced_by: referenced_by.to_string(),
      })
  }

  fn lookup_entity(graph: &Graph, name: &str, referenced_by: &str) -> Result<EntityId, ResolveError> {
    graph
      .entity_id(name)
      .ok_or_else(|| ResolveError::UnknownEntity {
        entity: name.to_string(),
        referenced_by: referenced_by.to_string(),
      })
  }
}

impl Resolver for StandardResolver {
  fn resolve(&self, def: GraphDef) -> Result<Graph, ResolveError> {
    let states = StateSet::new(def.state_labels())?;
    let config = EngineConfig {
      max_depth: self
        .max_depth
        .or(def.max_depth)
        .unwrap_or(DEFAULT_MAX_DEPTH),
    };

    let mut graph = Graph::new(def.name.clone(), states).with_config(config);
    if let Some(notifier) = &self.notifier {
      graph = graph.with_notifier(notifier.clone());
    }

    for entity in &def.entities {
      let referenced_by = format!("entity '{}'", entity.name);
      if entity.kind == EntityKind::Task && !entity.children.is_empty() {
        return Err(ResolveError::ChildrenOnTask(entity.name.clone()));
      }

      let initial = match &entity.initial_state {
        Some(label) => Self::lookup_state(graph.states(), label, &referenced_by)?,
        None => graph.states().initial().clone(),
      };
      graph.new_entity(entity.kind, entity.name.clone(), initial)?;
    }

    // Children may refer to entities declared later, so wire them after all exist
    for entity in def.entities.iter().filter(|e| !e.children.is_empty()) {
      let referenced_by = format!("workflow '{}'", entity.name);
      let workflow = Self::lookup_entity(&graph, &entity.name, &referenced_by)?;
      for child in &entity.children {
        let child = Self::lookup_entity(&graph, child, &referenced_by)?;
        graph.add_task(workflow, child)?;
      }
    }

    for (index, link) in def.links.iter().enumerate() {
      let referenced_by = format!("link #{} ({} -> {})", index, link.source, link.target);
      let source = Self::lookup_entity(&graph, &link.source, &referenced_by)?;
      let target = Self::lookup_entity(&graph, &link.target, &referenced_by)?;

      let mut mapping = StateMapping::new();
      for (from, to) in &link.mapping {
        let from = Self::lookup_state(graph.states(), from, &referenced_by)?;
        let to = Self::lookup_state(graph.states(), to, &referenced_by)?;
        mapping.insert(from, to);
      }

      graph.link(source, target, mapping)?;
    }

    info!(
      graph_id = %def.graph_id,
      entities = def.entities.len(),
      links = def.links.len(),
      max_depth = config.max_depth,
      "graph resolved"
    );

    Ok(graph)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use statelink_engine::{EngineError, RecordingNotifier, Stateful};

  fn parse(value: serde_json::Value) -> GraphDef {
    serde_json::from_value(value).unwrap()
  }

  fn onboarding_def() -> GraphDef {
    parse(json!({
      "graph_id": "onboarding",
      "name": "Onboarding",
      "entities": [
        { "name": "Onboarding", "kind": "workflow",
          "children": ["Sign Up", "Verify Email", "Add Profile"] },
        { "name": "Sign Up", "kind": "task" },
        { "name": "Verify Email", "kind": "task" },
        { "name": "Add Profile", "kind": "task" }
      ],
      "links": [
        { "source": "Sign Up", "target": "Verify Email", "mapping": { "Completed": "In Progress" } },
        { "source": "Sign Up", "target": "Add Profile", "mapping": { "Completed": "In Progress" } },
        { "source": "Verify Email", "target": "Onboarding", "mapping": { "Completed": "Completed" } },
        { "source": "Add Profile", "target": "Onboarding", "mapping": { "Completed": "Completed" } }
      ]
    }))
  }

  #[test]
  fn test_resolve_onboarding() {
    let graph = StandardResolver::new().resolve(onboarding_def()).unwrap();

    assert_eq!(graph.name(), "Onboarding");
    assert_eq!(graph.config().max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(graph.entities().count(), 4);
    assert_eq!(graph.links().count(), 4);

    let workflow = graph.entity_id("Onboarding").unwrap();
    let children: Vec<&str> = graph
      .children(workflow)
      .unwrap()
      .iter()
      .map(|id| graph.entity(*id).unwrap().name())
      .collect();
    assert_eq!(children, vec!["Sign Up", "Verify Email", "Add Profile"]);

    let sign_up = graph.entity_by_name("Sign Up").unwrap();
    assert_eq!(sign_up.state(), &State::pending());
    assert_eq!(sign_up.links().len(), 2);
  }

  #[test]
  fn test_resolved_graph_propagates() {
    let recorder = RecordingNotifier::new();
    let mut graph = StandardResolver::new()
      .with_notifier(Arc::new(recorder.clone()))
      .resolve(onboarding_def())
      .unwrap();

    let sign_up = graph.entity_id("Sign Up").unwrap();
    graph.set_state(sign_up, State::completed()).unwrap();

    let snapshot = graph.snapshot();
    assert_eq!(snapshot.get("Verify Email"), Some(&State::in_progress()));
    assert_eq!(snapshot.get("Add Profile"), Some(&State::in_progress()));
    assert_eq!(snapshot.get("Onboarding"), Some(&State::pending()));
    assert_eq!(recorder.len(), 3);
  }

  #[test]
  fn test_custom_states_and_initial_state() {
    let graph = StandardResolver::new()
      .resolve(parse(json!({
        "graph_id": "g",
        "name": "Tickets",
        "states": ["Open", "Closed"],
        "entities": [
          { "name": "a", "kind": "task" },
          { "name": "b", "kind": "task", "initial_state": "Closed" }
        ]
      })))
      .unwrap();

    assert_eq!(graph.entity_by_name("a").unwrap().state(), &State::new("Open"));
    assert_eq!(graph.entity_by_name("b").unwrap().state(), &State::new("Closed"));
  }

  #[test]
  fn test_max_depth_from_definition_and_override() {
    let def = parse(json!({
      "graph_id": "g",
      "name": "Depth",
      "max_depth": 12,
      "entities": [{ "name": "a", "kind": "task" }]
    }));

    let graph = StandardResolver::new().resolve(def.clone()).unwrap();
    assert_eq!(graph.config().max_depth, 12);

    let graph = StandardResolver::new().with_max_depth(3).resolve(def).unwrap();
    assert_eq!(graph.config().max_depth, 3);
  }

  #[test]
  fn test_unknown_link_endpoint() {
    let result = StandardResolver::new().resolve(parse(json!({
      "graph_id": "g",
      "name": "Bad",
      "entities": [{ "name": "a", "kind": "task" }],
      "links": [{ "source": "a", "target": "ghost", "mapping": { "Completed": "Completed" } }]
    })));

    match result {
      Err(ResolveError::UnknownEntity { entity, referenced_by }) => {
        assert_eq!(entity, "ghost");
        assert_eq!(referenced_by, "link #0 (a -> ghost)");
      }
      other => panic!("expected UnknownEntity, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn test_unknown_mapping_state() {
    let result = StandardResolver::new().resolve(parse(json!({
      "graph_id": "g",
      "name": "Bad",
      "entities": [{ "name": "a", "kind": "task" }, { "name": "b", "kind": "task" }],
      "links": [{ "source": "a", "target": "b", "mapping": { "Done": "Completed" } }]
    })));

    assert!(matches!(
      result,
      Err(ResolveError::UnknownState { ref state, .. }) if state == "Done"
    ));
  }

  #[test]
  fn test_empty_mapping_rejected() {
    let result = StandardResolver::new().resolve(parse(json!({
      "graph_id": "g",
      "name": "Bad",
      "entities": [{ "name": "a", "kind": "task" }, { "name": "b", "kind": "task" }],
      "links": [{ "source": "a", "target": "b", "mapping": {} }]
    })));

    assert!(matches!(
      result,
      Err(ResolveError::Engine(EngineError::InvalidMapping { .. }))
    ));
  }

  #[test]
  fn test_duplicate_entity_rejected() {
    let result = StandardResolver::new().resolve(parse(json!({
      "graph_id": "g",
      "name": "Bad",
      "entities": [{ "name": "a", "kind": "task" }, { "name": "a", "kind": "workflow" }]
    })));

    assert!(matches!(
      result,
      Err(ResolveError::Engine(EngineError::DuplicateEntity(ref name))) if name == "a"
    ));
  }

  #[test]
  fn test_children_on_task_rejected() {
    let result = StandardResolver::new().resolve(parse(json!({
      "graph_id": "g",
      "name": "Bad",
      "entities": [
        { "name": "a", "kind": "task", "children": ["b"] },
        { "name": "b", "kind": "task" }
      ]
    })));

    assert!(matches!(result, Err(ResolveError::ChildrenOnTask(ref name)) if name == "a"));
  }

  #[test]
  fn test_empty_state_set_rejected() {
    let result = StandardResolver::new().resolve(parse(json!({
      "graph_id": "g",
      "name": "Bad",
      "states": [],
      "entities": []
    })));

    assert!(matches!(
      result,
      Err(ResolveError::Engine(EngineError::InvalidStateSet { .. }))
    ));
  }
}
