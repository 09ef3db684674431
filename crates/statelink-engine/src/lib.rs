//! Statelink Engine
//!
//! This crate provides the propagation engine for statelink: a graph of
//! stateful entities (tasks and workflows) wired together by directed links.
//! Setting the state of an entity synchronously cascades through every link
//! whose mapping matches, depth-first and in link declaration order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           Graph                             │
//! │  - arena of entities (Task | Workflow) indexed by EntityId  │
//! │  - arena of links indexed by LinkId                         │
//! │  - set_state(entity, state) → cascade                       │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Cascade                            │
//! │  - explicit frame stack, depth-first                        │
//! │  - link fires only when it would change its target          │
//! │  - aborts with CycleOverflow past EngineConfig::max_depth   │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TransitionNotifier                       │
//! │  - receives (entity, from, to) for every assignment         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use statelink_engine::{Graph, State, StateMapping, StateSet};
//!
//! let mut graph = Graph::new("onboarding", StateSet::default());
//! let sign_up = graph.new_task("Sign Up", State::pending()).unwrap();
//! let verify = graph.new_task("Verify Email", State::pending()).unwrap();
//!
//! let mapping = StateMapping::new().with(State::completed(), State::in_progress());
//! graph.link(sign_up, verify, mapping).unwrap();
//!
//! graph.set_state(sign_up, State::completed()).unwrap();
//! assert_eq!(graph.state_of(verify), Some(&State::in_progress()));
//! ```

mod config;
mod entity;
mod error;
mod events;
mod graph;
mod link;
mod snapshot;
mod state;

pub use config::{DEFAULT_MAX_DEPTH, EngineConfig};
pub use entity::{Entity, EntityId, Stateful, Task, Workflow};
pub use error::EngineError;
pub use events::{
  ChannelNotifier, FnNotifier, NoopNotifier, RecordingNotifier, Transition, TransitionNotifier,
};
pub use graph::Graph;
pub use link::{Link, LinkId, StateMapping};
pub use snapshot::Snapshot;
pub use state::{State, StateSet};

pub use statelink_config::EntityKind;
