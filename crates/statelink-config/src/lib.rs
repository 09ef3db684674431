//! Statelink Config
//!
//! This crate contains the serializable graph configuration types for statelink.
//! These types describe a graph of entities and links before it is resolved into
//! a live, mutable graph by `statelink-resolver`.
//!
//! Configuration can be loaded from JSON files (via the CLI) or built in code.

mod entity;
mod graph;
mod link;

pub use entity::{EntityDef, EntityKind};
pub use graph::{DEFAULT_STATES, GraphDef};
pub use link::LinkDef;
