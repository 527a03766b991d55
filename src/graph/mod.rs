//! Graph-aware workspace analysis
//!
//! Built on cargo_metadata + petgraph for direct control and minimal abstraction.

pub mod module_graph;

pub use module_graph::{ModuleGraph, ModuleNode};
