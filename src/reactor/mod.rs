//! Release cycle planning
//!
//! # Core Invariants
//!
//! 1. **Build order is ground truth** — the member graph's topological order
//!    is supplied to the reactor, which consumes it and never re-derives it.
//! 2. **Releases are contagious upward** — a changed dependency forces the
//!    release of its dependents, never the other way around.
//! 3. **Every member gets a recorded version every cycle** — released members
//!    get a freshly named one, unreleased members carry their previous record.
//! 4. **All-or-nothing** — any per-member failure aborts the whole cycle;
//!    there is no partial release of a dependency graph.

pub mod engine;
pub mod plan;

pub use engine::{PlanOptions, Reactor, ReactorModule};
pub use plan::{NoChangesAction, PlanId, ReleasableModule, ReleasePlan};
