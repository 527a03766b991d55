//! Version model and next-version computation
//!
//! # Core Invariants
//!
//! 1. **Value types are immutable** — a `ModuleVersion` is superseded by the
//!    next cycle's record, never edited in place.
//! 2. **One line per coordinate** — a coordinate's lineage is either regular
//!    (`major.minor`) or bugfix (`major.minor.bugfix`); the namer rejects
//!    implicit crossings between the two.
//! 3. **Snapshots only move forward** — a working copy older than the last
//!    release is a validation failure, never a silent regression.

pub mod model;
pub mod namer;

pub use model::{Coordinate, FixVersion, ModuleVersion, ReleaseInfo, SnapshotVersion};
pub use namer::VersionNamer;
