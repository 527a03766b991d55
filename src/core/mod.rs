//! Core building blocks for cargo-convoy
//!
//! - **config**: convoy configuration (convoy.toml) parsing and defaults
//! - **context**: unified workspace context for efficient data sharing
//! - **error**: error types with contextual help messages and exit codes
//! - **handoff**: file-based hand-off between the prepare and cleanup steps
//! - **vcs**: Git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod handoff;
pub mod vcs;
