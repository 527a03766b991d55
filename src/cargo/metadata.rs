//! Workspace introspection using cargo_metadata

use crate::core::error::ConvoyResult;
use cargo_metadata::{MetadataCommand, Package};
use std::path::Path;

/// Thin wrapper around `cargo metadata` output.
#[derive(Clone)]
pub struct WorkspaceMetadata {
  metadata: cargo_metadata::Metadata,
}

impl WorkspaceMetadata {
  /// Load workspace metadata without dependency resolution.
  ///
  /// `--no-deps` keeps the call read-only: a full resolve would create a
  /// Cargo.lock, which the clean-tree guard would then reject.
  pub fn load(dir: &Path) -> ConvoyResult<Self> {
    let metadata = MetadataCommand::new()
      .manifest_path(dir.join("Cargo.toml"))
      .no_deps()
      .exec()?;
    Ok(Self { metadata })
  }

  /// Workspace member packages.
  pub fn members(&self) -> Vec<&Package> {
    self.metadata.workspace_packages()
  }

  pub fn workspace_root(&self) -> &Path {
    self.metadata.workspace_root.as_std_path()
  }
}
