//! Unified workspace context - build once, pass everywhere
//!
//! Eliminates redundant metadata/config/graph loads by building all
//! workspace-level data structures once in main.rs, then passing by
//! reference to all commands.

use crate::cargo::metadata::WorkspaceMetadata;
use crate::core::config::ConvoyConfig;
use crate::core::error::ConvoyResult;
use crate::graph::ModuleGraph;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Unified workspace context containing all shared workspace-level data.
#[derive(Clone)]
pub struct WorkspaceContext {
  /// Workspace root directory (absolute path)
  pub root: PathBuf,

  /// Member dependency graph (built from cargo metadata)
  pub graph: Arc<ModuleGraph>,

  /// Convoy configuration (convoy.toml, defaults when absent)
  pub config: ConvoyConfig,
}

impl WorkspaceContext {
  /// Build workspace context starting from any directory inside the
  /// workspace; the root is taken from cargo metadata.
  pub fn build(dir: &Path) -> ConvoyResult<Self> {
    let metadata = WorkspaceMetadata::load(dir)?;
    let root = metadata.workspace_root().to_path_buf();
    let graph = Arc::new(ModuleGraph::from_metadata(&metadata)?);
    let config = ConvoyConfig::load(&root)?;

    Ok(Self { root, graph, config })
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }
}
