//! Member dependency graph built from cargo_metadata + petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: Workspace members only (external crates never release here)
//! - **Edges**: Normal and build dependencies; dev-dependencies are skipped
//!   because they do not affect the released artifact
//! - **Build order**: topological order with dependencies first, so a
//!   dependency's release decision is always available before its dependents
//!   are evaluated

use crate::cargo::metadata::WorkspaceMetadata;
use crate::core::error::{ConvoyError, ConvoyResult, ValidationError};
use crate::detect::ROOT_MODULE_PATH;
use crate::utils::path_to_git_format;
use cargo_metadata::DependencyKind;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// A workspace member in the dependency graph.
#[derive(Debug, Clone)]
pub struct ModuleNode {
  pub name: String,
  /// Member directory relative to the workspace root, `.` for the root package
  pub relative_path: String,
  pub manifest_path: PathBuf,
  pub version: semver::Version,
  /// Names of workspace members this member depends on (normal + build)
  pub dependencies: Vec<String>,
}

/// Member dependency graph.
pub struct ModuleGraph {
  graph: DiGraph<ModuleNode, DependencyKind>,
  name_to_node: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
  /// Build the member graph from cargo metadata.
  pub fn from_metadata(metadata: &WorkspaceMetadata) -> ConvoyResult<Self> {
    let workspace_root = metadata.workspace_root();
    let member_names: HashSet<String> = metadata
      .members()
      .iter()
      .map(|pkg| pkg.name.as_ref().to_string())
      .collect();

    let mut graph = DiGraph::new();
    let mut name_to_node = HashMap::new();

    for package in metadata.members() {
      let name = package.name.as_ref().to_string();
      let manifest_path = package.manifest_path.clone().into_std_path_buf();
      let member_dir = manifest_path
        .parent()
        .ok_or_else(|| ConvoyError::internal(format!("manifest path without parent: {}", manifest_path.display())))?;
      let relative = member_dir.strip_prefix(workspace_root)?;
      let relative_path = if relative.as_os_str().is_empty() {
        ROOT_MODULE_PATH.to_string()
      } else {
        path_to_git_format(relative)
      };

      let dependencies: Vec<String> = package
        .dependencies
        .iter()
        .filter(|dep| dep.kind != DependencyKind::Development)
        .filter(|dep| member_names.contains(dep.name.as_str()))
        .map(|dep| dep.name.to_string())
        .collect();

      let node = ModuleNode {
        name: name.clone(),
        relative_path,
        manifest_path,
        version: package.version.clone(),
        dependencies,
      };
      let idx = graph.add_node(node);
      name_to_node.insert(name, idx);
    }

    // Add dependency edges between members
    for idx in name_to_node.values() {
      let deps = graph[*idx].dependencies.clone();
      for dep in deps {
        if let Some(dep_idx) = name_to_node.get(&dep) {
          graph.add_edge(*idx, *dep_idx, DependencyKind::Normal);
        }
      }
    }

    Ok(Self { graph, name_to_node })
  }

  pub fn member(&self, name: &str) -> Option<&ModuleNode> {
    self.name_to_node.get(name).map(|idx| &self.graph[*idx])
  }

  /// Members in build order: dependencies before dependents.
  ///
  /// # Errors
  /// Fails with a validation error if the dependency graph contains a cycle.
  pub fn build_order(&self) -> ConvoyResult<Vec<&ModuleNode>> {
    // toposort puts dependents before their dependencies (edge a→b gives a
    // first), so the result is reversed for build order.
    let topo = algo::toposort(&self.graph, None).map_err(|cycle| {
      let node = &self.graph[cycle.node_id()];
      ConvoyError::Validation(ValidationError::DependencyCycle {
        member: node.name.clone(),
      })
    })?;

    Ok(topo.into_iter().rev().map(|idx| &self.graph[idx]).collect())
  }

  /// Member directories nested under the given member directory.
  ///
  /// Used to exclude nested members from a parent's change detection: their
  /// commits must not count as changes to the parent.
  pub fn nested_member_paths(&self, relative_path: &str) -> Vec<String> {
    let prefix = format!("{}/", relative_path);
    let mut paths: Vec<String> = self
      .name_to_node
      .values()
      .map(|idx| &self.graph[*idx])
      .filter(|node| {
        if relative_path == ROOT_MODULE_PATH {
          node.relative_path != ROOT_MODULE_PATH
        } else {
          node.relative_path.starts_with(&prefix)
        }
      })
      .map(|node| node.relative_path.clone())
      .collect();
    paths.sort();
    paths
  }
}
