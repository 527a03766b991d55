//! Lossless rewriting of member manifests for a release cycle
//!
//! Every member manifest gets its `version` set to the version recorded for
//! the cycle (the freshly named one for released members, the previous
//! released one otherwise), and version requirements on other members are
//! pinned to their recorded versions. Rewrites are computed and validated in
//! memory for all members first; nothing touches disk until the whole set is
//! known good, and a failed write restores the originals.
//!
//! Formatting and comments survive untouched thanks to toml_edit.

use crate::core::error::{ConvoyError, ConvoyResult, ResultExt, ValidationError};
use crate::graph::ModuleGraph;
use crate::reactor::ReleasePlan;
use crate::utils::path_to_git_format;
use crate::version::model::SNAPSHOT_MARKER;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, Value};

/// Dependency tables rewritten and checked for snapshot references.
const DEPENDENCY_TABLES: [&str; 3] = ["dependencies", "build-dependencies", "dev-dependencies"];

/// Rewrites member manifests to carry the cycle's versions.
pub struct ManifestUpdater<'a> {
  workspace_root: &'a Path,
  graph: &'a ModuleGraph,
}

impl<'a> ManifestUpdater<'a> {
  pub fn new(workspace_root: &'a Path, graph: &'a ModuleGraph) -> Self {
    Self { workspace_root, graph }
  }

  /// Rewrite all member manifests for the given plan.
  ///
  /// Returns the workspace-relative paths of the files that changed, in
  /// member order, for the files-to-revert hand-off.
  pub fn update_versions(&self, plan: &ReleasePlan) -> ConvoyResult<Vec<String>> {
    let recorded: HashMap<&str, String> = plan
      .modules
      .iter()
      .map(|m| {
        (
          m.coordinate().artifact_id.as_str(),
          m.module_version.version.to_semver().to_string(),
        )
      })
      .collect();

    // Compute every rewrite before touching disk.
    let mut pending: Vec<(PathBuf, String, String)> = Vec::new();
    for module in &plan.modules {
      let name = module.coordinate().artifact_id.as_str();
      let node = self
        .graph
        .member(name)
        .ok_or_else(|| ConvoyError::internal(format!("planned member '{}' missing from graph", name)))?;

      let original = fs::read_to_string(&node.manifest_path)
        .with_context(|| format!("Failed to read {}", node.manifest_path.display()))?;
      let mut doc: DocumentMut = original
        .parse()
        .with_context(|| format!("Failed to parse {}", node.manifest_path.display()))?;

      self.rewrite_manifest(name, &mut doc, &recorded)?;

      let rewritten = doc.to_string();
      if rewritten != original {
        pending.push((node.manifest_path.clone(), original, rewritten));
      }
    }

    // Apply, restoring the originals if any write fails.
    let mut altered = Vec::with_capacity(pending.len());
    for (index, (path, _, rewritten)) in pending.iter().enumerate() {
      if let Err(err) = fs::write(path, rewritten) {
        for (written_path, original, _) in &pending[..index] {
          let _ = fs::write(written_path, original);
        }
        return Err(ConvoyError::from(err).context(format!("Failed to write {}", path.display())));
      }
      altered.push(path_to_git_format(&self.relative_manifest_path(path)?));
    }

    Ok(altered)
  }

  fn relative_manifest_path(&self, manifest_path: &Path) -> ConvoyResult<PathBuf> {
    Ok(manifest_path.strip_prefix(self.workspace_root)?.to_path_buf())
  }

  fn rewrite_manifest(&self, member: &str, doc: &mut DocumentMut, recorded: &HashMap<&str, String>) -> ConvoyResult<()> {
    let version = recorded
      .get(member)
      .ok_or_else(|| ConvoyError::internal(format!("no recorded version for member '{}'", member)))?;

    let Some(package) = doc.get_mut("package").and_then(|p| p.as_table_mut()) else {
      return Err(ConvoyError::message(format!(
        "No [package] section in manifest of '{}'",
        member
      )));
    };
    package["version"] = toml_edit::value(version.as_str());

    for table_name in DEPENDENCY_TABLES {
      let dev_table = table_name == "dev-dependencies";
      if let Some(deps) = doc.get_mut(table_name).and_then(|t| t.as_table_like_mut()) {
        for (key, item) in deps.iter_mut() {
          let dep_name = dependency_package_name(&key, item);
          match recorded.get(dep_name.as_str()) {
            Some(dep_version) => pin_dependency_version(item, dep_version),
            // Dev-dependencies never block a release; they are not part of
            // the published artifact.
            None if !dev_table => {
              if let Some(req) = dependency_version_req(item)
                && req.contains(SNAPSHOT_MARKER)
              {
                return Err(ConvoyError::Validation(ValidationError::SnapshotDependency {
                  module: member.to_string(),
                  dependency: format!("{} = \"{}\"", dep_name, req),
                }));
              }
            }
            None => {}
          }
        }
      }
    }

    Ok(())
  }
}

/// Resolve the package a dependency entry refers to (honoring `package =` renames).
fn dependency_package_name(key: &toml_edit::KeyMut<'_>, item: &Item) -> String {
  let renamed = match item {
    Item::Value(Value::InlineTable(table)) => table.get("package").and_then(Value::as_str),
    Item::Table(table) => table.get("package").and_then(Item::as_str),
    _ => None,
  };
  renamed.unwrap_or(key.get()).to_string()
}

/// The version requirement of a dependency entry, if it carries one.
fn dependency_version_req(item: &Item) -> Option<String> {
  match item {
    Item::Value(Value::String(req)) => Some(req.value().to_string()),
    Item::Value(Value::InlineTable(table)) => table.get("version").and_then(Value::as_str).map(str::to_string),
    Item::Table(table) => table.get("version").and_then(Item::as_str).map(str::to_string),
    _ => None,
  }
}

/// Pin a member dependency's version requirement to the recorded version.
///
/// Entries without a version requirement (pure path dependencies) are left
/// alone; cargo resolves them by path.
fn pin_dependency_version(item: &mut Item, version: &str) {
  match item {
    Item::Value(Value::String(_)) => {
      *item = toml_edit::value(version);
    }
    Item::Value(Value::InlineTable(table)) => {
      if table.contains_key("version") {
        table.insert("version", version.into());
      }
    }
    Item::Table(table) => {
      if table.contains_key("version") {
        table.insert("version", toml_edit::value(version));
      }
    }
    _ => {}
  }
}
