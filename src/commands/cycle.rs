//! Shared release-cycle wiring for the plan and prepare commands

use crate::core::context::WorkspaceContext;
use crate::core::error::{ConvoyError, ConvoyResult};
use crate::core::vcs::SystemGit;
use crate::detect::DiffDetector;
use crate::ledger::LedgerStorage;
use crate::reactor::{PlanOptions, Reactor, ReactorModule, ReleasePlan};
use crate::version::{Coordinate, SnapshotVersion};
use std::collections::BTreeSet;

/// Flags shared by `plan` and `prepare`.
pub struct CycleFlags {
  pub bugfix: bool,
  pub force_release: Vec<String>,
  pub no_changes_action: Option<String>,
  pub show_progress: bool,
}

/// Run the decision engine for the current workspace state.
///
/// Loads the previous ledger entry, assembles the member list in build order,
/// and asks the reactor for a plan. Nothing is written.
pub fn run_reactor(ctx: &WorkspaceContext, git: &SystemGit, flags: &CycleFlags) -> ConvoyResult<Option<ReleasePlan>> {
  let ledger = LedgerStorage::new(ctx.workspace_root());
  let previous_release = ledger.load()?;
  if flags.show_progress {
    println!("Previous release: {}", previous_release);
  }

  // The reference marker must resolve before any per-member walk starts.
  if let Some(tag) = previous_release.tag_name.as_deref() {
    git.resolve_commit(tag)?;
  }

  let group = ctx.config.group(ctx.workspace_root());
  let mut modules = Vec::new();
  for node in ctx.graph.build_order()? {
    let coordinate = Coordinate::new(group.clone(), node.name.clone());
    let snapshot = SnapshotVersion::from_manifest(&coordinate, &node.version)?;
    modules.push(ReactorModule {
      relative_path: node.relative_path.clone(),
      coordinate,
      snapshot,
      dependencies: node.dependencies.clone(),
      child_paths: ctx.graph.nested_member_paths(&node.relative_path),
    });
  }

  let forced = forced_paths(&modules, &flags.force_release)?;
  let options = PlanOptions {
    forced,
    no_changes_action: ctx.config.no_changes_action(flags.no_changes_action.as_deref())?,
    bugfix_release: flags.bugfix,
    tag_prefix: ctx.config.tag_prefix(),
    show_progress: flags.show_progress,
  };

  let detector = DiffDetector::new(git);
  Reactor::new(&detector, &previous_release).plan(&modules, &options)
}

/// Validate --force-release entries against the member list.
fn forced_paths(modules: &[ReactorModule], requested: &[String]) -> ConvoyResult<BTreeSet<String>> {
  let known: BTreeSet<&str> = modules.iter().map(|m| m.relative_path.as_str()).collect();
  let mut forced = BTreeSet::new();
  for path in requested {
    let normalized = path.trim_end_matches('/');
    if !known.contains(normalized) {
      return Err(ConvoyError::with_help(
        format!("--force-release path '{}' is not a workspace member", path),
        format!("Member paths: {}", known.into_iter().collect::<Vec<_>>().join(", ")),
      ));
    }
    forced.insert(normalized.to_string());
  }
  Ok(forced)
}

/// One-line summary of a planned member for console output.
pub fn describe_module(module: &crate::reactor::ReleasableModule) -> String {
  if module.to_be_released {
    format!(
      "🚀 {}  {}  {}",
      module.relative_path,
      module.coordinate(),
      module.module_version.version
    )
  } else {
    format!(
      "⏭  {}  {}  {} (unchanged)",
      module.relative_path,
      module.coordinate(),
      module.module_version.version
    )
  }
}
