//! `cargo convoy prepare` - Decide, record, and tag a release cycle
//!
//! The cycle, in order:
//!
//! 1. Guards: clean working tree, no hand-off leftovers from an uncompleted
//!    previous cycle.
//! 2. Decision: load the ledger, run the reactor.
//! 3. Enactment: rewrite member manifests to the recorded versions, write
//!    the hand-off files, store and commit the new ledger entry, create the
//!    annotated tag at HEAD carrying the ledger payload, optionally push.
//!
//! Building and publishing are the host pipeline's job: it consumes
//! `.modules-to-build.list` and calls `cargo convoy cleanup` when done.

use crate::commands::cycle::{CycleFlags, describe_module, run_reactor};
use crate::core::context::WorkspaceContext;
use crate::core::error::{ConvoyError, ConvoyResult, Outcome};
use crate::core::handoff;
use crate::core::vcs::SystemGit;
use crate::ledger::{LedgerStorage, RELEASE_INFO_FILE};
use crate::manifest::ManifestUpdater;
use std::path::Path;

pub fn run_prepare(
  ctx: &WorkspaceContext,
  bugfix: bool,
  force_release: Vec<String>,
  no_changes_action: Option<String>,
  push: bool,
  remote: String,
) -> ConvoyResult<Outcome> {
  let git = SystemGit::open(ctx.workspace_root())?;

  git.error_if_not_clean()?;
  handoff::error_if_leftover(ctx.workspace_root())?;

  let flags = CycleFlags {
    bugfix,
    force_release,
    no_changes_action,
    show_progress: true,
  };

  let Some(plan) = run_reactor(ctx, &git, &flags)? else {
    println!("✅ Nothing to release: no member changed since the previous release");
    return Ok(Outcome::NothingToRelease);
  };

  if plan.tag_name.is_empty() {
    return Err(ConvoyError::internal(format!(
      "release plan {} has no tag name",
      plan.plan_id()?
    )));
  }

  println!("📦 Preparing release {}", plan.tag_name);
  println!("   Plan: {}", plan.plan_id()?);
  println!();
  for module in &plan.modules {
    println!("  {}", describe_module(module));
  }
  println!();

  // Rewrite manifests first: everything up to here is revertible locally.
  let updater = ManifestUpdater::new(ctx.workspace_root(), &ctx.graph);
  let altered = updater.update_versions(&plan)?;
  println!("   Rewrote {} manifest(s)", altered.len());

  let (modules_file, reverts_file) = handoff::paths(ctx.workspace_root());
  handoff::write_lines(&modules_file, &plan.paths_to_build())?;
  handoff::write_lines(&reverts_file, &altered)?;
  println!("   Wrote {}", handoff::MODULES_TO_BUILD_FILE);
  println!("   Wrote {}", handoff::FILES_TO_REVERT_FILE);

  // One serialize step feeds both the ledger file and the tag message.
  let ledger = LedgerStorage::new(ctx.workspace_root());
  let payload = ledger.store(&plan.release_info())?;
  git.add_and_commit(
    &[Path::new(RELEASE_INFO_FILE)],
    &format!("Record release {}", plan.tag_name),
  )?;
  println!("   Updated {}", RELEASE_INFO_FILE);

  git.create_annotated_tag(&plan.tag_name, &payload)?;
  println!("   Created tag {}", plan.tag_name);

  if push {
    if !git.has_remote(&remote)? {
      return Err(ConvoyError::with_help(
        format!("Remote '{}' is not configured", remote),
        "Add it with `git remote add` or prepare without --push.",
      ));
    }
    git.push(&remote, &plan.tag_name)?;
    println!("   Pushed {} to {}", plan.tag_name, remote);
  }

  let to_release = plan.modules_to_release().count();
  println!();
  println!("✅ Prepared {} member(s) for release", to_release);
  println!();
  println!("Next steps:");
  println!("  build and publish the members listed in {}", handoff::MODULES_TO_BUILD_FILE);
  println!("  cargo convoy cleanup");
  if !push {
    println!("  git push {} {} {}", remote, git.current_branch()?, plan.tag_name);
  }

  Ok(Outcome::Completed)
}
