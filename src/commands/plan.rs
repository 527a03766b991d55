//! `cargo convoy plan` - Show the release decisions for the current state
//!
//! Runs the full decision cycle (change detection, version naming,
//! dependency propagation) without writing anything: no ledger update, no
//! manifest rewrite, no tag. The printed plan is what `prepare` would enact.

use crate::commands::cycle::{CycleFlags, describe_module, run_reactor};
use crate::core::context::WorkspaceContext;
use crate::core::error::{ConvoyResult, Outcome};
use crate::core::vcs::SystemGit;
use crate::reactor::ReleasePlan;

pub fn run_plan(
  ctx: &WorkspaceContext,
  bugfix: bool,
  force_release: Vec<String>,
  no_changes_action: Option<String>,
  json: bool,
) -> ConvoyResult<Outcome> {
  let git = SystemGit::open(ctx.workspace_root())?;

  let flags = CycleFlags {
    bugfix,
    force_release,
    no_changes_action,
    show_progress: !json,
  };

  let Some(plan) = run_reactor(ctx, &git, &flags)? else {
    if json {
      println!("null");
    } else {
      println!("✅ Nothing to release: no member changed since the previous release");
    }
    return Ok(Outcome::NothingToRelease);
  };

  if json {
    print_json(&plan)?;
  } else {
    print_text(&plan)?;
  }

  Ok(Outcome::Completed)
}

fn print_json(plan: &ReleasePlan) -> ConvoyResult<()> {
  let output = serde_json::json!({
    "planId": plan.plan_id()?.to_string(),
    "tagName": plan.tag_name,
    "modules": plan.modules,
  });
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

fn print_text(plan: &ReleasePlan) -> ConvoyResult<()> {
  println!("📋 Release plan {}", plan.plan_id()?);
  println!("   Tag: {}", plan.tag_name);
  println!();

  for module in &plan.modules {
    println!("  {}", describe_module(module));
  }
  println!();

  let to_release = plan.modules_to_release().count();
  println!("{} of {} members to release", to_release, plan.modules.len());
  println!();
  println!("To enact this plan:");
  println!("  cargo convoy prepare");

  Ok(())
}
