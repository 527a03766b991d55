//! `cargo convoy cleanup` - Revert prepared manifests, remove hand-off files
//!
//! Consumes the files-to-revert list written by `prepare`, restores the
//! listed files to their committed state, and removes both hand-off files.
//! The release ledger and the tag stay: they are the durable record.

use crate::core::context::WorkspaceContext;
use crate::core::error::{ConvoyError, ConvoyResult, Outcome};
use crate::core::handoff;
use crate::core::vcs::SystemGit;
use std::path::Path;

pub fn run_cleanup(ctx: &WorkspaceContext) -> ConvoyResult<Outcome> {
  let git = SystemGit::open(ctx.workspace_root())?;

  let (_, reverts_file) = handoff::paths(ctx.workspace_root());
  let files = handoff::read_lines(&reverts_file)?;

  let paths: Vec<&Path> = files.iter().map(Path::new).collect();
  if !git.revert_paths(&paths)? {
    // Keep the hand-off files: the next cleanup attempt needs the list.
    return Err(ConvoyError::with_help(
      "Could not revert changes - working directory is no longer clean",
      "Revert the files listed in .files-to-revert.list manually, then delete the hand-off files.",
    ));
  }

  handoff::remove(ctx.workspace_root())?;

  println!("✅ Reverted {} file(s) and removed hand-off files", files.len());
  Ok(Outcome::Completed)
}
