//! Per-module change detection over git history
//!
//! Answers one question: did anything relevant to a module change since the
//! previous release? The walk runs backwards from HEAD, bounded below by the
//! previous release tag, and is scoped by pathspecs:
//!
//! - sub-modules look only at their own directory,
//! - nested member directories are excluded (they release independently),
//! - the release ledger file is excluded anywhere in the tree, so writing the
//!   ledger never marks a module as changed on the next cycle.
//!
//! A single-member repository with no nested members applies no path scoping
//! beyond the ledger exclude.

use crate::core::error::ConvoyResult;
use crate::core::vcs::SystemGit;
use crate::ledger::RELEASE_INFO_FILE;

/// Relative path of the module that is the repository root.
pub const ROOT_MODULE_PATH: &str = ".";

/// Query seam for the reactor: answers "changed since the reference tag".
///
/// Implementations must be usable from parallel detection passes.
pub trait ChangeDetector: Sync {
  /// Whether anything under `module_path` changed between `reference_tag`
  /// and HEAD, ignoring the nested member directories in `child_paths` and
  /// the release ledger.
  fn has_changed_since(&self, module_path: &str, child_paths: &[String], reference_tag: &str) -> ConvoyResult<bool>;
}

/// Change detection backed by `git rev-list` path filtering.
pub struct DiffDetector<'a> {
  git: &'a SystemGit,
}

impl<'a> DiffDetector<'a> {
  pub fn new(git: &'a SystemGit) -> Self {
    Self { git }
  }

  fn pathspecs(module_path: &str, child_paths: &[String]) -> Vec<String> {
    let is_root_module = module_path == ROOT_MODULE_PATH;
    let is_multi_module = !is_root_module || !child_paths.is_empty();

    let mut specs = Vec::new();
    if is_multi_module {
      if !is_root_module {
        // For sub-modules, look for changes only in the sub-module path...
        specs.push(module_path.to_string());
      }
      // ...but ignore nested members, which change independently.
      for child in child_paths {
        specs.push(format!(":(exclude){}", child));
      }
    }
    specs.push(format!(":(glob,exclude)**/{}", RELEASE_INFO_FILE));
    specs
  }
}

impl ChangeDetector for DiffDetector<'_> {
  fn has_changed_since(&self, module_path: &str, child_paths: &[String], reference_tag: &str) -> ConvoyResult<bool> {
    let specs = Self::pathspecs(module_path, child_paths);
    let first = self.git.first_changed_commit(reference_tag, &specs)?;
    Ok(first.is_some())
  }
}
