//! System git backend - zero dependencies, maximum performance
//!
//! Uses git plumbing commands for all operations. Optimized for:
//! - Bounded history queries (rev-list with pathspec filters)
//! - Safe subprocess execution (isolated environment)
//! - One subprocess call per query, no persistent state

use crate::core::error::{ConvoyError, ConvoyResult, GitError, ResultExt, ValidationError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// One subprocess call, to verify the path is inside a work tree.
  pub fn open(path: &Path) -> ConvoyResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ConvoyError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ConvoyError::message(format!("Failed to open git repository: {}", stderr)));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Get current branch name
  pub fn current_branch(&self) -> ConvoyResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .context("Failed to get current branch")?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Error if the working tree has uncommitted changes.
  ///
  /// A release cycle must start from committed state: decisions are anchored
  /// to HEAD, and uncommitted edits would be invisible to the tag.
  pub fn error_if_not_clean(&self) -> ConvoyResult<()> {
    let output = self
      .git_cmd()
      .args(["status", "--porcelain"])
      .output()
      .context("Failed to get git status")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ConvoyError::Git(GitError::CommandFailed {
        command: "git status --porcelain".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    let summary = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    if summary.is_empty() {
      Ok(())
    } else {
      Err(ConvoyError::Validation(ValidationError::DirtyWorkTree { summary }))
    }
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    // Set working directory
    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
