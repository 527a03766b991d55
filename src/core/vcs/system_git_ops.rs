//! Additional operations for SystemGit (history queries, tags, commits)

use super::system_git::SystemGit;
use crate::core::error::{ConvoyError, ConvoyResult, GitError, ResultExt};
use std::path::Path;

impl SystemGit {
  /// Resolve a revision (tag name, SHA, ref) to a commit SHA.
  ///
  /// Annotated tags are peeled to the commit they point at.
  pub fn resolve_commit(&self, revision: &str) -> ConvoyResult<String> {
    let spec = format!("{}^{{commit}}", revision);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &spec])
      .output()
      .context("Failed to run git rev-parse")?;

    if !output.status.success() {
      return Err(ConvoyError::Git(GitError::RefNotFound {
        reference: revision.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Find the first commit in `since..HEAD` matching the given pathspecs.
  ///
  /// The walk is bounded below by `since` and short-circuits at the first
  /// qualifying commit (`-n 1`); it never enumerates the full range.
  pub fn first_changed_commit(&self, since: &str, pathspecs: &[String]) -> ConvoyResult<Option<String>> {
    let range = format!("{}..HEAD", since);

    let mut cmd = self.git_cmd();
    cmd.args(["rev-list", "-n", "1", &range]);
    if !pathspecs.is_empty() {
      cmd.arg("--");
      for spec in pathspecs {
        cmd.arg(spec);
      }
    }

    let output = cmd.output().context("Failed to run git rev-list")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("unknown revision") {
        return Err(ConvoyError::Git(GitError::RefNotFound {
          reference: since.to_string(),
        }));
      }
      return Err(ConvoyError::Git(GitError::CommandFailed {
        command: format!("git rev-list {}", range),
        stderr: stderr.to_string(),
      }));
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if sha.is_empty() { None } else { Some(sha) })
  }

  /// Create an annotated tag at HEAD carrying the given message.
  pub fn create_annotated_tag(&self, name: &str, message: &str) -> ConvoyResult<()> {
    let output = self
      .git_cmd()
      .args(["tag", "-a", name, "-m", message])
      .output()
      .context("Failed to create tag")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ConvoyError::Git(GitError::CommandFailed {
        command: format!("git tag -a {}", name),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Stage the given paths and create a commit.
  pub fn add_and_commit(&self, paths: &[&Path], message: &str) -> ConvoyResult<()> {
    let mut add = self.git_cmd();
    add.arg("add").arg("--");
    for path in paths {
      add.arg(path);
    }
    let output = add.output().context("Failed to run git add")?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ConvoyError::Git(GitError::CommandFailed {
        command: "git add".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    let output = self
      .git_cmd()
      .args(["commit", "-m", message])
      .output()
      .context("Failed to run git commit")?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ConvoyError::Git(GitError::CommandFailed {
        command: "git commit".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Revert the given paths to their committed state.
  ///
  /// Returns false (without failing) when some path could not be reverted,
  /// so callers can decide whether that is fatal.
  pub fn revert_paths(&self, paths: &[&Path]) -> ConvoyResult<bool> {
    if paths.is_empty() {
      return Ok(true);
    }

    let mut cmd = self.git_cmd();
    cmd.arg("checkout").arg("--");
    for path in paths {
      cmd.arg(path);
    }

    let output = cmd.output().context("Failed to run git checkout")?;
    Ok(output.status.success())
  }

  /// Push the current branch and the given tag to the remote.
  pub fn push(&self, remote: &str, tag: &str) -> ConvoyResult<()> {
    let branch = self.current_branch()?;

    let output = self
      .git_cmd()
      .args(["push", remote, &branch, tag])
      .output()
      .context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ConvoyError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Check whether the repository has the given remote configured.
  pub fn has_remote(&self, name: &str) -> ConvoyResult<bool> {
    let output = self
      .git_cmd()
      .args(["remote"])
      .output()
      .context("Failed to list remotes")?;

    if !output.status.success() {
      return Ok(false);
    }

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|line| line.trim() == name),
    )
  }
}
