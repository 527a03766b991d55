//! Hand-off files between the prepare and cleanup steps
//!
//! `prepare` records its outcome in two line-delimited UTF-8 files at the
//! workspace root: the member paths to build, and the manifest paths that
//! were rewritten and must be reverted later. A leftover file means a
//! previous cycle never completed, so writes refuse to overwrite.

use crate::core::error::{ConvoyError, ConvoyResult, ResultExt, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};

/// Member relative paths to build, one per line, build order.
pub const MODULES_TO_BUILD_FILE: &str = ".modules-to-build.list";

/// Workspace-relative paths of files to revert after the build, one per line.
pub const FILES_TO_REVERT_FILE: &str = ".files-to-revert.list";

/// Write lines to a hand-off file, refusing to overwrite an existing one.
///
/// The file always ends with a newline.
pub fn write_lines(path: &Path, lines: &[String]) -> ConvoyResult<()> {
  if path.exists() {
    return Err(ConvoyError::Validation(ValidationError::HandoffFileExists {
      path: path.to_path_buf(),
    }));
  }
  let mut content = lines.join("\n");
  if !content.ends_with('\n') {
    content.push('\n');
  }
  fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}

/// Read the non-empty lines of a hand-off file.
pub fn read_lines(path: &Path) -> ConvoyResult<Vec<String>> {
  if !path.exists() {
    return Err(ConvoyError::with_help(
      format!("Hand-off file does not exist: {}", path.display()),
      "Run `cargo convoy prepare` first; cleanup only makes sense after a prepared cycle.",
    ));
  }
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  Ok(
    content
      .lines()
      .map(|line| line.trim().to_string())
      .filter(|line| !line.is_empty())
      .collect(),
  )
}

/// Fail when a hand-off file from a previous, uncompleted cycle is present.
pub fn error_if_leftover(workspace_root: &Path) -> ConvoyResult<()> {
  for name in [MODULES_TO_BUILD_FILE, FILES_TO_REVERT_FILE] {
    let path = workspace_root.join(name);
    if path.exists() {
      return Err(ConvoyError::Validation(ValidationError::HandoffFileExists { path }));
    }
  }
  Ok(())
}

/// Remove the hand-off files if present.
pub fn remove(workspace_root: &Path) -> ConvoyResult<()> {
  for name in [MODULES_TO_BUILD_FILE, FILES_TO_REVERT_FILE] {
    let path = workspace_root.join(name);
    if path.exists() {
      fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
  }
  Ok(())
}

/// Paths of the hand-off files for a workspace root.
pub fn paths(workspace_root: &Path) -> (PathBuf, PathBuf) {
  (
    workspace_root.join(MODULES_TO_BUILD_FILE),
    workspace_root.join(FILES_TO_REVERT_FILE),
  )
}
