//! Durable storage for the most recent release record
//!
//! The ledger lives at the workspace root as `.release-info.json` and is
//! version-controlled: it is read once at the start of a cycle and written
//! (then committed) once at the end. The serialized payload doubles as the
//! annotated release tag's message, so there is no second source of truth to
//! drift.

use crate::core::error::{ConvoyResult, ResultExt};
use crate::version::ReleaseInfo;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the release ledger, relative to the workspace root.
pub const RELEASE_INFO_FILE: &str = ".release-info.json";

/// Reads and writes the release ledger.
pub struct LedgerStorage {
  root: PathBuf,
}

impl LedgerStorage {
  pub fn new(workspace_root: &Path) -> Self {
    Self {
      root: workspace_root.to_path_buf(),
    }
  }

  /// Absolute path of the ledger file.
  pub fn path(&self) -> PathBuf {
    self.root.join(RELEASE_INFO_FILE)
  }

  /// Load the previous release record, or an empty record if this repository
  /// has never released.
  pub fn load(&self) -> ConvoyResult<ReleaseInfo> {
    let path = self.path();
    if !path.exists() {
      return Ok(ReleaseInfo::empty());
    }
    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read release ledger {}", path.display()))?;
    let info: ReleaseInfo = serde_json::from_str(&content)
      .with_context(|| format!("Failed to parse release ledger {}", path.display()))?;
    Ok(info)
  }

  /// Serialize a release record to its canonical on-disk form.
  ///
  /// The same string is used for the ledger file and the tag message.
  pub fn serialize(info: &ReleaseInfo) -> ConvoyResult<String> {
    let mut payload = serde_json::to_string_pretty(info)?;
    payload.push('\n');
    Ok(payload)
  }

  /// Write the release record, replacing any previous one.
  ///
  /// Returns the serialized payload so the caller can reuse it as the tag
  /// message without serializing twice.
  pub fn store(&self, info: &ReleaseInfo) -> ConvoyResult<String> {
    let payload = Self::serialize(info)?;
    let path = self.path();
    fs::write(&path, &payload).with_context(|| format!("Failed to write release ledger {}", path.display()))?;
    Ok(payload)
  }
}
