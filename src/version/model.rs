//! Value types for release versioning
//!
//! The wire format (camelCase field names, optional bugfix component, ISO-8601
//! timestamps with offset) is shared between the `.release-info.json` ledger
//! and the annotated release tag message; both are produced from the same
//! in-memory value in a single serialize step.

use crate::core::error::{ConvoyResult, ValidationError};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker suffix carried by unreleased module versions.
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Published identity of a module: group + artifact, independent of version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
  pub group_id: String,
  pub artifact_id: String,
}

impl Coordinate {
  pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
    Self {
      group_id: group_id.into(),
      artifact_id: artifact_id.into(),
    }
  }
}

impl fmt::Display for Coordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.group_id, self.artifact_id)
  }
}

/// A released version number: `major.minor` on the regular line, or
/// `major.minor.bugfix` on the bugfix line.
///
/// Ordering is lexicographic with an absent bugfix component sorting lowest,
/// so `1.2 < 1.2.0 < 1.2.1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixVersion {
  pub major_version: u64,
  pub minor_version: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bugfix_version: Option<u64>,
}

impl FixVersion {
  pub fn new(major: u64, minor: u64) -> Self {
    Self {
      major_version: major,
      minor_version: minor,
      bugfix_version: None,
    }
  }

  pub fn bugfix(major: u64, minor: u64, bugfix: u64) -> Self {
    Self {
      major_version: major,
      minor_version: minor,
      bugfix_version: Some(bugfix),
    }
  }

  /// Whether this version belongs to the bugfix line.
  pub fn is_bugfix_line(&self) -> bool {
    self.bugfix_version.is_some()
  }

  /// Cargo-legal three-part rendering for manifest rewriting.
  ///
  /// The ledger keeps the canonical two/three-part form; manifests need full
  /// semver, so an absent bugfix component renders as `.0`.
  pub fn to_semver(&self) -> semver::Version {
    semver::Version::new(self.major_version, self.minor_version, self.bugfix_version.unwrap_or(0))
  }
}

impl fmt::Display for FixVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.bugfix_version {
      Some(bugfix) => write!(f, "{}.{}.{}", self.major_version, self.minor_version, bugfix),
      None => write!(f, "{}.{}", self.major_version, self.minor_version),
    }
  }
}

/// The unreleased-version marker a module carries between releases.
///
/// Parsed from the member's manifest version, which must be a semver version
/// with the `SNAPSHOT` pre-release tag, e.g. `2.0.0-SNAPSHOT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotVersion {
  pub major_version: u64,
}

impl SnapshotVersion {
  /// Extract the snapshot marker from a manifest version.
  pub fn from_manifest(artifact: &Coordinate, version: &semver::Version) -> ConvoyResult<Self> {
    if version.pre.as_str() != SNAPSHOT_MARKER {
      return Err(
        ValidationError::NotASnapshot {
          artifact: artifact.to_string(),
          version: version.to_string(),
        }
        .into(),
      );
    }
    Ok(Self {
      major_version: version.major,
    })
  }
}

impl fmt::Display for SnapshotVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.major_version, SNAPSHOT_MARKER)
  }
}

/// One released module's record. Created once per module per release and
/// superseded, never mutated, by the next release's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleVersion {
  pub release_date: DateTime<FixedOffset>,
  pub release_tag: String,
  pub artifact: Coordinate,
  pub version: FixVersion,
}

impl fmt::Display for ModuleVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}-{}", self.artifact, self.version, self.release_tag)
  }
}

/// The full release record: one entry per module, insertion order is release
/// order. Persisted to the ledger and embedded in the annotated release tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tag_name: Option<String>,
  #[serde(default)]
  pub modules: Vec<ModuleVersion>,
}

impl ReleaseInfo {
  /// Record for repositories that have never released.
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  /// Look up the record for a coordinate.
  ///
  /// A well-formed record has at most one entry per coordinate, but lookup
  /// tolerates duplicates by preferring the most recently added one.
  pub fn version_for_artifact(&self, artifact: &Coordinate) -> Option<&ModuleVersion> {
    self.modules.iter().rev().find(|m| &m.artifact == artifact)
  }
}

impl fmt::Display for ReleaseInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.tag_name {
      Some(tag) => write!(f, "{} ({} modules)", tag, self.modules.len()),
      None => write!(f, "<no release> ({} modules)", self.modules.len()),
    }
  }
}
