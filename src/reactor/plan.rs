//! Release plan types: the reactor's output, serializable for review
//!
//! A plan is the full ordered member list (not only the released ones), so
//! the host can compute both "what to build" and "what to record". Plans are
//! JSON-serializable and carry a content-hash id: same input state, same id.

use crate::core::error::ConvoyResult;
use crate::version::model::{Coordinate, ModuleVersion, ReleaseInfo};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Action to take when no module changed since the previous release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoChangesAction {
  /// Re-release every module (keeps the ledger fresh and reproducible)
  #[default]
  ReleaseAll,
  /// Report "nothing to release" and stop, not an error
  ReleaseNone,
  /// Fail the cycle
  FailBuild,
}

impl NoChangesAction {
  pub fn parse(s: &str) -> ConvoyResult<Self> {
    match s.to_lowercase().as_str() {
      "release-all" => Ok(Self::ReleaseAll),
      "release-none" => Ok(Self::ReleaseNone),
      "fail-build" => Ok(Self::FailBuild),
      _ => Err(
        format!(
          "Unknown no-changes action '{}'. Valid actions: release-all, release-none, fail-build",
          s
        )
        .into(),
      ),
    }
  }
}

/// Plan identifier (SHA256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// One member's decision for the current cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasableModule {
  /// Member directory relative to the workspace root
  pub relative_path: String,
  /// The version recorded for this cycle: freshly named when releasing,
  /// carried over from the previous record otherwise
  pub module_version: ModuleVersion,
  pub to_be_released: bool,
}

impl ReleasableModule {
  pub fn coordinate(&self) -> &Coordinate {
    &self.module_version.artifact
  }
}

/// The reactor's decision list for one release cycle, in build order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePlan {
  pub tag_name: String,
  pub modules: Vec<ReleasableModule>,
}

impl ReleasePlan {
  /// The release record to persist and embed in the annotated tag.
  pub fn release_info(&self) -> ReleaseInfo {
    ReleaseInfo {
      tag_name: Some(self.tag_name.clone()),
      modules: self.modules.iter().map(|m| m.module_version.clone()).collect(),
    }
  }

  /// Members marked for release, in build order.
  pub fn modules_to_release(&self) -> impl Iterator<Item = &ReleasableModule> {
    self.modules.iter().filter(|m| m.to_be_released)
  }

  /// Relative paths of the members to build, in build order.
  pub fn paths_to_build(&self) -> Vec<String> {
    self.modules_to_release().map(|m| m.relative_path.clone()).collect()
  }

  /// Content-hash identifier of this plan.
  pub fn plan_id(&self) -> ConvoyResult<PlanId> {
    let contents = serde_json::to_vec(self)?;
    Ok(PlanId::from_contents(&contents))
  }
}
