//! Configuration for cargo-convoy
//!
//! Searched in order: convoy.toml, .convoy.toml. All fields are optional;
//! command-line flags override configured values.
//!
//! ```toml
//! [release]
//! group = "de.example.platform"
//! tag-prefix = "CONVOY_RELEASE"
//! no-changes-action = "release-all"
//! ```

use crate::core::error::{ConvoyResult, ResultExt};
use crate::reactor::NoChangesAction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default prefix for release tags.
pub const DEFAULT_TAG_PREFIX: &str = "CONVOY_RELEASE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvoyConfig {
  #[serde(default)]
  pub release: ReleaseSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseSettings {
  /// Group id recorded in module coordinates
  #[serde(default)]
  pub group: Option<String>,

  /// Prefix of release tag names
  #[serde(default)]
  pub tag_prefix: Option<String>,

  /// Default action when no module changed
  #[serde(default)]
  pub no_changes_action: Option<String>,
}

impl ConvoyConfig {
  /// Find config file in search order: convoy.toml, .convoy.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![path.join("convoy.toml"), path.join(".convoy.toml")];
    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists.
  pub fn load(path: &Path) -> ConvoyResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ConvoyConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;
    Ok(config)
  }

  /// Validate configured values.
  pub fn validate(&self) -> ConvoyResult<()> {
    if let Some(action) = &self.release.no_changes_action {
      NoChangesAction::parse(action)?;
    }
    Ok(())
  }

  /// Coordinate group id: configured, or the workspace directory name.
  pub fn group(&self, workspace_root: &Path) -> String {
    self.release.group.clone().unwrap_or_else(|| {
      workspace_root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "workspace".to_string())
    })
  }

  /// Tag prefix: configured, or the default.
  pub fn tag_prefix(&self) -> String {
    self
      .release
      .tag_prefix
      .clone()
      .unwrap_or_else(|| DEFAULT_TAG_PREFIX.to_string())
  }

  /// No-changes action: CLI flag, then config, then release-all.
  pub fn no_changes_action(&self, flag: Option<&str>) -> ConvoyResult<NoChangesAction> {
    if let Some(flag) = flag {
      return NoChangesAction::parse(flag);
    }
    match &self.release.no_changes_action {
      Some(configured) => NoChangesAction::parse(configured),
      None => Ok(NoChangesAction::default()),
    }
  }
}
