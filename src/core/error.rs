//! Error types for cargo-convoy with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and maps
//! each category to a distinct process exit code, so CI pipelines can react to
//! "nothing to release" differently from a broken repository or a bad version
//! lineage.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cargo-convoy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// Git or I/O error (history access, subprocess failure)
  Git = 2,
  /// Validation failure (version lineage, dirty tree, hand-off leftovers)
  Validation = 3,
  /// Nothing to release (expected outcome, distinct from success)
  NothingToRelease = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Outcome of a release cycle command, for commands that can legitimately
/// finish without anything to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Completed,
  NothingToRelease,
}

/// Main error type for cargo-convoy
#[derive(Debug)]
pub enum ConvoyError {
  /// User-correctable precondition violations
  Validation(ValidationError),

  /// Git operation errors (history access, tag resolution)
  Git(GitError),

  /// No module changed and the no-changes policy is fail-build
  NoChanges,

  /// Programming-defect signals, not user-correctable
  Internal(String),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ConvoyError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ConvoyError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ConvoyError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Internal invariant violation
  pub fn internal(msg: impl Into<String>) -> Self {
    ConvoyError::Internal(msg.into())
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ConvoyError::Message { message, context, help } => ConvoyError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ConvoyError::Validation(_) => ExitCode::Validation,
      ConvoyError::Git(_) => ExitCode::Git,
      ConvoyError::NoChanges => ExitCode::NothingToRelease,
      ConvoyError::Internal(_) => ExitCode::User,
      ConvoyError::Io(_) => ExitCode::Git,
      ConvoyError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ConvoyError::Validation(e) => e.help_message(),
      ConvoyError::Git(e) => e.help_message(),
      ConvoyError::NoChanges => Some(
        "No module changed since the previous release. Use --no-changes-action release-all to re-release everything."
          .to_string(),
      ),
      ConvoyError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ConvoyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConvoyError::Validation(e) => write!(f, "{}", e),
      ConvoyError::Git(e) => write!(f, "{}", e),
      ConvoyError::NoChanges => write!(f, "No changes detected in any module and the no-changes action is fail-build"),
      ConvoyError::Internal(msg) => write!(f, "Internal error: {}", msg),
      ConvoyError::Io(e) => write!(f, "I/O error: {}", e),
      ConvoyError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ConvoyError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConvoyError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ConvoyError {
  fn from(err: io::Error) -> Self {
    ConvoyError::Io(err)
  }
}

impl From<ValidationError> for ConvoyError {
  fn from(err: ValidationError) -> Self {
    ConvoyError::Validation(err)
  }
}

impl From<GitError> for ConvoyError {
  fn from(err: GitError) -> Self {
    ConvoyError::Git(err)
  }
}

impl From<String> for ConvoyError {
  fn from(msg: String) -> Self {
    ConvoyError::message(msg)
  }
}

impl From<&str> for ConvoyError {
  fn from(msg: &str) -> Self {
    ConvoyError::message(msg)
  }
}

impl From<cargo_metadata::Error> for ConvoyError {
  fn from(err: cargo_metadata::Error) -> Self {
    ConvoyError::message(format!("Cargo metadata error: {}", err))
  }
}

impl From<toml_edit::TomlError> for ConvoyError {
  fn from(err: toml_edit::TomlError) -> Self {
    ConvoyError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ConvoyError {
  fn from(err: toml_edit::de::Error) -> Self {
    ConvoyError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for ConvoyError {
  fn from(err: toml_edit::ser::Error) -> Self {
    ConvoyError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for ConvoyError {
  fn from(err: serde_json::Error) -> Self {
    ConvoyError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ConvoyError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ConvoyError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for ConvoyError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ConvoyError::message(format!("Path strip prefix error: {}", err))
  }
}

impl From<anyhow::Error> for ConvoyError {
  fn from(err: anyhow::Error) -> Self {
    ConvoyError::message(err.to_string())
  }
}

/// User-correctable precondition violations.
///
/// These abort the cycle before anything is written and are never retried.
#[derive(Debug)]
pub enum ValidationError {
  /// Working copy carries an older major version than an already-released one
  SnapshotOlderThanRelease {
    artifact: String,
    snapshot_major: u64,
    released: String,
  },

  /// Bugfix release requested for a module with no prior release
  BugfixRequiresBaseline { artifact: String },

  /// Regular release requested on top of a bugfix-line release
  RegularAfterBugfix { artifact: String, released: String },

  /// Module manifest version does not carry the -SNAPSHOT marker
  NotASnapshot { artifact: String, version: String },

  /// Working tree has uncommitted changes
  DirtyWorkTree { summary: String },

  /// Hand-off file left behind by a previous, uncompleted cycle
  HandoffFileExists { path: PathBuf },

  /// A member depends on an unreleased crate outside the build
  SnapshotDependency { module: String, dependency: String },

  /// Member dependency graph contains a cycle
  DependencyCycle { member: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::SnapshotOlderThanRelease { .. } => {
        Some("Bump the module's major version in Cargo.toml to at least the released one.".to_string())
      }
      ValidationError::BugfixRequiresBaseline { .. } => {
        Some("Run a regular release first; bugfix releases need a released baseline.".to_string())
      }
      ValidationError::RegularAfterBugfix { .. } => {
        Some("Bugfix lines only continue with --bugfix. Merge the line back manually to resume regular releases.".to_string())
      }
      ValidationError::NotASnapshot { .. } => {
        Some("Unreleased module versions must look like \"1.0.0-SNAPSHOT\".".to_string())
      }
      ValidationError::DirtyWorkTree { .. } => {
        Some("Commit or stash your changes before preparing a release.".to_string())
      }
      ValidationError::HandoffFileExists { .. } => {
        Some("Run `cargo convoy cleanup` to finish the previous cycle, then retry.".to_string())
      }
      ValidationError::SnapshotDependency { .. } => {
        Some("Release the dependency first or pin a released version.".to_string())
      }
      ValidationError::DependencyCycle { .. } => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::SnapshotOlderThanRelease {
        artifact,
        snapshot_major,
        released,
      } => {
        write!(
          f,
          "Snapshot version of {} (major {}) is older than the previously released {}",
          artifact, snapshot_major, released
        )
      }
      ValidationError::BugfixRequiresBaseline { artifact } => {
        write!(f, "A previous release is required when creating a bugfix release of {}", artifact)
      }
      ValidationError::RegularAfterBugfix { artifact, released } => {
        write!(
          f,
          "Previous release {} of {} is on the bugfix line; a regular release cannot follow it",
          released, artifact
        )
      }
      ValidationError::NotASnapshot { artifact, version } => {
        write!(f, "Version '{}' of {} is not an unreleased (-SNAPSHOT) version", version, artifact)
      }
      ValidationError::DirtyWorkTree { summary } => {
        write!(f, "Working tree is not clean:\n{}", summary)
      }
      ValidationError::HandoffFileExists { path } => {
        write!(f, "Hand-off file already exists: {}", path.display())
      }
      ValidationError::SnapshotDependency { module, dependency } => {
        write!(f, "Module {} references snapshot dependency {}", module, dependency)
      }
      ValidationError::DependencyCycle { member } => {
        write!(f, "Dependency cycle detected involving member '{}'", member)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Reference (tag, commit) could not be resolved
  RefNotFound { reference: String },

  /// Push failed
  PushFailed { remote: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      GitError::RefNotFound { reference } => Some(format!(
        "Fetch tags (`git fetch --tags`) or check that '{}' exists.",
        reference
      )),
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first.".to_string())
        } else {
          None
        }
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::RefNotFound { reference } => {
        write!(f, "Git reference not found: {}", reference)
      }
      GitError::PushFailed { remote, reason } => {
        write!(f, "Push to {} failed: {}", remote, reason)
      }
    }
  }
}

/// Result type alias for cargo-convoy
pub type ConvoyResult<T> = Result<T, ConvoyError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ConvoyResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ConvoyResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ConvoyError>,
{
  fn context(self, ctx: impl Into<String>) -> ConvoyResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ConvoyResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ConvoyError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
