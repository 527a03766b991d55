//! Next-version computation with branch-consistency rules
//!
//! A coordinate's released history follows exactly one of two lines: the
//! regular line (`major.minor`, minor incremented each release) or the bugfix
//! line (`major.minor.bugfix`, bugfix incremented each release). The namer
//! refuses to mix the two implicitly.

use crate::core::error::{ConvoyResult, ValidationError};
use crate::version::model::{Coordinate, FixVersion, ModuleVersion, ReleaseInfo, SnapshotVersion};

/// Computes the next version for each module of a release cycle.
pub struct VersionNamer<'a> {
  bugfix_release: bool,
  previous_release: &'a ReleaseInfo,
}

impl<'a> VersionNamer<'a> {
  pub fn new(bugfix_release: bool, previous_release: &'a ReleaseInfo) -> Self {
    Self {
      bugfix_release,
      previous_release,
    }
  }

  /// Compute the next version for the given module.
  ///
  /// Fails with a validation error when the working copy is older than what
  /// was already released, when a bugfix release has no baseline, or when a
  /// regular release would follow a bugfix-line release.
  pub fn next_version(&self, artifact: &Coordinate, snapshot: SnapshotVersion) -> ConvoyResult<FixVersion> {
    let previous = self.previous_release.version_for_artifact(artifact);
    self.check_snapshot_age(artifact, snapshot, previous)?;
    match previous {
      Some(previous) => self.followup_version(artifact, snapshot, previous),
      None => self.initial_version(artifact, snapshot),
    }
  }

  fn check_snapshot_age(
    &self,
    artifact: &Coordinate,
    snapshot: SnapshotVersion,
    previous: Option<&ModuleVersion>,
  ) -> ConvoyResult<()> {
    if let Some(previous) = previous
      && previous.version.major_version > snapshot.major_version
    {
      return Err(
        ValidationError::SnapshotOlderThanRelease {
          artifact: artifact.to_string(),
          snapshot_major: snapshot.major_version,
          released: previous.version.to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn initial_version(&self, artifact: &Coordinate, snapshot: SnapshotVersion) -> ConvoyResult<FixVersion> {
    if self.bugfix_release {
      return Err(
        ValidationError::BugfixRequiresBaseline {
          artifact: artifact.to_string(),
        }
        .into(),
      );
    }
    Ok(FixVersion::new(snapshot.major_version, 0))
  }

  fn followup_version(
    &self,
    artifact: &Coordinate,
    snapshot: SnapshotVersion,
    previous: &ModuleVersion,
  ) -> ConvoyResult<FixVersion> {
    let previous = &previous.version;
    if self.bugfix_release {
      return Ok(FixVersion::bugfix(
        previous.major_version,
        previous.minor_version,
        previous.bugfix_version.unwrap_or(0) + 1,
      ));
    }
    if previous.is_bugfix_line() {
      return Err(
        ValidationError::RegularAfterBugfix {
          artifact: artifact.to_string(),
          released: previous.to_string(),
        }
        .into(),
      );
    }
    if snapshot.major_version > previous.major_version {
      // A major bump in the working copy resets the minor counter.
      Ok(FixVersion::new(snapshot.major_version, 0))
    } else {
      Ok(FixVersion::new(previous.major_version, previous.minor_version + 1))
    }
  }
}
