//! The per-cycle release planner
//!
//! Decides, for an ordered member graph, which members release and at what
//! version. Three passes:
//!
//! 1. **Detection** (parallel): each non-forced member asks the change
//!    detector whether anything under its paths changed since the previous
//!    release tag. Queries are independent read-only git walks.
//! 2. **Propagation** (sequential, build order): forced membership, own
//!    changes, then contagion — a member releases when any of its
//!    dependencies releases. Dependencies precede dependents in build order,
//!    so one forward pass suffices.
//! 3. **Versioning**: the namer runs for every member, released or not; the
//!    recorded version for an unreleased member is its previous record
//!    carried over, or the freshly computed initial version when none exists.
//!
//! Any per-member failure aborts the whole cycle: propagation and the ledger
//! write need complete, consistent information across all members.

use crate::core::error::{ConvoyError, ConvoyResult};
use crate::detect::ChangeDetector;
use crate::reactor::plan::{NoChangesAction, ReleasableModule, ReleasePlan};
use crate::ui::progress::MultiProgress;
use crate::version::model::{Coordinate, ModuleVersion, ReleaseInfo, SnapshotVersion};
use crate::version::namer::VersionNamer;
use chrono::{DateTime, FixedOffset, Local, Utc};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Host-supplied description of one member, in build order.
#[derive(Debug, Clone)]
pub struct ReactorModule {
  pub relative_path: String,
  pub coordinate: Coordinate,
  pub snapshot: SnapshotVersion,
  /// Artifact ids of the members this member depends on
  pub dependencies: Vec<String>,
  /// Member directories nested under this member's directory
  pub child_paths: Vec<String>,
}

/// Cycle-wide planning options.
#[derive(Debug, Clone)]
pub struct PlanOptions {
  /// Relative paths forced to release even without detected changes
  pub forced: BTreeSet<String>,
  pub no_changes_action: NoChangesAction,
  pub bugfix_release: bool,
  /// Prefix of the cycle tag, e.g. `CONVOY_RELEASE`
  pub tag_prefix: String,
  /// Draw a progress bar during the detection pass
  pub show_progress: bool,
}

/// The per-cycle planner.
pub struct Reactor<'a> {
  detector: &'a dyn ChangeDetector,
  previous_release: &'a ReleaseInfo,
}

impl<'a> Reactor<'a> {
  pub fn new(detector: &'a dyn ChangeDetector, previous_release: &'a ReleaseInfo) -> Self {
    Self {
      detector,
      previous_release,
    }
  }

  /// Plan the cycle for members given in build order.
  ///
  /// Returns `None` when nothing changed and the no-changes action is
  /// release-none: there is nothing to do, and that is not an error.
  pub fn plan(&self, modules: &[ReactorModule], options: &PlanOptions) -> ConvoyResult<Option<ReleasePlan>> {
    let changed = self.detect_changes(modules, options)?;

    // Propagation pass: a release is contagious upward through the
    // dependency graph, never downward.
    let mut released_by_artifact: HashMap<&str, bool> = HashMap::new();
    let mut flags: Vec<bool> = Vec::with_capacity(modules.len());
    for module in modules {
      let to_be_released = options.forced.contains(&module.relative_path)
        || changed.get(module.relative_path.as_str()).copied().unwrap_or(false)
        || module
          .dependencies
          .iter()
          .any(|dep| released_by_artifact.get(dep.as_str()).copied().unwrap_or(false));
      released_by_artifact.insert(module.coordinate.artifact_id.as_str(), to_be_released);
      flags.push(to_be_released);
    }

    if !flags.iter().any(|released| *released) {
      match options.no_changes_action {
        NoChangesAction::ReleaseNone => return Ok(None),
        NoChangesAction::FailBuild => return Err(ConvoyError::NoChanges),
        NoChangesAction::ReleaseAll => flags.iter_mut().for_each(|released| *released = true),
      }
    }

    let release_date = Local::now().fixed_offset();
    let tag_name = cycle_tag(&options.tag_prefix, release_date);
    let namer = VersionNamer::new(options.bugfix_release, self.previous_release);

    let mut planned = Vec::with_capacity(modules.len());
    for (module, to_be_released) in modules.iter().zip(flags) {
      let next_version = namer.next_version(&module.coordinate, module.snapshot)?;
      let module_version = if to_be_released {
        ModuleVersion {
          release_date,
          release_tag: tag_name.clone(),
          artifact: module.coordinate.clone(),
          version: next_version,
        }
      } else {
        // Unreleased members keep their previous record verbatim; a member
        // without one records the computed initial version.
        self
          .previous_release
          .version_for_artifact(&module.coordinate)
          .cloned()
          .unwrap_or(ModuleVersion {
            release_date,
            release_tag: tag_name.clone(),
            artifact: module.coordinate.clone(),
            version: next_version,
          })
      };
      planned.push(ReleasableModule {
        relative_path: module.relative_path.clone(),
        module_version,
        to_be_released,
      });
    }

    Ok(Some(ReleasePlan {
      tag_name,
      modules: planned,
    }))
  }

  /// Detection pass: answers "changed since the previous release" per member.
  ///
  /// Forced members are skipped (their decision is already made). A member
  /// with no previous release record, or a repository with no release tag
  /// yet, has no baseline to diff against and counts as changed.
  fn detect_changes(&self, modules: &[ReactorModule], options: &PlanOptions) -> ConvoyResult<HashMap<String, bool>> {
    let reference_tag = self.previous_release.tag_name.as_deref();
    let candidates: Vec<&ReactorModule> = modules
      .iter()
      .filter(|m| !options.forced.contains(&m.relative_path))
      .collect();

    let progress = if options.show_progress && candidates.len() > 1 {
      let progress = MultiProgress::new();
      let bar = progress.add_bar(candidates.len(), "Detecting changes".to_string());
      Some((progress, bar))
    } else {
      None
    };

    candidates
      .par_iter()
      .map(|module| {
        let changed = match (reference_tag, self.previous_release.version_for_artifact(&module.coordinate)) {
          (Some(tag), Some(_)) => {
            self
              .detector
              .has_changed_since(&module.relative_path, &module.child_paths, tag)?
          }
          _ => true,
        };
        if let Some((progress, bar)) = &progress {
          progress.inc(bar);
        }
        Ok((module.relative_path.clone(), changed))
      })
      .collect()
  }
}

/// Tag name for a cycle: prefix plus the UTC release timestamp.
pub fn cycle_tag(prefix: &str, date: DateTime<FixedOffset>) -> String {
  format!("{}-{}", prefix, date.with_timezone(&Utc).format("%Y-%m-%d-%H%M%S"))
}
