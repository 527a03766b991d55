//! Integration tests for `cargo convoy plan`

use crate::helpers::{TestWorkspace, run_convoy, run_convoy_raw, wait_for_tag_tick};
use anyhow::Result;

fn plan_json(ws: &TestWorkspace, extra: &[&str]) -> Result<serde_json::Value> {
  let mut args = vec!["plan", "--json"];
  args.extend_from_slice(extra);
  let output = run_convoy(&ws.path, &args)?;
  Ok(serde_json::from_slice(&output.stdout)?)
}

fn module<'a>(plan: &'a serde_json::Value, path: &str) -> &'a serde_json::Value {
  plan["modules"]
    .as_array()
    .expect("modules array")
    .iter()
    .find(|m| m["relativePath"] == path)
    .unwrap_or_else(|| panic!("no module at path {}", path))
}

#[test]
fn first_cycle_plans_initial_versions_for_everything() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.add_crate("lib-b", 3, &["lib-a"])?;
  ws.commit("Initial crates")?;

  let plan = plan_json(&ws, &[])?;

  let a = module(&plan, "crates/lib-a");
  assert_eq!(a["toBeReleased"], true);
  assert_eq!(a["moduleVersion"]["version"]["majorVersion"], 1);
  assert_eq!(a["moduleVersion"]["version"]["minorVersion"], 0);
  assert_eq!(a["moduleVersion"]["artifact"]["groupId"], "demo");
  assert_eq!(a["moduleVersion"]["artifact"]["artifactId"], "lib-a");

  let b = module(&plan, "crates/lib-b");
  assert_eq!(b["toBeReleased"], true);
  assert_eq!(b["moduleVersion"]["version"]["majorVersion"], 3);
  assert_eq!(b["moduleVersion"]["version"]["minorVersion"], 0);

  // Build order: the dependency comes first
  let paths: Vec<&str> = plan["modules"]
    .as_array()
    .unwrap()
    .iter()
    .map(|m| m["relativePath"].as_str().unwrap())
    .collect();
  assert_eq!(paths, vec!["crates/lib-a", "crates/lib-b"]);

  Ok(())
}

#[test]
fn change_in_dependency_propagates_to_dependents_only() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.add_crate("lib-b", 1, &["lib-a"])?;
  ws.add_crate("lib-c", 1, &[])?;
  ws.commit("Initial crates")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  ws.write_file("crates/lib-a/src/lib.rs", "pub fn changed() {}\n")?;
  ws.commit("Change lib-a")?;

  let plan = plan_json(&ws, &["--no-changes-action", "release-none"])?;
  assert_eq!(module(&plan, "crates/lib-a")["toBeReleased"], true);
  assert_eq!(module(&plan, "crates/lib-b")["toBeReleased"], true, "dependent must follow");
  assert_eq!(module(&plan, "crates/lib-c")["toBeReleased"], false, "sibling stays put");

  // The untouched sibling keeps its previous record
  let c = module(&plan, "crates/lib-c");
  assert_eq!(c["moduleVersion"]["version"]["minorVersion"], 0);

  Ok(())
}

#[test]
fn unchanged_workspace_with_release_none_exits_nothing_to_release() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.commit("Initial crates")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  let output = run_convoy_raw(&ws.path, &["plan", "--no-changes-action", "release-none"])?;
  assert_eq!(output.status.code(), Some(4), "nothing-to-release exit code");
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Nothing to release"));

  Ok(())
}

#[test]
fn unchanged_workspace_with_fail_build_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.commit("Initial crates")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  let output = run_convoy_raw(&ws.path, &["plan", "--no-changes-action", "fail-build"])?;
  assert_eq!(output.status.code(), Some(4));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("fail-build") || stderr.contains("No changes"));

  Ok(())
}

#[test]
fn release_all_fallback_re_releases_every_member() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.add_crate("lib-b", 1, &[])?;
  ws.commit("Initial crates")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;
  wait_for_tag_tick();

  // Default action is release-all
  let plan = plan_json(&ws, &[])?;
  for path in ["crates/lib-a", "crates/lib-b"] {
    let m = module(&plan, path);
    assert_eq!(m["toBeReleased"], true);
    assert_eq!(m["moduleVersion"]["version"]["minorVersion"], 1, "minor bumped by fallback");
  }

  Ok(())
}

#[test]
fn nested_member_changes_do_not_mark_the_parent() -> Result<()> {
  let ws = TestWorkspace::with_members(&["server", "server/module-a"])?;
  ws.add_crate_at("server", "server", 1, &[])?;
  ws.add_crate_at("server/module-a", "module-a", 1, &[])?;
  ws.commit("Initial members")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  ws.write_file("server/module-a/src/lib.rs", "pub fn changed() {}\n")?;
  ws.commit("Change nested member only")?;

  let plan = plan_json(&ws, &["--no-changes-action", "release-none"])?;
  assert_eq!(module(&plan, "server/module-a")["toBeReleased"], true);
  assert_eq!(
    module(&plan, "server")["toBeReleased"],
    false,
    "nested member commits must not count as parent changes"
  );

  Ok(())
}

#[test]
fn parent_changes_still_mark_the_parent() -> Result<()> {
  let ws = TestWorkspace::with_members(&["server", "server/module-a"])?;
  ws.add_crate_at("server", "server", 1, &[])?;
  ws.add_crate_at("server/module-a", "module-a", 1, &[])?;
  ws.commit("Initial members")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  ws.write_file("server/src/lib.rs", "pub fn changed() {}\n")?;
  ws.commit("Change parent only")?;

  let plan = plan_json(&ws, &["--no-changes-action", "release-none"])?;
  assert_eq!(module(&plan, "server")["toBeReleased"], true);
  assert_eq!(module(&plan, "server/module-a")["toBeReleased"], false);

  Ok(())
}

#[test]
fn major_bump_in_manifest_resets_minor() -> Result<()> {
  let ws = TestWorkspace::single("solo", 1)?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  let manifest = ws.read_file("Cargo.toml")?;
  ws.write_file("Cargo.toml", &manifest.replace("1.0.0-SNAPSHOT", "2.0.0-SNAPSHOT"))?;
  ws.commit("Bump major")?;

  let plan = plan_json(&ws, &[])?;
  let solo = module(&plan, ".");
  assert_eq!(solo["moduleVersion"]["version"]["majorVersion"], 2);
  assert_eq!(solo["moduleVersion"]["version"]["minorVersion"], 0);

  Ok(())
}

#[test]
fn snapshot_older_than_release_is_a_validation_failure() -> Result<()> {
  let ws = TestWorkspace::single("solo", 2)?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  let manifest = ws.read_file("Cargo.toml")?;
  ws.write_file("Cargo.toml", &manifest.replace("2.0.0-SNAPSHOT", "1.0.0-SNAPSHOT"))?;
  ws.commit("Regress major")?;

  let output = run_convoy_raw(&ws.path, &["plan"])?;
  assert_eq!(output.status.code(), Some(3), "validation exit code");
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("older"));

  Ok(())
}

#[test]
fn bugfix_without_baseline_is_a_validation_failure() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.commit("Initial crates")?;

  let output = run_convoy_raw(&ws.path, &["plan", "--bugfix"])?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("previous release") || stderr.contains("bugfix"));

  Ok(())
}

#[test]
fn force_release_overrides_missing_changes() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.add_crate("lib-b", 1, &["lib-a"])?;
  ws.commit("Initial crates")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  let plan = plan_json(
    &ws,
    &["--force-release", "crates/lib-a", "--no-changes-action", "release-none"],
  )?;
  assert_eq!(module(&plan, "crates/lib-a")["toBeReleased"], true);
  assert_eq!(module(&plan, "crates/lib-b")["toBeReleased"], true, "forced release propagates");

  Ok(())
}

#[test]
fn force_release_rejects_unknown_paths() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.commit("Initial crates")?;

  let output = run_convoy_raw(&ws.path, &["plan", "--force-release", "crates/nope"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}
