//! Integration tests for `cargo convoy cleanup`

use crate::helpers::{TestWorkspace, run_convoy, run_convoy_raw};
use anyhow::Result;

#[test]
fn cleanup_restores_manifests_byte_exact() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.commit("Initial crates")?;

  let original = ws.read_file("crates/lib-a/Cargo.toml")?;

  run_convoy(&ws.path, &["prepare"])?;
  assert_ne!(ws.read_file("crates/lib-a/Cargo.toml")?, original);

  run_convoy(&ws.path, &["cleanup"])?;
  assert_eq!(ws.read_file("crates/lib-a/Cargo.toml")?, original);

  assert!(!ws.file_exists(".modules-to-build.list"));
  assert!(!ws.file_exists(".files-to-revert.list"));

  // The durable record stays
  assert!(ws.file_exists(".release-info.json"));
  assert_eq!(ws.tags()?.len(), 1);

  Ok(())
}

#[test]
fn cleanup_without_prepare_is_a_user_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.commit("Initial crates")?;

  let output = run_convoy_raw(&ws.path, &["cleanup"])?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("does not exist"));

  Ok(())
}

#[test]
fn work_tree_is_clean_after_a_full_cycle() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("lib-a", 1, &[])?;
  ws.add_crate("lib-b", 1, &["lib-a"])?;
  ws.commit("Initial crates")?;

  run_convoy(&ws.path, &["prepare"])?;
  run_convoy(&ws.path, &["cleanup"])?;

  let status = crate::helpers::git(&ws.path, &["status", "--porcelain"])?;
  assert!(
    String::from_utf8_lossy(&status.stdout).trim().is_empty(),
    "cycle must leave the tree clean"
  );

  Ok(())
}
