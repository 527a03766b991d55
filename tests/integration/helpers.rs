//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A test workspace with git history
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new multi-crate workspace with `crates/*` members
  pub fn new() -> Result<Self> {
    Self::with_members(&["crates/*"])
  }

  /// Create a workspace with an explicit member list
  pub fn with_members(members: &[&str]) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    // Initialize git repo with main as default branch
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    let member_list = members
      .iter()
      .map(|m| format!("\"{}\"", m))
      .collect::<Vec<_>>()
      .join(", ");
    std::fs::write(
      path.join("Cargo.toml"),
      format!(
        r#"[workspace]
members = [{}]
resolver = "2"
"#,
        member_list
      ),
    )?;

    // Deterministic coordinate group for assertions
    std::fs::write(path.join("convoy.toml"), "[release]\ngroup = \"demo\"\n")?;

    Ok(Self { _root: root, path })
  }

  /// Create a single-package repository (the package is the workspace root)
  pub fn single(name: &str, major: u64) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("Cargo.toml"),
      format!(
        r#"[package]
name = "{}"
version = "{}.0.0-SNAPSHOT"
edition = "2021"

[workspace]
"#,
        name, major
      ),
    )?;
    std::fs::create_dir_all(path.join("src"))?;
    std::fs::write(path.join("src/lib.rs"), format!("//! {} crate\n", name))?;
    std::fs::write(path.join("convoy.toml"), "[release]\ngroup = \"demo\"\n")?;

    let ws = Self { _root: root, path };
    ws.commit("Initial package")?;
    Ok(ws)
  }

  /// Add a crate under the given directory (members must cover it)
  pub fn add_crate_at(&self, dir: &str, name: &str, major: u64, path_deps: &[(&str, &str)]) -> Result<PathBuf> {
    let crate_path = self.path.join(dir);
    std::fs::create_dir_all(crate_path.join("src"))?;

    let mut cargo_toml = format!(
      r#"[package]
name = "{}"
version = "{}.0.0-SNAPSHOT"
edition = "2021"

[dependencies]
"#,
      name, major
    );
    for (dep_name, dep_path) in path_deps {
      cargo_toml.push_str(&format!("{} = {{ path = \"{}\" }}\n", dep_name, dep_path));
    }

    std::fs::write(crate_path.join("Cargo.toml"), cargo_toml)?;
    std::fs::write(
      crate_path.join("src/lib.rs"),
      format!("//! {} crate\n\npub fn name() -> &'static str {{\n    \"{}\"\n}}\n", name, name),
    )?;

    Ok(crate_path)
  }

  /// Add a crate under `crates/<name>`, with path deps on sibling crates
  pub fn add_crate(&self, name: &str, major: u64, deps: &[&str]) -> Result<PathBuf> {
    let path_deps: Vec<(&str, String)> = deps.iter().map(|dep| (*dep, format!("../{}", dep))).collect();
    let borrowed: Vec<(&str, &str)> = path_deps.iter().map(|(n, p)| (*n, p.as_str())).collect();
    self.add_crate_at(&format!("crates/{}", name), name, major, &borrowed)
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Overwrite a file relative to the workspace root
  pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(relative);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    std::fs::read_to_string(self.path.join(path)).with_context(|| format!("reading {}", path))
  }

  /// Read and parse the release ledger
  pub fn ledger(&self) -> Result<serde_json::Value> {
    let content = self.read_file(".release-info.json")?;
    Ok(serde_json::from_str(&content)?)
  }

  /// The tag name recorded by the most recent cycle
  pub fn current_tag(&self) -> Result<String> {
    Ok(
      self.ledger()?["tagName"]
        .as_str()
        .context("ledger has no tagName")?
        .to_string(),
    )
  }

  /// List all tags
  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "-l"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Read the message body of an annotated tag
  pub fn tag_message(&self, tag: &str) -> Result<String> {
    let output = git(&self.path, &["tag", "-l", "--format=%(contents)", tag])?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run cargo-convoy and require success
pub fn run_convoy(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_convoy_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "cargo-convoy command failed: cargo convoy {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run cargo-convoy and return the raw output, whatever the exit status
pub fn run_convoy_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let convoy_bin = env!("CARGO_BIN_EXE_cargo-convoy");

  let mut full_args = vec!["convoy"];
  full_args.extend_from_slice(args);

  Command::new(convoy_bin)
    .current_dir(cwd)
    .args(&full_args)
    .output()
    .context("Failed to run cargo-convoy")
}

/// Release tags embed a second-granularity timestamp; consecutive cycles in
/// the same second would collide.
pub fn wait_for_tag_tick() {
  std::thread::sleep(std::time::Duration::from_millis(1100));
}
