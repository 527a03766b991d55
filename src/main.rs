mod cargo;
mod commands;
mod core;
mod detect;
mod graph;
mod ledger;
mod manifest;
mod reactor;
mod ui;
mod utils;
mod version;

use crate::core::error::{ConvoyError, ExitCode, Outcome, print_error};
use clap::{Parser, Subcommand};

/// Coordinated incremental releases for Cargo workspaces
#[derive(Parser)]
#[command(name = "cargo")]
#[command(bin_name = "cargo")]
#[command(styles = get_styles())]
enum CargoCli {
  Convoy(ConvoyCli),
}

#[derive(Parser)]
#[command(name = "convoy")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct ConvoyCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show which members would be released, and at what version
  Plan {
    /// Perform a bugfix release (increment the third version component)
    #[arg(long)]
    bugfix: bool,
    /// Member path to release even without detected changes (repeatable)
    #[arg(long = "force-release", value_name = "PATH")]
    force_release: Vec<String>,
    /// Action when no member changed: release-all (default), release-none, fail-build
    #[arg(long, value_name = "ACTION")]
    no_changes_action: Option<String>,
    /// Output the plan in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Record release decisions: ledger, manifests, hand-off files, tag
  Prepare {
    /// Perform a bugfix release (increment the third version component)
    #[arg(long)]
    bugfix: bool,
    /// Member path to release even without detected changes (repeatable)
    #[arg(long = "force-release", value_name = "PATH")]
    force_release: Vec<String>,
    /// Action when no member changed: release-all (default), release-none, fail-build
    #[arg(long, value_name = "ACTION")]
    no_changes_action: Option<String>,
    /// Push the release tag and ledger commit to the remote
    #[arg(long)]
    push: bool,
    /// Remote to push to
    #[arg(long, default_value = "origin")]
    remote: String,
  },

  /// Revert prepared manifests and remove hand-off files
  Cleanup,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let CargoCli::Convoy(cli) = CargoCli::parse();

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(ExitCode::User.as_i32());
    }
  };

  let ctx = match crate::core::context::WorkspaceContext::build(&workspace_root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Plan {
      bugfix,
      force_release,
      no_changes_action,
      json,
    } => commands::run_plan(&ctx, bugfix, force_release, no_changes_action, json),
    Commands::Prepare {
      bugfix,
      force_release,
      no_changes_action,
      push,
      remote,
    } => commands::run_prepare(&ctx, bugfix, force_release, no_changes_action, push, remote),
    Commands::Cleanup => commands::run_cleanup(&ctx),
  };

  match result {
    Ok(Outcome::Completed) => {}
    Ok(Outcome::NothingToRelease) => std::process::exit(ExitCode::NothingToRelease.as_i32()),
    Err(err) => {
      handle_error(err);
    }
  }
}

fn handle_error(err: ConvoyError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
