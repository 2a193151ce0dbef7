//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - locate: Locate command arguments
//! - resolve: Resolve command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod locate;
pub mod resolve;

pub use completions::CompletionsArgs;
pub use locate::LocateArgs;
pub use resolve::ResolveArgs;

/// Isolated runner - launch bundles in isolated dependency sets
#[derive(Parser, Debug)]
#[command(
    name = "isolated-runner",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resolve and inspect isolated bundle classpaths",
    long_about = "Finds application bundles among the host artifacts and resolves the \
                  dependency set each one runs with, from the host artifacts, sibling \
                  build outputs and the local package repository.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  isolated-runner locate orders service           \x1b[90m# Find a bundle artifact\x1b[0m\n   \
                  isolated-runner resolve orders service          \x1b[90m# Print its isolated classpath\x1b[0m\n   \
                  isolated-runner resolve orders --json           \x1b[90m# Machine-readable output\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, short = 'c', global = true, env = "ISOLATED_RUNNER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host artifacts as a platform path list
    #[arg(long, global = true, env = "ISOLATED_RUNNER_CLASSPATH")]
    pub classpath: Option<String>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate a single artifact among the host artifacts
    Locate(LocateArgs),

    /// Resolve a bundle's isolated classpath
    Resolve(ResolveArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
