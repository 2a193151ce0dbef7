//! Error types and handling for the isolated runner
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`locate`]: Artifact lookup errors
//! - [`resolve`]: Classpath resolution errors
//! - [`launch`]: Isolation and lifecycle errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system and archive errors
//! - [`cli`]: Command-line argument errors

pub mod cli;
pub mod config;
pub mod fs;
pub mod launch;
pub mod locate;
pub mod resolve;

pub use cli::invalid_argument;
pub use config::{
    invalid as config_invalid, parse_failed as config_parse_failed,
    read_failed as config_read_failed,
};
pub use fs::{archive_read_failed, io_error, manifest_read_failed};
pub use launch::{illegal_state, scheme_not_registered, startup_failure, symbol_not_found};
pub use locate::{ambiguous, not_found};
pub use resolve::{repository_query_failed, unresolved_dependencies};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for isolated runner operations
#[derive(Error, Diagnostic, Debug)]
pub enum RunnerError {
    // Locate errors
    #[error("Dependency not found {identifiers}\n{candidates}")]
    #[diagnostic(
        code(isolated_runner::locate::not_found),
        help("Check that the bundle artifact is part of the host classpath")
    )]
    NotFound {
        identifiers: String,
        candidates: String,
    },

    #[error("{count} dependencies found, refine your search\n{candidates}")]
    #[diagnostic(
        code(isolated_runner::locate::ambiguous),
        help("Add more identifiers so that a single artifact matches best")
    )]
    Ambiguous { count: usize, candidates: String },

    // Resolution errors
    #[error("Unable to load all needed dependencies: {}", residuals.join(", "))]
    #[diagnostic(
        code(isolated_runner::resolve::unresolved),
        help("Add the missing artifacts to the host classpath or to the local repository")
    )]
    UnresolvedDependencies { residuals: Vec<String> },

    #[error("Unable to find the local repository path: {reason}")]
    #[diagnostic(
        code(isolated_runner::resolve::repository_query_failed),
        help("Is the package manager installed? Set ISOLATED_RUNNER_REPOSITORY to skip the query")
    )]
    RepositoryQueryFailed { reason: String },

    // Launch errors
    #[error("Bundle '{name}' failed to start: {reason}")]
    #[diagnostic(code(isolated_runner::launch::startup_failure))]
    StartupFailure { name: String, reason: String },

    #[error("Bundle '{name}' cannot {operation} while {state}")]
    #[diagnostic(code(isolated_runner::launch::illegal_state))]
    IllegalState {
        name: String,
        state: String,
        operation: String,
    },

    #[error("Symbol '{symbol}' not found in isolated classpath\n{classpath}")]
    #[diagnostic(
        code(isolated_runner::launch::symbol_not_found),
        help("The symbol must be exported by one of the artifacts on the bundle classpath")
    )]
    SymbolNotFound { symbol: String, classpath: String },

    #[error("No handler registered for '{url}'")]
    #[diagnostic(code(isolated_runner::launch::scheme_not_registered))]
    SchemeNotRegistered { url: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(isolated_runner::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(isolated_runner::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(isolated_runner::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read manifest: {path}: {reason}")]
    #[diagnostic(code(isolated_runner::fs::manifest_read_failed))]
    ManifestReadFailed { path: String, reason: String },

    #[error("Failed to read archive: {url}: {reason}")]
    #[diagnostic(code(isolated_runner::fs::archive_read_failed))]
    ArchiveReadFailed { url: String, reason: String },

    // CLI errors
    #[error("{message}")]
    #[diagnostic(code(isolated_runner::cli::invalid_argument))]
    InvalidArgument { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(isolated_runner::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for RunnerError {
    fn from(err: std::io::Error) -> Self {
        RunnerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for RunnerError {
    fn from(err: serde_yaml::Error) -> Self {
        RunnerError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for RunnerError {
    fn from(err: zip::result::ZipError) -> Self {
        RunnerError::ArchiveReadFailed {
            url: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, RunnerError>;
