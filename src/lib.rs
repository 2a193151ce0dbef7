//! Isolated runner
//!
//! Runs several independently-versioned application bundles inside one host
//! process. Each bundle gets its own dependency set, resolved from its
//! manifest against the host artifacts, and its own isolation context and
//! thread.
//!
//! ```text
//! BundleSelector -> locator -> ClasspathResolver -> IsolationBoundary
//! ```

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod isolation;
pub mod locator;
pub mod logging;
pub mod manifest;
pub mod resolver;
pub mod selector;

pub use config::{RunnerConfig, VersionPolicy};
pub use domain::{ArtifactRef, Classpath, DependencyDeclaration};
pub use error::{Result, RunnerError};
pub use isolation::{BundleHandle, IsolationBoundary, LaunchState};
pub use resolver::ClasspathResolver;
pub use selector::{BundleSelector, HostArtifacts};
