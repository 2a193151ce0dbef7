//! Command helper utilities

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::RunnerConfig;
use crate::error::Result;
use crate::isolation::{IsolationBoundary, RegistryLoader};
use crate::selector::{BundleSelector, HostArtifacts};

/// Host artifacts from the `--classpath` value, empty when not given
pub fn host_artifacts(classpath: Option<&str>) -> HostArtifacts {
    classpath
        .map(|list| HostArtifacts::from_path_list(OsStr::new(list)))
        .unwrap_or_default()
}

/// Build a selector from the global CLI options
///
/// The CLI only inspects bundles, so the boundary's loader exports nothing.
pub fn build_selector(config: Option<&Path>, classpath: Option<&str>) -> Result<BundleSelector> {
    let config = RunnerConfig::load(config)?;
    let host = host_artifacts(classpath);
    debug!(host = host.len(), "host artifacts");
    Ok(BundleSelector::new(
        config,
        host,
        IsolationBoundary::new(Arc::new(RegistryLoader::new())),
    ))
}
