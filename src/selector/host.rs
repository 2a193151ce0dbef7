//! The host process's artifact set

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::ArtifactRef;
use crate::domain::artifact::FILE_SCHEME;

/// Environment variable listing the host artifacts, in platform path-list form
pub const CLASSPATH_ENV: &str = "ISOLATED_RUNNER_CLASSPATH";

/// Artifacts visible to the host process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostArtifacts {
    artifacts: Vec<ArtifactRef>,
}

impl HostArtifacts {
    pub fn new(artifacts: Vec<ArtifactRef>) -> Self {
        Self { artifacts }
    }

    /// Parse a platform path list (`:`-separated, `;` on Windows)
    pub fn from_path_list(list: &OsStr) -> Self {
        let artifacts = std::env::split_paths(list)
            .filter(|path| !path.as_os_str().is_empty())
            .map(|path| artifact_for(&path))
            .collect();
        Self { artifacts }
    }

    /// Read the host artifacts from [`CLASSPATH_ENV`]; empty when unset
    pub fn from_env() -> Self {
        match std::env::var_os(CLASSPATH_ENV) {
            Some(list) => {
                let host = Self::from_path_list(&list);
                debug!(count = host.len(), "host artifacts from environment");
                host
            }
            None => Self::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn as_slice(&self) -> &[ArtifactRef] {
        &self.artifacts
    }

    pub fn into_vec(self) -> Vec<ArtifactRef> {
        self.artifacts
    }
}

impl From<Vec<ArtifactRef>> for HostArtifacts {
    fn from(artifacts: Vec<ArtifactRef>) -> Self {
        Self::new(artifacts)
    }
}

/// Canonical reference for `path`, or a lexical one when it cannot be
/// canonicalised (missing entries are kept, as a classpath may list them)
pub fn artifact_for(path: &Path) -> ArtifactRef {
    ArtifactRef::from_path(path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "keeping non-canonical classpath entry");
        lexical(path)
    })
}

fn lexical(path: &Path) -> ArtifactRef {
    let absolute: PathBuf = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let forward = absolute.to_string_lossy().replace('\\', "/");
    if forward.starts_with('/') {
        ArtifactRef::new(format!("{FILE_SCHEME}{forward}"))
    } else {
        ArtifactRef::new(format!("{FILE_SCHEME}/{forward}"))
    }
}
