//! Classpath resolution for a single bundle
//!
//! [`ClasspathResolver`] turns a bundle's declared dependencies into a fully
//! resolved [`Classpath`]: the in-memory passes run against the host artifact
//! set, leftovers are searched for in the local repository, and any residual
//! fails the whole resolution.

pub mod matcher;
pub mod repository;

pub use matcher::{ManifestMatcher, MatchOutcome, Pass, Resolution};
pub use repository::{CommandRepository, FixedRepository, RepositoryLocator};

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RunnerConfig;
use crate::domain::{ArtifactRef, Classpath, DependencyDeclaration};
use crate::error::{Result, unresolved_dependencies};

/// A resolved classpath together with how each declaration was satisfied
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    pub classpath: Classpath,
    pub resolutions: Vec<Resolution>,
}

/// Resolves bundle classpaths against the host artifacts and the local repository
pub struct ClasspathResolver {
    host: Vec<ArtifactRef>,
    matcher: ManifestMatcher,
    repository: Arc<dyn RepositoryLocator>,
}

impl ClasspathResolver {
    pub fn new(host: Vec<ArtifactRef>, config: &RunnerConfig) -> Self {
        Self {
            host,
            matcher: ManifestMatcher::from_config(config),
            repository: repository::from_config(&config.repository),
        }
    }

    /// Replace the repository lookup
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn RepositoryLocator>) -> Self {
        self.repository = repository;
        self
    }

    pub fn host(&self) -> &[ArtifactRef] {
        &self.host
    }

    /// Resolve `manifest_classpath` for `bundle`.
    ///
    /// The result starts with the bundle itself, then the runner artifacts,
    /// then one artifact per declaration.
    pub fn build(
        &self,
        bundle: &ArtifactRef,
        manifest_classpath: &str,
        runner_artifacts: &[ArtifactRef],
    ) -> Result<Classpath> {
        self.build_report(bundle, manifest_classpath, runner_artifacts)
            .map(|report| report.classpath)
    }

    /// Like [`ClasspathResolver::build`], keeping the per-declaration details
    pub fn build_report(
        &self,
        bundle: &ArtifactRef,
        manifest_classpath: &str,
        runner_artifacts: &[ArtifactRef],
    ) -> Result<ResolutionReport> {
        let declarations = DependencyDeclaration::parse_list(manifest_classpath);
        debug!(bundle = %bundle, declared = declarations.len(), "resolving bundle classpath");

        let MatchOutcome {
            mut resolved,
            pending,
            ..
        } = self.matcher.resolve(declarations, self.host.clone());

        let residuals = if pending.is_empty() {
            pending
        } else {
            let root = self.repository.root()?;
            debug!(root = %root.display(), pending = pending.len(), "searching local repository");
            let outcome = repository::search(&root, pending)?;
            resolved.extend(outcome.resolved);
            outcome.pending
        };

        if !residuals.is_empty() {
            let residuals: Vec<String> = residuals.iter().map(ToString::to_string).collect();
            warn!(residuals = %residuals.join(", "), "unable to load all needed dependencies");
            return Err(unresolved_dependencies(residuals));
        }

        let mut classpath = Classpath::new();
        classpath.push(bundle.clone());
        classpath.extend(runner_artifacts.iter().cloned());
        classpath.extend(resolved.iter().map(|r| r.artifact.clone()));

        Ok(ResolutionReport {
            classpath,
            resolutions: resolved,
        })
    }
}
