//! Bundle selection: the top-level entry point
//!
//! Finds a bundle among the host artifacts, computes its isolated classpath
//! and launches it through the isolation boundary.
//!
//! Two bundle shapes are supported:
//! - directory bundles (build output of an IDE or a sibling project), whose
//!   manifest `Class-Path` is resolved against the host artifacts
//! - packaged bundles, which carry their dependencies as nested archives

pub mod host;

pub use host::{CLASSPATH_ENV, HostArtifacts};

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::archive::PackagedArchive;
use crate::config::RunnerConfig;
use crate::domain::{ArtifactRef, Classpath};
use crate::error::{Result, symbol_not_found};
use crate::isolation::{BundleHandle, IsolationBoundary};
use crate::locator::locate;
use crate::manifest::{MANIFEST_PATH, Manifest, START_CLASS};
use crate::resolver::{ClasspathResolver, RepositoryLocator, Resolution};

/// A bundle and its computed classpath
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub name: String,
    pub bundle: ArtifactRef,
    pub packaged: bool,
    pub start_class: Option<String>,
    pub classpath: Classpath,
    /// How each declaration was satisfied (directory bundles only)
    pub resolutions: Vec<Resolution>,
}

/// Selects, resolves and launches bundles
pub struct BundleSelector {
    config: RunnerConfig,
    host: HostArtifacts,
    boundary: IsolationBoundary,
    repository: Option<Arc<dyn RepositoryLocator>>,
}

impl BundleSelector {
    pub fn new(config: RunnerConfig, host: HostArtifacts, boundary: IsolationBoundary) -> Self {
        Self {
            config,
            host,
            boundary,
            repository: None,
        }
    }

    /// Replace the configured repository lookup
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn RepositoryLocator>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Effective candidate artifacts.
    ///
    /// When the test-harness marker artifact is present, its own manifest
    /// `Class-Path` (relative to the marker's directory) replaces the host set.
    pub fn candidates(&self) -> Result<Vec<ArtifactRef>> {
        let Ok(marker) = locate(self.host.as_slice(), self.config.override_marker.as_slice()) else {
            return Ok(self.host.as_slice().to_vec());
        };
        info!(marker = %marker, "override marker found");

        let manifest = PackagedArchive::open(&marker)?.manifest()?.unwrap_or_default();
        let base = marker
            .to_path()
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        let candidates: Vec<ArtifactRef> = manifest
            .class_path()
            .split_whitespace()
            .map(|entry| {
                let relative = entry.strip_prefix("file:").unwrap_or(entry);
                host::artifact_for(&base.join(relative))
            })
            .collect();
        for candidate in &candidates {
            debug!(url = %candidate, "override candidate");
        }
        Ok(candidates)
    }

    /// The runner's own support artifacts, one per configured identifier group
    pub fn runner_artifacts(&self, candidates: &[ArtifactRef]) -> Result<Vec<ArtifactRef>> {
        self.config
            .runner_artifacts
            .iter()
            .map(|group| locate(candidates, group.as_slice()))
            .collect()
    }

    fn resolver(&self, candidates: Vec<ArtifactRef>) -> ClasspathResolver {
        let resolver = ClasspathResolver::new(candidates, &self.config);
        match &self.repository {
            Some(repository) => resolver.with_repository(Arc::clone(repository)),
            None => resolver,
        }
    }

    /// Compute the bundle's classpath without launching it
    pub fn resolve_only<S: AsRef<str>>(&self, identifiers: &[S]) -> Result<Selection> {
        let candidates = self.candidates()?;
        let bundle = locate(&candidates, identifiers)?;
        let name = identifiers
            .iter()
            .map(|id| id.as_ref())
            .collect::<Vec<&str>>()
            .join("-");
        info!(bundle = %bundle, %name, "bundle found");

        let runner = self.runner_artifacts(&candidates)?;

        if bundle.is_directory() {
            let dir = bundle.to_path().unwrap_or_default();
            let manifest = if dir.join(MANIFEST_PATH).is_file() {
                Manifest::from_directory(&dir)?
            } else {
                debug!(bundle = %bundle, "no manifest in bundle directory");
                Manifest::default()
            };
            let report = self
                .resolver(candidates)
                .build_report(&bundle, manifest.class_path(), &runner)?;
            Ok(Selection {
                name,
                bundle,
                packaged: false,
                start_class: manifest.start_class().map(str::to_string),
                classpath: report.classpath,
                resolutions: report.resolutions,
            })
        } else {
            let mut archive = PackagedArchive::open(&bundle)?;
            let start_class = archive
                .manifest()?
                .and_then(|m| m.start_class().map(str::to_string));
            let mut classpath = archive.classpath_archives()?;
            classpath.extend(runner);
            Ok(Selection {
                name,
                bundle,
                packaged: true,
                start_class,
                classpath,
                resolutions: Vec::new(),
            })
        }
    }

    /// Find, resolve and launch a bundle.
    ///
    /// Without an explicit `application_symbol` the manifest `Start-Class`
    /// is used.
    pub fn select<S: AsRef<str>>(
        &self,
        application_symbol: Option<&str>,
        identifiers: &[S],
        args: Vec<String>,
    ) -> Result<BundleHandle> {
        let selection = self.resolve_only(identifiers)?;
        let symbol = application_symbol
            .map(str::to_string)
            .or_else(|| selection.start_class.clone())
            .ok_or_else(|| symbol_not_found(START_CLASS, selection.classpath.to_string()))?;

        self.boundary.launch(
            &selection.classpath,
            &self.config.bootstrap_symbol,
            &symbol,
            &selection.name,
            args,
        )
    }
}
