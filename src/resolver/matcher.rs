//! Match declared dependency file names against available artifacts
//!
//! Three heuristics run in order over the same shrinking candidate pool:
//!
//! 1. exact: the candidate contains the declared file name verbatim
//! 2. version-tolerant: same stem and extension, any version
//! 3. workspace: a sibling project's build output directory
//!
//! A candidate is dropped from the pool once it satisfies a declaration and a
//! declaration is dropped from the worklist once resolved.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{RunnerConfig, VersionPolicy};
use crate::domain::{ArtifactRef, DependencyDeclaration};

/// The heuristic that resolved a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pass {
    Exact,
    VersionTolerant,
    Workspace,
    Repository,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::Exact => "exact match",
            Pass::VersionTolerant => "version not match",
            Pass::Workspace => "workspace related project",
            Pass::Repository => "local repository",
        };
        f.write_str(name)
    }
}

/// A declaration paired with the artifact satisfying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    #[serde(serialize_with = "serialize_declaration")]
    pub declaration: DependencyDeclaration,
    pub artifact: ArtifactRef,
    pub pass: Pass,
}

fn serialize_declaration<S>(
    declaration: &DependencyDeclaration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(declaration.file_name())
}

/// Result of running the matching passes
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub resolved: Vec<Resolution>,
    /// Declarations no pass could satisfy
    pub pending: Vec<DependencyDeclaration>,
    /// Candidates not consumed by any declaration
    pub pool: Vec<ArtifactRef>,
}

/// Candidate pattern for one versioned declaration
struct VersionPattern {
    regex: Regex,
    version: String,
}

impl VersionPattern {
    fn for_declaration(declaration: &DependencyDeclaration) -> Option<Self> {
        let parts = declaration.versioned()?;
        let pattern = format!(
            r"^{}-(\d[^/]*)\.{}$",
            regex::escape(parts.stem),
            regex::escape(parts.extension)
        );
        let regex = Regex::new(&pattern).ok()?;
        Some(Self {
            regex,
            version: parts.version.to_string(),
        })
    }

    fn rewrite(&self, candidate: &ArtifactRef) -> Option<ArtifactRef> {
        let caps = self.regex.captures(candidate.file_name())?;
        let found = caps.get(1)?.as_str();
        Some(ArtifactRef::new(
            candidate.as_str().replace(found, &self.version),
        ))
    }
}

/// Pass 1: the candidate contains the declared file name verbatim
pub fn exact_match(candidate: &ArtifactRef, declaration: &DependencyDeclaration) -> Option<ArtifactRef> {
    candidate
        .as_str()
        .contains(declaration.file_name())
        .then(|| candidate.clone())
}

/// Pass 2: same stem and extension, different version.
///
/// The candidate's version is replaced by the declared one throughout its
/// string form, so the reference names what the bundle was built against.
pub fn version_tolerant_match(
    candidate: &ArtifactRef,
    declaration: &DependencyDeclaration,
) -> Option<ArtifactRef> {
    VersionPattern::for_declaration(declaration)?.rewrite(candidate)
}

/// Pass 3: every word of the declared stem plus the workspace marker appear in
/// the candidate (`commons-web-1.0.jar` ~ `/git/commons/web/target/classes/`)
pub fn workspace_match(
    candidate: &ArtifactRef,
    declaration: &DependencyDeclaration,
    marker: &str,
) -> Option<ArtifactRef> {
    let parts = declaration.versioned()?;
    let url = candidate.as_str();
    let matches = parts.words().all(|word| url.contains(word)) && url.contains(marker);
    matches.then(|| candidate.clone())
}

/// Runs the in-memory matching passes
#[derive(Debug, Clone)]
pub struct ManifestMatcher {
    workspace_marker: String,
    version_policy: VersionPolicy,
}

impl ManifestMatcher {
    pub fn new(workspace_marker: impl Into<String>, version_policy: VersionPolicy) -> Self {
        Self {
            workspace_marker: workspace_marker.into(),
            version_policy,
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.workspace_marker.clone(), config.version_policy)
    }

    /// Resolve `pending` against `pool` with passes 1 to 3
    pub fn resolve(
        &self,
        pending: Vec<DependencyDeclaration>,
        pool: Vec<ArtifactRef>,
    ) -> MatchOutcome {
        let mut outcome = MatchOutcome {
            resolved: Vec::new(),
            pending,
            pool,
        };
        for pass in [Pass::Exact, Pass::VersionTolerant, Pass::Workspace] {
            if outcome.pending.is_empty() {
                break;
            }
            debug!(%pass, pending = outcome.pending.len(), "running resolution pass");
            outcome = self.run_pass(pass, outcome);
        }
        outcome
    }

    fn run_pass(&self, pass: Pass, outcome: MatchOutcome) -> MatchOutcome {
        let MatchOutcome {
            mut resolved,
            mut pending,
            pool,
        } = outcome;

        let patterns: HashMap<&str, VersionPattern> = if pass == Pass::VersionTolerant {
            pending
                .iter()
                .filter_map(|d| VersionPattern::for_declaration(d).map(|p| (d.file_name(), p)))
                .collect()
        } else {
            HashMap::new()
        };

        let mut hits: Vec<(usize, ArtifactRef)> = Vec::new();
        let mut taken = vec![false; pending.len()];
        let mut remaining = Vec::with_capacity(pool.len());

        for candidate in pool {
            let found = pending.iter().enumerate().find_map(|(i, declaration)| {
                if taken[i] {
                    return None;
                }
                let artifact = match pass {
                    Pass::Exact => exact_match(&candidate, declaration),
                    Pass::VersionTolerant => patterns
                        .get(declaration.file_name())
                        .and_then(|p| p.rewrite(&candidate))
                        .map(|rewritten| self.apply_policy(&candidate, rewritten, declaration)),
                    Pass::Workspace => {
                        workspace_match(&candidate, declaration, &self.workspace_marker)
                    }
                    Pass::Repository => None,
                };
                artifact.map(|a| (i, a))
            });

            match found {
                Some((i, artifact)) => {
                    debug!(url = %artifact, jar = %pending[i], "adding url matching");
                    taken[i] = true;
                    hits.push((i, artifact));
                }
                None => remaining.push(candidate),
            }
        }
        drop(patterns);

        // Remove from the back so earlier indices stay valid
        hits.sort_by_key(|(i, _)| *i);
        let mut newly_resolved = Vec::with_capacity(hits.len());
        for (i, artifact) in hits.into_iter().rev() {
            let declaration = pending.remove(i);
            newly_resolved.push(Resolution {
                declaration,
                artifact,
                pass,
            });
        }
        newly_resolved.reverse();
        resolved.extend(newly_resolved);

        MatchOutcome {
            resolved,
            pending,
            pool: remaining,
        }
    }

    fn apply_policy(
        &self,
        candidate: &ArtifactRef,
        rewritten: ArtifactRef,
        declaration: &DependencyDeclaration,
    ) -> ArtifactRef {
        match self.version_policy {
            VersionPolicy::Rewrite => {
                info!(
                    url = %candidate,
                    jar = %declaration,
                    rewritten = %rewritten,
                    "classpath url matches but its version is replaced to conform to the app classpath"
                );
                rewritten
            }
            VersionPolicy::Verify => {
                if rewritten.to_path().is_some_and(|p| p.is_file()) {
                    info!(url = %candidate, jar = %declaration, rewritten = %rewritten, "using declared version");
                    rewritten
                } else {
                    warn!(
                        url = %candidate,
                        jar = %declaration,
                        "declared version not present, keeping the available one"
                    );
                    candidate.clone()
                }
            }
        }
    }
}
