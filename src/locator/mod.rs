//! Locate a single artifact among known artifacts by identifying substrings
//!
//! Every identifier must appear in the candidate's string form. When several
//! candidates qualify, the one repeating the identifiers most often wins
//! (e.g. `junit-platform-engine/1.4.0/junit-platform-engine-1.4.0.jar` beats
//! `junit-platform-commons/...` for `junit platform engine`).

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::ArtifactRef;
use crate::error::{Result, ambiguous, not_found};

/// Find the single best-matching artifact for `identifiers`
pub fn locate<S: AsRef<str>>(candidates: &[ArtifactRef], identifiers: &[S]) -> Result<ArtifactRef> {
    let matches: Vec<&ArtifactRef> = candidates
        .iter()
        .filter(|candidate| {
            identifiers
                .iter()
                .all(|id| candidate.as_str().contains(id.as_ref()))
        })
        .collect();

    match matches.as_slice() {
        [] => Err(not_found(
            identifiers.iter().map(AsRef::<str>::as_ref),
            candidates,
        )),
        [only] => Ok((*only).clone()),
        _ => {
            debug!(count = matches.len(), "several candidates match, scoring");
            find_max_score(matches.iter().copied(), identifiers)
                .ok_or_else(|| ambiguous(&matches))
        }
    }
}

/// Pick the candidate whose string form contains the identifiers most often.
///
/// Candidates are deduplicated by string form first. Returns `None` when the
/// top score is shared by more than one distinct candidate.
pub fn find_max_score<'a, I, S>(candidates: I, identifiers: &[S]) -> Option<ArtifactRef>
where
    I: IntoIterator<Item = &'a ArtifactRef>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let scores: HashMap<&ArtifactRef, usize> = candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.as_str()))
        .map(|candidate| {
            let score = identifiers
                .iter()
                .map(|id| candidate.count_matches(id.as_ref()))
                .sum();
            (candidate, score)
        })
        .collect();

    let max_score = scores.values().copied().max()?;
    let mut best = scores
        .into_iter()
        .filter(|(_, score)| *score == max_score)
        .map(|(candidate, _)| candidate);

    let winner = best.next()?;
    if best.next().is_some() {
        return None;
    }
    Some(winner.clone())
}
