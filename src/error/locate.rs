//! Artifact lookup errors

use std::fmt::Display;

use super::RunnerError;

fn join_lines<I>(items: I) -> (usize, String)
where
    I: IntoIterator,
    I::Item: Display,
{
    let lines: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    (lines.len(), lines.join("\n"))
}

/// Creates a not found error carrying the identifiers and the full candidate dump
pub fn not_found<I, C>(identifiers: I, candidates: C) -> RunnerError
where
    I: IntoIterator,
    I::Item: Display,
    C: IntoIterator,
    C::Item: Display,
{
    let identifiers: Vec<String> = identifiers.into_iter().map(|i| i.to_string()).collect();
    let (_, candidates) = join_lines(candidates);
    RunnerError::NotFound {
        identifiers: identifiers.join("-"),
        candidates,
    }
}

/// Creates an ambiguity error listing every matching candidate
pub fn ambiguous<C>(candidates: C) -> RunnerError
where
    C: IntoIterator,
    C::Item: Display,
{
    let (count, candidates) = join_lines(candidates);
    RunnerError::Ambiguous { count, candidates }
}
