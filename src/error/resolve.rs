//! Classpath resolution errors

use super::RunnerError;

/// Creates an unresolved dependencies error with the residual declarations
pub fn unresolved_dependencies(residuals: Vec<String>) -> RunnerError {
    RunnerError::UnresolvedDependencies { residuals }
}

/// Creates a repository query failed error
pub fn repository_query_failed(reason: impl Into<String>) -> RunnerError {
    RunnerError::RepositoryQueryFailed {
        reason: reason.into(),
    }
}
