//! Isolation and lifecycle errors

use super::RunnerError;

/// Creates a startup failure error
pub fn startup_failure(name: impl Into<String>, reason: impl Into<String>) -> RunnerError {
    RunnerError::StartupFailure {
        name: name.into(),
        reason: reason.into(),
    }
}

/// Creates an illegal state error for a lifecycle operation
pub fn illegal_state(
    name: impl Into<String>,
    state: impl Into<String>,
    operation: impl Into<String>,
) -> RunnerError {
    RunnerError::IllegalState {
        name: name.into(),
        state: state.into(),
        operation: operation.into(),
    }
}

/// Creates a symbol not found error
pub fn symbol_not_found(symbol: impl Into<String>, classpath: impl Into<String>) -> RunnerError {
    RunnerError::SymbolNotFound {
        symbol: symbol.into(),
        classpath: classpath.into(),
    }
}

/// Creates a scheme not registered error
pub fn scheme_not_registered(url: impl Into<String>) -> RunnerError {
    RunnerError::SchemeNotRegistered { url: url.into() }
}
