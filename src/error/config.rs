//! Configuration errors

use super::RunnerError;

/// Creates a configuration read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> RunnerError {
    RunnerError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a configuration parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> RunnerError {
    RunnerError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> RunnerError {
    RunnerError::ConfigInvalid {
        message: message.into(),
    }
}
