//! Command-line argument errors

use super::RunnerError;

/// Creates an invalid argument error
pub fn invalid_argument(message: impl Into<String>) -> RunnerError {
    RunnerError::InvalidArgument {
        message: message.into(),
    }
}
