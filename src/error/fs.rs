//! File system and archive errors

use super::RunnerError;

/// Creates a manifest read failed error
pub fn manifest_read_failed(path: impl Into<String>, reason: impl Into<String>) -> RunnerError {
    RunnerError::ManifestReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an archive read failed error
pub fn archive_read_failed(url: impl Into<String>, reason: impl Into<String>) -> RunnerError {
    RunnerError::ArchiveReadFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> RunnerError {
    RunnerError::IoError {
        message: message.into(),
    }
}
