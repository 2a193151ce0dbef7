//! Process-wide handler for the nested archive (`jar:`) scheme
//!
//! Entries inside packaged archives can only be read once the handler is
//! registered. Registration happens at most once per process and is safe to
//! request from any thread.

use std::sync::OnceLock;

use tracing::debug;

use crate::archive;
use crate::domain::ArtifactRef;
use crate::error::{Result, archive_read_failed, scheme_not_registered};

static REGISTERED: OnceLock<()> = OnceLock::new();

/// Register the nested archive handler if it is not registered yet
pub fn ensure_registered() {
    REGISTERED.get_or_init(|| debug!("registering nested archive scheme handler"));
}

pub fn is_registered() -> bool {
    REGISTERED.get().is_some()
}

/// Fail unless `artifact` can be read with the handlers currently registered
pub fn check(artifact: &ArtifactRef) -> Result<()> {
    if artifact.is_nested() && !is_registered() {
        return Err(scheme_not_registered(artifact.as_str()));
    }
    Ok(())
}

/// Read the bytes behind `artifact`
pub fn open(artifact: &ArtifactRef) -> Result<Vec<u8>> {
    check(artifact)?;
    if artifact.is_directory() {
        return Err(archive_read_failed(artifact.as_str(), "is a directory"));
    }
    archive::read_bytes(artifact)
}
