//! Local package repository fallback
//!
//! Declarations left over by the in-memory passes are looked up by exact file
//! name in the local repository tree. Lookups are I/O bound and run on a small
//! pool of scoped worker threads.

use std::collections::VecDeque;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::matcher::{Pass, Resolution};
use crate::config::RepositoryConfig;
use crate::domain::{ArtifactRef, DependencyDeclaration};
use crate::error::{Result, RunnerError, repository_query_failed};

/// Interval between checks on the query subprocess
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Source of the local repository root directory
pub trait RepositoryLocator: Send + Sync {
    fn root(&self) -> Result<PathBuf>;
}

/// A repository root known up front
#[derive(Debug, Clone)]
pub struct FixedRepository {
    root: PathBuf,
}

impl FixedRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl RepositoryLocator for FixedRepository {
    fn root(&self) -> Result<PathBuf> {
        if !self.root.is_dir() {
            return Err(repository_query_failed(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(self.root.clone())
    }
}

/// Asks the package manager for its repository root through the OS shell
#[derive(Debug, Clone)]
pub struct CommandRepository {
    command: String,
    timeout: Duration,
}

impl CommandRepository {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    fn timed_out(&self) -> RunnerError {
        repository_query_failed(format!(
            "`{}` did not complete within {}s",
            self.command,
            self.timeout.as_secs()
        ))
    }

    fn shell(&self) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd.exe");
            cmd.arg("/c");
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };
        cmd.arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }
}

impl RepositoryLocator for CommandRepository {
    fn root(&self) -> Result<PathBuf> {
        debug!(command = %self.command, "querying local repository path");
        let mut child = self
            .shell()
            .spawn()
            .map_err(|e| repository_query_failed(format!("failed to run `{}`: {e}", self.command)))?;

        // Drain stdout concurrently so a chatty child cannot block on a full pipe
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| repository_query_failed("child stdout unavailable"))?;
        let (sender, output) = mpsc::channel();
        thread::spawn(move || {
            let mut out = String::new();
            let _ = sender.send(stdout.read_to_string(&mut out).map(|_| out));
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(repository_query_failed(format!(
                "`{}` exited with {status}",
                self.command
            )));
        }

        // A background process can hold stdout open after the shell exits
        let output = match output.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(read) => read.map_err(|e| repository_query_failed(e.to_string()))?,
            Err(RecvTimeoutError::Timeout) => {
                warn!(command = %self.command, "stdout still open after the query exited");
                return Err(self.timed_out());
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(repository_query_failed("stdout reader panicked"));
            }
        };
        let root = output.trim();
        if root.is_empty() {
            return Err(repository_query_failed(format!(
                "`{}` printed no path",
                self.command
            )));
        }
        Ok(PathBuf::from(root))
    }
}

/// Build the locator described by the configuration
pub fn from_config(config: &RepositoryConfig) -> Arc<dyn RepositoryLocator> {
    match &config.root {
        Some(root) => Arc::new(FixedRepository::new(root)),
        None => Arc::new(CommandRepository::new(
            config.command.clone(),
            config.timeout(),
        )),
    }
}

/// First regular file named exactly `file_name` under `root`
pub fn find_file(root: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable repository entry");
                None
            }
        })
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(walkdir::DirEntry::into_path)
}

/// Result of a repository search
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub resolved: Vec<Resolution>,
    pub pending: Vec<DependencyDeclaration>,
}

/// Look up every pending declaration under `root` concurrently.
///
/// Each worker pulls declarations from a shared queue; a hit removes the
/// declaration from the shared pending list under its lock, so every
/// declaration is resolved at most once.
pub fn search(root: &Path, pending: Vec<DependencyDeclaration>) -> Result<SearchOutcome> {
    if pending.is_empty() {
        return Ok(SearchOutcome::default());
    }

    let workers = thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
        .min(pending.len());
    debug!(root = %root.display(), workers, pending = pending.len(), "searching local repository");

    let queue: Mutex<VecDeque<DependencyDeclaration>> = Mutex::new(pending.iter().cloned().collect());
    let remaining: Mutex<Vec<DependencyDeclaration>> = Mutex::new(pending);
    let resolved: Mutex<Vec<Resolution>> = Mutex::new(Vec::new());
    let failures: Mutex<Vec<RunnerError>> = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    let Some(declaration) = queue.lock().pop_front() else {
                        break;
                    };
                    let Some(path) = find_file(root, declaration.file_name()) else {
                        continue;
                    };
                    let artifact = match ArtifactRef::from_path(&path) {
                        Ok(artifact) => artifact,
                        Err(e) => {
                            failures.lock().push(e);
                            continue;
                        }
                    };

                    let mut remaining = remaining.lock();
                    if let Some(pos) = remaining.iter().position(|d| *d == declaration) {
                        remaining.remove(pos);
                        debug!(url = %artifact, jar = %declaration, "adding url matching");
                        resolved.lock().push(Resolution {
                            declaration,
                            artifact,
                            pass: Pass::Repository,
                        });
                    }
                }
            });
        }
    });

    if let Some(failure) = failures.into_inner().into_iter().next() {
        warn!(error = %failure, "repository search failed");
        return Err(failure);
    }

    Ok(SearchOutcome {
        resolved: resolved.into_inner(),
        pending: remaining.into_inner(),
    })
}
