//! Artifact references and resolved classpaths
//!
//! An artifact is identified by its URL string form only. Directories carry a
//! trailing `/`, nested archive entries use the `jar:` scheme
//! (`jar:file:/app.jar!/BOOT-INF/lib/dep.jar`).

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, io_error};

/// URL scheme prefix for plain filesystem artifacts
pub const FILE_SCHEME: &str = "file:";

/// URL scheme prefix for entries nested inside a packaged archive
pub const NESTED_SCHEME: &str = "jar:";

/// Separator between an archive URL and the path of an entry inside it
pub const NESTED_SEPARATOR: &str = "!/";

/// An immutable reference to a locatable artifact (archive or directory)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArtifactRef {
    url: String,
}

impl ArtifactRef {
    /// Wrap a raw URL string form
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Build a `file:` reference from a filesystem path.
    ///
    /// The path is canonicalised; directories get a trailing `/` so that
    /// [`ArtifactRef::is_directory`] holds for them.
    pub fn from_path(path: &Path) -> Result<Self> {
        let canonical = dunce::canonicalize(path)
            .map_err(|e| io_error(format!("Failed to canonicalize {}: {e}", path.display())))?;
        let mut url = String::from(FILE_SCHEME);
        let forward = canonical.to_string_lossy().replace('\\', "/");
        if !forward.starts_with('/') {
            url.push('/');
        }
        url.push_str(&forward);
        if canonical.is_dir() && !url.ends_with('/') {
            url.push('/');
        }
        Ok(Self { url })
    }

    /// Reference to an entry nested inside this archive
    pub fn nested(&self, entry: &str) -> Self {
        Self {
            url: format!("{NESTED_SCHEME}{}{NESTED_SEPARATOR}{entry}", self.url),
        }
    }

    /// Canonical string form
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Whether this artifact is a directory (exploded bundle or build output)
    pub fn is_directory(&self) -> bool {
        self.url.ends_with('/')
    }

    /// Whether this artifact lives inside a packaged archive
    pub fn is_nested(&self) -> bool {
        self.url.starts_with(NESTED_SCHEME)
    }

    /// Split a nested reference into its outer archive and entry path
    pub fn split_nested(&self) -> Option<(ArtifactRef, &str)> {
        let rest = self.url.strip_prefix(NESTED_SCHEME)?;
        let idx = rest.rfind(NESTED_SEPARATOR)?;
        Some((
            ArtifactRef::new(&rest[..idx]),
            &rest[idx + NESTED_SEPARATOR.len()..],
        ))
    }

    /// Last path segment, ignoring a trailing `/`
    pub fn file_name(&self) -> &str {
        let trimmed = self.url.trim_end_matches('/');
        trimmed
            .rsplit(['/', '!', ':'])
            .next()
            .unwrap_or(trimmed)
    }

    /// Filesystem path for `file:` references
    pub fn to_path(&self) -> Option<PathBuf> {
        let raw = self.url.strip_prefix(FILE_SCHEME)?;
        let raw = raw.strip_prefix("//").unwrap_or(raw);
        if cfg!(windows) {
            let bytes = raw.as_bytes();
            if bytes.len() > 2 && bytes[0] == b'/' && bytes[2] == b':' {
                return Some(PathBuf::from(&raw[1..]));
            }
        }
        Some(PathBuf::from(raw))
    }

    /// Count non-overlapping occurrences of `needle` in the string form
    pub fn count_matches(&self, needle: &str) -> usize {
        if needle.is_empty() {
            return 0;
        }
        self.url.matches(needle).count()
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl From<&str> for ArtifactRef {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// An ordered, duplicate-free set of artifacts handed to an isolation context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Classpath {
    entries: Vec<ArtifactRef>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact; returns `false` if it was already present
    pub fn push(&mut self, artifact: ArtifactRef) -> bool {
        if !self.seen.insert(artifact.as_str().to_string()) {
            return false;
        }
        self.entries.push(artifact);
        true
    }

    pub fn contains(&self, artifact: &ArtifactRef) -> bool {
        self.seen.contains(artifact.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactRef> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ArtifactRef] {
        &self.entries
    }

    /// Whether any entry is a packaged archive or lives inside one
    pub fn has_packaged(&self) -> bool {
        self.entries
            .iter()
            .any(|a| a.is_nested() || !a.is_directory())
    }
}

impl Extend<ArtifactRef> for Classpath {
    fn extend<T: IntoIterator<Item = ArtifactRef>>(&mut self, iter: T) {
        for artifact in iter {
            self.push(artifact);
        }
    }
}

impl FromIterator<ArtifactRef> for Classpath {
    fn from_iter<T: IntoIterator<Item = ArtifactRef>>(iter: T) -> Self {
        let mut classpath = Classpath::new();
        classpath.extend(iter);
        classpath
    }
}

impl<'a> IntoIterator for &'a Classpath {
    type Item = &'a ArtifactRef;
    type IntoIter = std::slice::Iter<'a, ArtifactRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
