//! Dependency declarations read from a bundle manifest
//!
//! A declaration is the bare file name of an archive the bundle was built
//! against (`lib-core-1.4.0.jar`). Name stem, version and extension are
//! encoded positionally.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// `<stem>-<version>.<ext>` where the version is the first hyphen-delimited
/// run starting with a digit
#[allow(clippy::expect_used)]
static VERSIONED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)-(\d.*)\.([^./]+)$").expect("valid pattern"));

/// A dependency file name declared in a bundle manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyDeclaration {
    file_name: String,
}

/// The positional parts of a versioned file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedName<'a> {
    pub stem: &'a str,
    pub version: &'a str,
    pub extension: &'a str,
}

impl VersionedName<'_> {
    /// Hyphen-separated words of the stem
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.stem.split('-').filter(|w| !w.is_empty())
    }
}

impl DependencyDeclaration {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Split a manifest `Class-Path` value on whitespace
    pub fn parse_list(manifest_classpath: &str) -> Vec<Self> {
        manifest_classpath
            .split_whitespace()
            .map(Self::new)
            .collect()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Stem, version and extension, if the name follows `name-version.ext`
    pub fn versioned(&self) -> Option<VersionedName<'_>> {
        let caps = VERSIONED_NAME.captures(&self.file_name)?;
        Some(VersionedName {
            stem: caps.get(1)?.as_str(),
            version: caps.get(2)?.as_str(),
            extension: caps.get(3)?.as_str(),
        })
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}
