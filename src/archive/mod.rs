//! Packaged bundle archives
//!
//! A packaged bundle is a zip archive laid out as
//!
//! ```text
//! META-INF/MANIFEST.MF
//! BOOT-INF/classes/...      the bundle's own code
//! BOOT-INF/lib/*.jar        nested dependency archives
//! ```
//!
//! Nested archives are addressed with `jar:` references and read straight out
//! of their parent archive, without extracting anything to disk.

use std::io::{Cursor, Read};

use tracing::debug;
use zip::ZipArchive;

use crate::domain::{ArtifactRef, Classpath};
use crate::error::{Result, archive_read_failed};
use crate::manifest::{MANIFEST_PATH, Manifest};

/// Directory holding the bundle's own code inside a packaged archive
pub const CLASSES_DIR: &str = "BOOT-INF/classes/";

/// Directory holding nested dependency archives
pub const LIB_DIR: &str = "BOOT-INF/lib/";

/// Read the raw bytes behind a `file:` or `jar:` reference
pub fn read_bytes(artifact: &ArtifactRef) -> Result<Vec<u8>> {
    if let Some((outer, entry)) = artifact.split_nested() {
        let mut archive = PackagedArchive::open(&outer)?;
        return archive.entry_bytes(entry);
    }

    let path = artifact
        .to_path()
        .ok_or_else(|| archive_read_failed(artifact.as_str(), "unsupported URL scheme"))?;
    std::fs::read(&path).map_err(|e| archive_read_failed(artifact.as_str(), e.to_string()))
}

/// An opened packaged archive
pub struct PackagedArchive {
    artifact: ArtifactRef,
    zip: ZipArchive<Cursor<Vec<u8>>>,
}

impl PackagedArchive {
    /// Open a packaged archive from the filesystem or from inside another archive
    pub fn open(artifact: &ArtifactRef) -> Result<Self> {
        let bytes = read_bytes(artifact)?;
        let zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| archive_read_failed(artifact.as_str(), e.to_string()))?;
        Ok(Self {
            artifact: artifact.clone(),
            zip,
        })
    }

    pub fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    /// Bytes of a single entry
    pub fn entry_bytes(&mut self, entry: &str) -> Result<Vec<u8>> {
        let url = self.artifact.nested(entry);
        let mut file = self
            .zip
            .by_name(entry)
            .map_err(|e| archive_read_failed(url.as_str(), e.to_string()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| archive_read_failed(url.as_str(), e.to_string()))?;
        Ok(bytes)
    }

    /// The archive's `META-INF/MANIFEST.MF`, if it has one
    pub fn manifest(&mut self) -> Result<Option<Manifest>> {
        if self.zip.index_for_name(MANIFEST_PATH).is_none() {
            return Ok(None);
        }
        let bytes = self.entry_bytes(MANIFEST_PATH)?;
        Ok(Some(Manifest::parse(&String::from_utf8_lossy(&bytes))))
    }

    fn has_classes_dir(&self) -> bool {
        self.zip.file_names().any(|name| name.starts_with(CLASSES_DIR))
    }

    fn nested_libs(&self) -> Vec<String> {
        let mut libs: Vec<String> = self
            .zip
            .file_names()
            .filter(|name| name.starts_with(LIB_DIR) && !name.ends_with('/'))
            .map(str::to_string)
            .collect();
        libs.sort();
        libs
    }

    /// Expand the archive into the artifacts its own code needs.
    ///
    /// The archive's classes come first, then every nested library, each one
    /// immediately followed by its own nested libraries (depth-first).
    pub fn classpath_archives(&mut self) -> Result<Classpath> {
        let mut classpath = Classpath::new();
        if self.has_classes_dir() {
            classpath.push(self.artifact.nested(CLASSES_DIR));
        } else {
            classpath.push(self.artifact.clone());
        }
        self.expand_into(&mut classpath)?;
        Ok(classpath)
    }

    fn expand_into(&mut self, classpath: &mut Classpath) -> Result<()> {
        for lib in self.nested_libs() {
            let nested = self.artifact.nested(&lib);
            debug!(archive = %nested, "expanding nested archive");
            classpath.push(nested.clone());
            let mut child = PackagedArchive::open(&nested)?;
            child.expand_into(classpath)?;
        }
        Ok(())
    }
}
