//! Bundle manifest parsing
//!
//! A manifest is a textual `Name: value` record. Lines longer than the
//! writer's wrap width continue on the next line, which starts with a single
//! space. The main section ends at the first blank line.

use std::path::Path;

use crate::error::{Result, manifest_read_failed};

/// Location of the manifest inside a bundle directory or archive
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Header listing the dependency file names of a bundle
pub const CLASS_PATH: &str = "Class-Path";

/// Header naming the application entry point of a packaged bundle
pub const START_CLASS: &str = "Start-Class";

/// Main section attributes of a bundle manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    attributes: Vec<(String, String)>,
}

impl Manifest {
    /// Parse manifest text, keeping the main section only
    pub fn parse(text: &str) -> Self {
        let mut attributes: Vec<(String, String)> = Vec::new();

        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = attributes.last_mut() {
                    value.push_str(continuation);
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                attributes.push((name.trim().to_string(), value.to_string()));
            }
        }

        Self { attributes }
    }

    /// Read `META-INF/MANIFEST.MF` from an exploded bundle directory
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_PATH);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| manifest_read_failed(path.display().to_string(), e.to_string()))?;
        Ok(Self::parse(&text))
    }

    /// Header value, matched case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `Class-Path` value, empty when absent
    pub fn class_path(&self) -> &str {
        self.get(CLASS_PATH).unwrap_or_default()
    }

    pub fn start_class(&self) -> Option<&str> {
        self.get(START_CLASS)
    }
}
