//! Common test utilities for isolated runner integration tests

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use isolated_runner::ArtifactRef;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// A scratch area holding bundles, host artifacts and a local repository
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = dunce::canonicalize(temp.path()).expect("Failed to canonicalize temp directory");
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &[u8]) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Create an exploded bundle directory with a manifest
    pub fn create_dir_bundle(&self, path: &str, class_path: &str, start_class: &str) -> PathBuf {
        let manifest = format!(
            "Manifest-Version: 1.0\nStart-Class: {start_class}\nClass-Path: {class_path}\n\n"
        );
        self.write_file(&format!("{path}/META-INF/MANIFEST.MF"), manifest.as_bytes());
        self.write_file(&format!("{path}/application.yaml"), b"server.port: 0\n");
        self.path.join(path)
    }

    /// Create an empty archive standing in for a dependency
    pub fn create_lib(&self, path: &str) -> PathBuf {
        self.write_file(path, &zip_bytes(&[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")]))
    }

    /// Create a zip archive with the given entries
    pub fn create_archive(&self, path: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        self.write_file(path, &zip_bytes(entries))
    }

    /// Canonical reference to a workspace path
    pub fn artifact(&self, path: &Path) -> ArtifactRef {
        ArtifactRef::from_path(path).expect("Failed to build artifact reference")
    }

    /// Platform path list of the given paths
    pub fn path_list(paths: &[&PathBuf]) -> String {
        std::env::join_paths(paths)
            .expect("Failed to join paths")
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an in-memory zip archive
#[allow(dead_code)]
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .expect("Failed to add directory");
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("Failed to start file");
            writer.write_all(content).expect("Failed to write entry");
        }
    }
    writer.finish().expect("Failed to finish archive").into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_dir_bundle_layout() {
        let workspace = TestWorkspace::new();
        let dir = workspace.create_dir_bundle("orders/target/classes", "a-1.0.jar", "com.acme.App");
        assert!(dir.join("META-INF/MANIFEST.MF").is_file());
        assert!(workspace.artifact(&dir).is_directory());
    }
}
