//! Runner configuration (runner.yaml)
//!
//! Every field has a default, so an absent or empty file yields a working
//! configuration. Environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, config_invalid, config_parse_failed, config_read_failed};

/// Default configuration directory name under the user's config directory
const CONFIG_DIR: &str = "isolated-runner";

/// Default configuration file name
pub const CONFIG_FILE: &str = "runner.yaml";

/// Environment variable naming a local repository root, bypassing the query command
pub const REPOSITORY_ENV: &str = "ISOLATED_RUNNER_REPOSITORY";

/// How the version-tolerant pass reports a near-version match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Substitute the declared version into the candidate's reference, even if
    /// nothing exists at the rewritten location
    #[default]
    Rewrite,
    /// Substitute only when the rewritten file exists, keep the candidate otherwise
    Verify,
}

/// Local package repository lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Known repository root; skips the query command when set
    pub root: Option<PathBuf>,

    /// Shell command printing the repository root on stdout
    pub command: String,

    /// Seconds to wait for the query command before killing it
    pub timeout_secs: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            root: None,
            command: "mvn help:evaluate -Dexpression=settings.localRepository -q -DforceStdout"
                .to_string(),
            timeout_secs: 30,
        }
    }
}

impl RepositoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Identifier groups locating the runner's own support artifacts, which are
    /// added to every isolated classpath
    pub runner_artifacts: Vec<Vec<String>>,

    /// Identifiers of the test-harness artifact whose manifest overrides the
    /// host artifact set
    pub override_marker: Vec<String>,

    /// Path fragment marking a sibling project's build output directory
    pub workspace_marker: String,

    /// Handling of near-version matches
    pub version_policy: VersionPolicy,

    /// Symbol of the bootstrap shipped with the runner artifacts
    pub bootstrap_symbol: String,

    pub repository: RepositoryConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            runner_artifacts: vec![vec!["isolated-runner".to_string()]],
            override_marker: vec![
                "surefire".to_string(),
                "surefirebooter".to_string(),
                "jar".to_string(),
            ],
            workspace_marker: "target/classes".to_string(),
            version_policy: VersionPolicy::default(),
            bootstrap_symbol: crate::isolation::BOOTSTRAP_SYMBOL.to_string(),
            repository: RepositoryConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present, built-in defaults otherwise. Environment overrides are
    /// applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let mut config = match source {
            Some(path) => {
                let yaml = std::fs::read_to_string(&path).map_err(|e| {
                    config_read_failed(path.display().to_string(), e.to_string())
                })?;
                Self::from_yaml(&yaml).map_err(|e| match e {
                    crate::error::RunnerError::ConfigParseFailed { reason, .. } => {
                        config_parse_failed(path.display().to_string(), reason)
                    }
                    other => other,
                })?
            }
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(root) = std::env::var(REPOSITORY_ENV) {
            if !root.trim().is_empty() {
                self.repository.root = Some(PathBuf::from(root.trim()));
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.workspace_marker.trim().is_empty() {
            return Err(config_invalid("workspace_marker cannot be empty"));
        }
        if self.bootstrap_symbol.trim().is_empty() {
            return Err(config_invalid("bootstrap_symbol cannot be empty"));
        }
        if self.repository.timeout_secs == 0 {
            return Err(config_invalid("repository.timeout_secs must be positive"));
        }
        for group in &self.runner_artifacts {
            if group.is_empty() || group.iter().any(|id| id.is_empty()) {
                return Err(config_invalid(
                    "runner_artifacts entries must be non-empty identifier lists",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.workspace_marker, "target/classes");
        assert_eq!(config.repository.timeout(), Duration::from_secs(30));
        assert_eq!(config.version_policy, VersionPolicy::Rewrite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = RunnerConfig::from_yaml(
            r#"
workspace_marker: "build/classes"
version_policy: verify
repository:
  timeout_secs: 5
"#,
        )
        .unwrap();
        assert_eq!(config.workspace_marker, "build/classes");
        assert_eq!(config.version_policy, VersionPolicy::Verify);
        assert_eq!(config.repository.timeout_secs, 5);
        assert!(config.repository.command.starts_with("mvn"));
        assert_eq!(config.runner_artifacts, vec![vec!["isolated-runner"]]);
    }

    #[test]
    fn test_from_yaml_empty() {
        assert_eq!(RunnerConfig::from_yaml("").unwrap(), RunnerConfig::default());
    }

    #[test]
    fn test_from_yaml_invalid() {
        let err = RunnerConfig::from_yaml("repository:\n  timeout_secs: 0\n").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));

        let err = RunnerConfig::from_yaml("runner_artifacts: [[]]\n").unwrap_err();
        assert!(err.to_string().contains("runner_artifacts"));
    }

    #[test]
    #[serial]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "override_marker: [\"booter\"]\n").unwrap();

        let config = RunnerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.override_marker, vec!["booter"]);
    }

    #[test]
    #[serial]
    fn test_load_missing_explicit_path() {
        let temp = TempDir::new().unwrap();
        let err = RunnerConfig::load(Some(&temp.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
    }

    #[test]
    #[serial]
    fn test_load_parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "workspace_marker: [unclosed").unwrap();

        let err = RunnerConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    #[serial]
    fn test_repository_env_override() {
        let temp = TempDir::new().unwrap();
        // SAFETY: serialised with the other env-mutating tests
        unsafe { std::env::set_var(REPOSITORY_ENV, temp.path()) };
        let mut config = RunnerConfig::default();
        config.apply_env();
        unsafe { std::env::remove_var(REPOSITORY_ENV) };

        assert_eq!(config.repository.root.as_deref(), Some(temp.path()));
    }
}
