//! Configuration management for apkforge
//!
//! Settings are read from environment variables with defaults, then
//! overridden by command-line flags.
//!
//! # Environment Variables
//!
//! - `APKFORGE_HOME`: toolset directory - default: `<data dir>/apkforge`, or `./library`
//! - `APKFORGE_WORK_DIR`: root for per-run workspaces - default: `<temp dir>/apkforge`
//! - `APKFORGE_CATALOGUE`: TOML file replacing the built-in tool catalogue
//! - `APKFORGE_COMPACT_URL`: repository holding a prebuilt toolset
//! - `APKFORGE_COMPACT_BRANCH`: branch of that repository
//! - `APKFORGE_LOG_LEVEL`: trace|debug|info|warn|error - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use apkforge::ApkforgeConfig;
//!
//! let config = ApkforgeConfig::default();
//! config.validate().expect("Invalid configuration");
//! let catalogue = config.load_catalogue().expect("Invalid catalogue");
//! ```

use crate::toolset::{SourceLocation, ToolCatalogue};
use std::env;
use std::fmt;
use std::path::{self, PathBuf};
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_COMPACT_URL: &str = "https://github.com/thisislibra/apc-compact.git";
const DEFAULT_COMPACT_BRANCH: &str = "28-07-2020";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct ApkforgeConfig {
    /// Directory holding the provisioned tools
    pub toolset_dir: PathBuf,

    /// Directory under which per-run workspaces are created
    pub work_dir: PathBuf,

    /// Optional catalogue file replacing the built-in one
    pub catalogue_path: Option<PathBuf>,

    /// Source of the prebuilt toolset used by compact installs
    pub compact_source: SourceLocation,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ApkforgeConfig {
    /// Loads the configuration from `APKFORGE_*` environment variables
    fn default() -> Self {
        let toolset_dir = env::var("APKFORGE_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("apkforge")))
            .unwrap_or_else(|| PathBuf::from("library"));

        let work_dir = env::var("APKFORGE_WORK_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("apkforge"));

        let catalogue_path = env::var("APKFORGE_CATALOGUE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let compact_source = SourceLocation {
            url: env::var("APKFORGE_COMPACT_URL")
                .unwrap_or_else(|_| DEFAULT_COMPACT_URL.to_string()),
            branch: env::var("APKFORGE_COMPACT_BRANCH")
                .unwrap_or_else(|_| DEFAULT_COMPACT_BRANCH.to_string()),
        };

        let log_level = env::var("APKFORGE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            toolset_dir: absolute_or_unchanged(toolset_dir),
            work_dir: absolute_or_unchanged(work_dir),
            catalogue_path,
            compact_source,
            log_level,
        }
    }
}

impl ApkforgeConfig {
    /// Applies command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        toolset_dir: Option<PathBuf>,
        work_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = toolset_dir {
            self.toolset_dir = absolute_or_unchanged(dir);
        }
        if let Some(dir) = work_dir {
            self.work_dir = absolute_or_unchanged(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.toolset_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Toolset directory must not be empty".to_string(),
            ));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Work directory must not be empty".to_string(),
            ));
        }
        // provisioning empties the toolset root
        if self.work_dir.starts_with(&self.toolset_dir) {
            return Err(ConfigError::ValidationFailed(format!(
                "Work directory {} must not be inside the toolset directory {}",
                self.work_dir.display(),
                self.toolset_dir.display()
            )));
        }
        if self.compact_source.url.is_empty() || self.compact_source.branch.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Compact install source needs a url and a branch".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// The configured catalogue file, or the built-in catalogue
    pub fn load_catalogue(&self) -> Result<ToolCatalogue, ConfigError> {
        match &self.catalogue_path {
            Some(path) => ToolCatalogue::from_file(path),
            None => Ok(ToolCatalogue::standard()),
        }
    }
}

/// Tools run from their own directories, so configured roots are kept absolute.
/// An empty path stays empty for `validate` to reject.
fn absolute_or_unchanged(dir: PathBuf) -> PathBuf {
    path::absolute(&dir).unwrap_or(dir)
}

impl fmt::Display for ApkforgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Apkforge Configuration:")?;
        writeln!(f, "  Toolset Dir: {}", self.toolset_dir.display())?;
        writeln!(f, "  Work Dir: {}", self.work_dir.display())?;
        match &self.catalogue_path {
            Some(path) => writeln!(f, "  Catalogue: {}", path.display())?,
            None => writeln!(f, "  Catalogue: built-in")?,
        }
        writeln!(
            f,
            "  Compact Source: {} ({})",
            self.compact_source.url, self.compact_source.branch
        )?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    /// Sets or clears an environment variable for the lifetime of the guard
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("APKFORGE_HOME"),
            EnvGuard::unset("APKFORGE_WORK_DIR"),
            EnvGuard::unset("APKFORGE_CATALOGUE"),
            EnvGuard::unset("APKFORGE_COMPACT_URL"),
            EnvGuard::unset("APKFORGE_COMPACT_BRANCH"),
            EnvGuard::unset("APKFORGE_LOG_LEVEL"),
        ];

        let config = ApkforgeConfig::default();

        assert!(
            config.toolset_dir.ends_with("apkforge") || config.toolset_dir.ends_with("library")
        );
        assert!(config.toolset_dir.is_absolute());
        assert_eq!(config.work_dir, env::temp_dir().join("apkforge"));
        assert!(config.catalogue_path.is_none());
        assert_eq!(config.compact_source.url, DEFAULT_COMPACT_URL);
        assert_eq!(config.compact_source.branch, DEFAULT_COMPACT_BRANCH);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("APKFORGE_HOME", "/opt/apkforge"),
            EnvGuard::set("APKFORGE_WORK_DIR", "/var/tmp/apkforge"),
            EnvGuard::set("APKFORGE_CATALOGUE", "/etc/apkforge/tools.toml"),
            EnvGuard::set("APKFORGE_COMPACT_URL", "https://example.com/compact.git"),
            EnvGuard::set("APKFORGE_COMPACT_BRANCH", "stable"),
            EnvGuard::set("APKFORGE_LOG_LEVEL", "DEBUG"),
        ];

        let config = ApkforgeConfig::default();

        assert_eq!(config.toolset_dir, PathBuf::from("/opt/apkforge"));
        assert_eq!(config.work_dir, PathBuf::from("/var/tmp/apkforge"));
        assert_eq!(config.catalogue_path, Some(PathBuf::from("/etc/apkforge/tools.toml")));
        assert_eq!(config.compact_source.url, "https://example.com/compact.git");
        assert_eq!(config.compact_source.branch, "stable");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_overrides_win() {
        let _guard = EnvGuard::set("APKFORGE_HOME", "/opt/apkforge");

        let config =
            ApkforgeConfig::default().with_overrides(Some(PathBuf::from("/custom")), None);

        assert_eq!(config.toolset_dir, PathBuf::from("/custom"));
    }

    #[test]
    #[serial]
    fn test_validation_invalid_log_level() {
        let _guard = EnvGuard::set("APKFORGE_LOG_LEVEL", "loud");
        let config = ApkforgeConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    #[serial]
    fn test_validation_rejects_shared_directory() {
        let config = ApkforgeConfig::default()
            .with_overrides(Some(PathBuf::from("/same")), Some(PathBuf::from("/same")));
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_validation_rejects_work_dir_inside_toolset() {
        let config = ApkforgeConfig::default().with_overrides(
            Some(PathBuf::from("/opt/apkforge")),
            Some(PathBuf::from("/opt/apkforge/temp")),
        );

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("must not be inside the toolset directory"));
    }

    #[test]
    #[serial]
    fn test_sibling_work_dir_is_accepted() {
        let _guard = EnvGuard::unset("APKFORGE_LOG_LEVEL");
        let config = ApkforgeConfig::default().with_overrides(
            Some(PathBuf::from("/opt/apkforge")),
            Some(PathBuf::from("/opt/apkforge-work")),
        );
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn test_relative_directories_become_absolute() {
        let _guards = vec![
            EnvGuard::set("APKFORGE_HOME", "library"),
            EnvGuard::set("APKFORGE_WORK_DIR", "scratch"),
        ];
        let cwd = env::current_dir().unwrap();

        let config = ApkforgeConfig::default();
        assert_eq!(config.toolset_dir, cwd.join("library"));
        assert_eq!(config.work_dir, cwd.join("scratch"));

        let config = config.with_overrides(
            Some(PathBuf::from("tools")),
            Some(PathBuf::from("runs/work")),
        );
        assert!(config.toolset_dir.is_absolute());
        assert_eq!(config.work_dir, cwd.join("runs/work"));
    }

    #[test]
    #[serial]
    fn test_load_catalogue_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tools.toml");
        fs::write(
            &path,
            r#"
            [[tool]]
            name = "jadx"
            source = { url = "https://example.com/jadx.git", branch = "main" }
            "#,
        )
        .unwrap();
        let _guard = EnvGuard::set("APKFORGE_CATALOGUE", path.to_str().unwrap());

        let catalogue = ApkforgeConfig::default().load_catalogue().unwrap();

        assert_eq!(catalogue.names().collect::<Vec<_>>(), vec!["jadx"]);
    }

    #[test]
    #[serial]
    fn test_load_catalogue_missing_file() {
        let _guard = EnvGuard::set("APKFORGE_CATALOGUE", "/nonexistent/tools.toml");
        let err = ApkforgeConfig::default().load_catalogue().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _guard = EnvGuard::unset("APKFORGE_CATALOGUE");
        let rendered = ApkforgeConfig::default().to_string();
        assert!(rendered.contains("Toolset Dir"));
        assert!(rendered.contains("Catalogue: built-in"));
    }
}
