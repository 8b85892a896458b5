//! Configuration file (`tweakbox.toml`) and resolved settings
//!
//! ```toml
//! plugins_dir = "~/tweaks/plugins"
//! scripts_dir = "~/tweaks/scripts"
//! jobs = 4
//!
//! [shell]
//! plain = "cmd.exe"
//! script = "powershell.exe"
//! ```
//!
//! Every field is optional. Command-line flags (and their environment
//! variables) take precedence over the file.

use anyhow::{Context, Result};
use plugkit::ShellPrograms;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

/// On-disk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Manifest directory (supports ~ and $VARS)
    #[serde(default)]
    pub plugins_dir: Option<String>,

    /// Script directory (supports ~ and $VARS)
    #[serde(default)]
    pub scripts_dir: Option<String>,

    /// Number of threads used to probe plugins during discovery
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Interpreter overrides
    #[serde(default)]
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Program for plain commands
    #[serde(default)]
    pub plain: Option<String>,

    /// Program for PowerShell commands and scripts
    #[serde(default)]
    pub script: Option<String>,
}

fn default_jobs() -> usize {
    plugkit::catalog::DEFAULT_PROBE_JOBS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugins_dir: None,
            scripts_dir: None,
            jobs: default_jobs(),
            shell: ShellConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Interpreter programs, with platform defaults for unset fields
    pub fn shell_programs(&self) -> ShellPrograms {
        let defaults = ShellPrograms::default();
        ShellPrograms {
            plain: self.shell.plain.clone().unwrap_or(defaults.plain),
            script: self.shell.script.clone().unwrap_or(defaults.script),
        }
    }
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    pub plugins_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub jobs: usize,
    pub programs: ShellPrograms,
}

impl Settings {
    /// Combine command-line overrides, the config file, and defaults
    /// rooted at `config_dir`
    pub fn resolve(
        plugins_override: Option<PathBuf>,
        scripts_override: Option<PathBuf>,
        config: &Config,
        config_dir: &Path,
    ) -> Self {
        let plugins_dir = plugins_override
            .or_else(|| config.plugins_dir.as_deref().map(paths::expand))
            .unwrap_or_else(|| config_dir.join("plugins"));

        let scripts_dir = scripts_override
            .or_else(|| config.scripts_dir.as_deref().map(paths::expand))
            .unwrap_or_else(|| config_dir.join("scripts"));

        Self {
            plugins_dir,
            scripts_dir,
            jobs: config.jobs.max(1),
            programs: config.shell_programs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("tweakbox.toml")).unwrap();

        assert!(config.plugins_dir.is_none());
        assert_eq!(config.jobs, plugkit::catalog::DEFAULT_PROBE_JOBS);
        assert_eq!(config.shell_programs(), ShellPrograms::default());
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tweakbox.toml");
        std::fs::write(
            &path,
            r#"
plugins_dir = "/opt/tweaks/plugins"
jobs = 8

[shell]
script = "powershell.exe"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.plugins_dir.as_deref(), Some("/opt/tweaks/plugins"));
        assert_eq!(config.jobs, 8);

        let programs = config.shell_programs();
        assert_eq!(programs.script, "powershell.exe");
        assert_eq!(programs.plain, ShellPrograms::default().plain);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tweakbox.toml");
        std::fs::write(&path, "plugins_dir = [").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let base = Path::new("/base");
        let config = Config {
            plugins_dir: Some("/from/config".to_string()),
            ..Config::default()
        };

        let settings = Settings::resolve(None, None, &config, base);
        assert_eq!(settings.plugins_dir, PathBuf::from("/from/config"));
        assert_eq!(settings.scripts_dir, PathBuf::from("/base/scripts"));

        let settings = Settings::resolve(
            Some(PathBuf::from("/from/cli")),
            Some(PathBuf::from("/cli/scripts")),
            &config,
            base,
        );
        assert_eq!(settings.plugins_dir, PathBuf::from("/from/cli"));
        assert_eq!(settings.scripts_dir, PathBuf::from("/cli/scripts"));
    }

    #[test]
    fn test_zero_jobs_clamped() {
        let config = Config {
            jobs: 0,
            ..Config::default()
        };
        let settings = Settings::resolve(None, None, &config, Path::new("/base"));
        assert_eq!(settings.jobs, 1);
    }
}
