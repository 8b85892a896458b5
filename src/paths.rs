//! Centralized path resolution for tweakbox
//!
//! # Environment Variables
//!
//! - `TWEAKBOX_CONFIG_DIR` - Override config directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `TWEAKBOX_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/tweakbox` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\tweakbox`
//!    - macOS/Linux: `~/.config/tweakbox`
//!
//! Plugin and script directories live under the config directory unless
//! the config file or the command line says otherwise.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "TWEAKBOX_CONFIG_DIR";

/// Get the tweakbox config directory path
pub fn config_dir() -> Result<PathBuf> {
    // 1. Check environment variable override
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    // 2. Check XDG_CONFIG_HOME
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("tweakbox");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    // 3. Platform default
    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("tweakbox");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("tweakbox");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Path of the config file inside the config directory
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("tweakbox.toml"))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Run `f` with `key` set to `value`, restoring the previous value.
    ///
    /// Env vars are process-global; tests touching the same key must not
    /// run concurrently, so each test uses its own key where it can.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/tweakbox", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/tweakbox"));
            assert_eq!(
                config_file().unwrap(),
                PathBuf::from("/custom/tweakbox/tweakbox.toml")
            );
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/plugins");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("plugins"));
    }

    #[test]
    fn test_expand_with_env_var() {
        with_env_var("TWEAKBOX_TEST_VAR", "value", || {
            assert_eq!(
                expand("/path/$TWEAKBOX_TEST_VAR/file"),
                PathBuf::from("/path/value/file")
            );
        });
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
