use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Values from `config.toml`; anything missing keeps its default
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name or path of the `kde` executable
    pub binary: String,

    /// Seconds between automatic tree refreshes
    pub refresh_secs: u64,

    /// Working directory for every command (defaults to the current one)
    pub cwd: Option<PathBuf>,

    /// Command that opens a new terminal, e.g. `["tmux", "new-window", "-n", "{title}"]`
    pub launcher: Option<Vec<String>>,

    /// Entries kept in the activity log
    pub activity_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: "kde".to_string(),
            refresh_secs: 8,
            cwd: None,
            launcher: None,
            activity_capacity: 5000,
        }
    }
}

impl Settings {
    /// `<config_dir>/kdepanel/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kdepanel").join("config.toml"))
    }

    /// Load an explicit file, or the default one when it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("no settings file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml(&contents)
            .map_err(|source| SettingsError::Parse { path: path.clone(), source })?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.binary, "kde");
        assert_eq!(settings.refresh_interval(), Duration::from_secs(8));
        assert!(settings.launcher.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            refresh_secs = 30
            launcher = ["tmux", "new-window", "-n", "{title}"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.binary, "kde");
        assert_eq!(settings.refresh_secs, 30);
        assert_eq!(settings.launcher.as_ref().map(Vec::len), Some(4));
        assert_eq!(settings.activity_capacity, 5000);
    }

    #[test]
    fn test_zero_refresh_is_clamped() {
        let settings = Settings::from_toml("refresh_secs = 0").unwrap();
        assert_eq!(settings.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Settings::from_toml("binnary = \"kde\"").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "binary = \"/opt/kde/bin/kde\"\ncwd = \"/srv/envs\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.binary, "/opt/kde/bin/kde");
        assert_eq!(settings.cwd, Some(PathBuf::from("/srv/envs")));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(SettingsError::Read { .. })
        ));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "refresh_secs = \"soon\"").unwrap();
        let err = Settings::load(Some(&broken)).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
