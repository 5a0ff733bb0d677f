//! Optional settings file
//!
//! Looked up at `--config`, then `<config_dir>/sshd-algo-check/config.toml`.
//! Every key is optional; command line flags take precedence.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "sshd-algo-check";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Values read from the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default target host
    pub hostname: Option<String>,

    /// Default probe timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Port passed to the SSH client
    pub port: Option<u16>,

    /// SSH client binary or path
    pub ssh_binary: Option<String>,

    /// Extra options placed before the host on the SSH command line
    pub ssh_options: Vec<String>,
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load settings from an explicit path, or the default location if present
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_full_settings() {
        let file = write_config(
            r#"
hostname = "bastion.example.com"
timeout_secs = 5
port = 2222
ssh_binary = "/usr/bin/ssh"
ssh_options = ["-o", "BatchMode=yes"]
"#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.hostname.as_deref(), Some("bastion.example.com"));
        assert_eq!(settings.timeout_secs, Some(5));
        assert_eq!(settings.port, Some(2222));
        assert_eq!(settings.ssh_binary.as_deref(), Some("/usr/bin/ssh"));
        assert_eq!(settings.ssh_options, vec!["-o", "BatchMode=yes"]);
    }

    #[test]
    fn test_empty_settings() {
        let file = write_config("");
        assert_eq!(Settings::load_from(file.path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = write_config("hostnme = \"typo\"\n");
        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }
}
