// src/config.rs

use crate::logging::project_directory;
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default port of the scan server's REST interface.
pub const DEFAULT_PORT: u16 = 4810;

/// Submissions can take a while to be accepted, the server parses and checks
/// all commands before it answers.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const CONFIG_FILE: &str = "config.json";

/// Where the scan server lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Loads the config file if there is one, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        info!(host = %settings.host, port = settings.port, "Settings loaded.");
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Reading config file.");
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Cannot read {}", path.display()))?;
        Self::from_json(&text).wrap_err_with(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies `SCAN_SUBMIT_HOST`, `SCAN_SUBMIT_PORT` and `SCAN_SUBMIT_TIMEOUT`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SCAN_SUBMIT_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SCAN_SUBMIT_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| eyre!("Invalid SCAN_SUBMIT_PORT '{}': {}", port, e))?;
        }
        if let Some(timeout) = lookup("SCAN_SUBMIT_TIMEOUT") {
            self.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|e| eyre!("Invalid SCAN_SUBMIT_TIMEOUT '{}': {}", timeout, e))?;
        }
        if self.host.trim().is_empty() {
            return Err(eyre!("Scan server host must not be empty"));
        }
        Ok(())
    }

    /// `http://host:port`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

pub fn config_path() -> Option<PathBuf> {
    project_directory().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_scan_server() {
        let settings = Settings::default();
        assert_eq!(settings.base_url(), "http://localhost:4810");
        assert_eq!(settings.timeout_secs, 120);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "host": "scan.example.org" }"#).unwrap();
        assert_eq!(settings.host, "scan.example.org");
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(env(&[("SCAN_SUBMIT_HOST", "beamline"), ("SCAN_SUBMIT_PORT", "9000")]))
            .unwrap();
        assert_eq!(settings.base_url(), "http://beamline:9000");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut settings = Settings::default();
        let result = settings.apply_overrides(env(&[("SCAN_SUBMIT_PORT", "high")]));
        assert!(result.is_err());
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut settings = Settings::default();
        assert!(settings.apply_overrides(env(&[("SCAN_SUBMIT_HOST", " ")])).is_err());
    }

    #[test]
    fn config_file_is_read() {
        let path = std::env::temp_dir().join(format!("scan-submit-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "port": 5000, "timeout_secs": 5 }"#).unwrap();
        let settings = Settings::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.timeout_secs, 5);
    }
}
