//! Probe configuration
//!
//! Handles:
//! - Sampling interval for rate metrics
//! - Metric source locations (proc files, systemd tools)
//! - Default log level
//!
//! Every setting is optional; a missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::sampler::DEFAULT_SAMPLE_INTERVAL;

pub const CONFIG_ENV: &str = "SYMBION_PROBES_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub sampling: SamplingConfig,
    pub sources: SourceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub proc_stat: PathBuf,
    pub tcp_tables: Vec<PathBuf>,
    pub systemctl: String,
    pub journalctl: String,
    pub command_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            proc_stat: PathBuf::from("/proc/stat"),
            tcp_tables: vec![
                PathBuf::from("/proc/net/tcp"),
                PathBuf::from("/proc/net/tcp6"),
            ],
            systemctl: "systemctl".to_string(),
            journalctl: "journalctl".to_string(),
            command_timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sampling.interval_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.command_timeout_secs)
    }

    /// Load from an explicit path, `SYMBION_PROBES_CONFIG`, or the OS config
    /// directory. Falls back to defaults when nothing usable is found.
    ///
    /// A file that exists but does not parse also yields defaults, together
    /// with the reason. Logging is not set up yet at this point, so the
    /// caller reports it through [`warn_rejected`] once it is.
    pub fn load(explicit: Option<&Path>) -> (Self, Option<anyhow::Error>) {
        let path = match explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| Self::config_file_path().ok())
        {
            Some(path) => path,
            None => return (Self::default(), None),
        };

        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return (Self::default(), None);
        }

        match Self::from_file(&path) {
            Ok(config) => (config, None),
            Err(e) => {
                let reason = e.context(format!("Invalid probe config {}", path.display()));
                (Self::default(), Some(reason))
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse probe config")
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("symbion-probes");
        path.push("config.toml");
        Ok(path)
    }
}

/// Log a config file rejected by [`ProbeConfig::load`]
pub fn warn_rejected(reason: &anyhow::Error) {
    warn!("{:#}; using defaults", reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.sample_interval(), DEFAULT_SAMPLE_INTERVAL);
        assert_eq!(config.sample_interval(), Duration::from_millis(1000));
        assert_eq!(config.sources.proc_stat, PathBuf::from("/proc/stat"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_toml() {
        let config = ProbeConfig::from_toml("[sampling]\ninterval_ms = 250\n").unwrap();
        assert_eq!(config.sample_interval(), Duration::from_millis(250));
        assert_eq!(config.sources, SourceConfig::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[sampling]\ninterval_ms = \"soon\"\n").unwrap();

        assert!(ProbeConfig::from_file(file.path()).is_err());
        let (config, rejected) = ProbeConfig::load(Some(file.path()));
        assert_eq!(config, ProbeConfig::default());

        let reason = format!("{:#}", rejected.unwrap());
        assert!(reason.starts_with("Invalid probe config"));
        assert!(reason.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_valid_file_is_not_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[sampling]\ninterval_ms = 250\n").unwrap();

        let (config, rejected) = ProbeConfig::load(Some(file.path()));
        assert_eq!(config.sample_interval(), Duration::from_millis(250));
        assert!(rejected.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let (config, rejected) = ProbeConfig::load(Some(Path::new("/symbion/missing/config.toml")));
        assert_eq!(config, ProbeConfig::default());
        assert!(rejected.is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_rejected_config_is_logged_as_warning() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[sampling]\ninterval_ms = \"soon\"\n").unwrap();
        let (_, rejected) = ProbeConfig::load(Some(file.path()));

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, || warn_rejected(&rejected.unwrap()));

        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("WARN"));
        assert!(logged.contains("Invalid probe config"));
        assert!(logged.contains("using defaults"));
    }

    #[test]
    fn test_config_file_path() {
        if let Ok(path) = ProbeConfig::config_file_path() {
            assert!(path.to_string_lossy().contains("symbion-probes"));
            assert!(path.ends_with("config.toml"));
        }
    }
}
