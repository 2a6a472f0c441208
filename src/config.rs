//! Service configuration file.
//!
//! An optional YAML file supplies defaults that command-line flags override:
//!
//! ```yaml
//! addr: 0.0.0.0:8080
//! ui_dir: ./ui
//! log_level: debug
//! log_format: pretty
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Listen address, `host:port`
    pub addr: Option<String>,
    /// Directory served under `/ui`
    pub ui_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// `json` or `pretty`
    pub log_format: Option<String>,
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Listen address, falling back to [`DEFAULT_ADDR`].
    #[must_use]
    pub fn addr(&self) -> &str {
        self.addr.as_deref().unwrap_or(DEFAULT_ADDR)
    }

    /// Overlay values given on the command line.
    #[must_use]
    pub fn merge_cli(mut self, addr: Option<String>, ui_dir: Option<PathBuf>) -> Self {
        if addr.is_some() {
            self.addr = addr;
        }
        if ui_dir.is_some() {
            self.ui_dir = ui_dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "addr: 0.0.0.0:9000\nlog_format: pretty").unwrap();
        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:9000");
        assert_eq!(config.log_format.as_deref(), Some("pretty"));
        assert!(config.ui_dir.is_none());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = ServiceConfig::load(Path::new("/nonexistent/pets.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: 80").unwrap();
        assert!(matches!(
            ServiceConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = ServiceConfig::from_yaml("addr: 1.2.3.4:5\nui_dir: /srv/ui\n")
            .unwrap()
            .merge_cli(Some("127.0.0.1:7000".into()), None);
        assert_eq!(config.addr(), "127.0.0.1:7000");
        assert_eq!(config.ui_dir, Some(PathBuf::from("/srv/ui")));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServiceConfig::from_yaml("").unwrap();
        assert_eq!(config.addr(), DEFAULT_ADDR);
    }
}
