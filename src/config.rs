//! Configuration: an optional YAML file, overridden by command-line flags.
//!
//! ```yaml
//! api:
//!   base_url: http://localhost:3000/api
//!   page_size: 5
//!   latency_ms: 0
//! view:
//!   discard_superseded: true
//! logging:
//!   level: info
//!   file: txn-browser.log
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::DEFAULT_PAGE_SIZE;

#[derive(Parser, Debug, Default)]
#[command(name = "txn-browser")]
#[command(version)]
#[command(about = "Browse card transactions, all at once or one employee at a time", long_about = None)]
pub struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the transaction API
    #[arg(long, conflicts_with = "fixture")]
    pub api_url: Option<String>,

    /// JSON fixture to serve instead of a live API
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Transactions per page when serving a fixture
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Artificial delay per fixture request, in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Let a superseded fetch overwrite the cache if it settles last
    #[arg(long)]
    pub last_settled_wins: bool,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "txn_browser=trace"
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Where transactions come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP provider when set.
    #[serde(default)]
    pub base_url: Option<String>,
    /// JSON fixture path.  The bundled demo data is used when neither this
    /// nor `base_url` is set.
    #[serde(default)]
    pub fixture: Option<PathBuf>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            fixture: None,
            page_size: DEFAULT_PAGE_SIZE,
            latency_ms: 0,
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Drop the result of a fetch that was superseded while in flight.
    #[serde(default = "default_true")]
    pub discard_superseded: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            discard_superseded: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load the file named by `--config` (if any), then apply the flags.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(url) = &args.api_url {
            self.api.base_url = Some(url.clone());
            self.api.fixture = None;
        }
        if let Some(path) = &args.fixture {
            self.api.fixture = Some(path.clone());
            self.api.base_url = None;
        }
        if let Some(page_size) = args.page_size {
            self.api.page_size = page_size;
        }
        if let Some(latency) = args.latency_ms {
            self.api.latency_ms = latency;
        }
        if args.last_settled_wins {
            self.view.discard_superseded = false;
        }
        if let Some(path) = &args.log_file {
            self.logging.file = Some(path.clone());
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.api.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.view.discard_superseded);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_yaml(
            "api:\n  base_url: http://localhost:3000\nview:\n  discard_superseded: false\n",
        )
        .unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.api.page_size, DEFAULT_PAGE_SIZE);
        assert!(!config.view.discard_superseded);
    }

    #[test]
    fn flags_override_file() {
        let mut config = Config::from_yaml("api:\n  base_url: http://a\n  page_size: 10\n").unwrap();
        let args = Args::parse_from([
            "txn-browser",
            "--fixture",
            "data.json",
            "--last-settled-wins",
            "--log-level",
            "debug",
        ]);

        config.apply_args(&args);

        assert!(config.api.base_url.is_none());
        assert_eq!(config.api.fixture, Some(PathBuf::from("data.json")));
        assert_eq!(config.api.page_size, 10);
        assert!(!config.view.discard_superseded);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn api_url_and_fixture_conflict() {
        let result = Args::try_parse_from(["txn-browser", "--api-url", "http://a", "--fixture", "f.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/config.yaml")),
            ..Args::default()
        };
        assert!(matches!(Config::resolve(&args), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn no_config_file_uses_defaults() {
        let config = Config::resolve(&Args::default()).unwrap();
        assert_eq!(config.api.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.logging.file.is_none());
    }
}
