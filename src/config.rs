//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.perfscan.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".perfscan.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Audit provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Artifact storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Downstream reporting settings.
    #[serde(default)]
    pub reporter: ReporterConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Audit provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// PageSpeed Insights endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (optional; raises the provider's quota).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-audit request timeout in seconds.
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            timeout_seconds: default_provider_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string()
}

fn default_provider_timeout() -> u64 {
    120 // a single Lighthouse run can take over a minute
}

/// Which artifact store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local directory
    #[default]
    Fs,
    /// HTTP GET/PUT object endpoint
    Http,
    /// In-process only, nothing survives the run
    Memory,
}

/// Artifact storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the `fs` backend.
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Base URL for the `http` backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds for the `http` backend.
    #[serde(default = "default_storage_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            base_url: None,
            timeout_seconds: default_storage_timeout(),
        }
    }
}

fn default_storage_root() -> String {
    "./artifacts".to_string()
}

fn default_storage_timeout() -> u64 {
    30
}

/// Downstream reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Callback URL; results are printed to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_reporter_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            callback_url: None,
            timeout_seconds: default_reporter_timeout(),
        }
    }
}

fn default_reporter_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their env fallbacks) take precedence over config
    /// file settings, but only when they were actually supplied.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref api_url) = args.api_url {
            self.provider.api_url = api_url.clone();
        }
        if let Some(ref api_key) = args.api_key {
            self.provider.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.provider.timeout_seconds = timeout;
        }

        if let Some(backend) = args.storage {
            self.storage.backend = backend;
        }
        if let Some(ref root) = args.storage_root {
            self.storage.root = root.display().to_string();
        }
        if let Some(ref base_url) = args.storage_url {
            self.storage.base_url = Some(base_url.clone());
        }

        if let Some(ref callback_url) = args.callback_url {
            self.reporter.callback_url = Some(callback_url.clone());
        }

        // Dry runs never touch real storage or the downstream service
        if args.dry_run {
            self.storage.backend = StorageBackend::Memory;
            self.reporter.callback_url = None;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
