// src/config.rs
//
// Client configuration, read from TOML. Every field has a default, so an
// absent file or a partial file both load.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{BackwardEntry, CoverQuality, SessionContext};
use crate::error::{AppError, AppResult};
use crate::integrations::mangadex::DEFAULT_API_URL;
use crate::services::{CoverCacheConfig, DEFAULT_PLACEHOLDER_URL, DEFAULT_UPLOADS_URL};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "MANGASHELF_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub covers: CoversConfig,

    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Library backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Manga catalog (chapters and covers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_api_url")]
    pub api_url: String,

    #[serde(default = "default_uploads_url")]
    pub uploads_url: String,

    /// Minimum spacing between two catalog requests
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: default_catalog_api_url(),
            uploads_url: default_uploads_url(),
            min_request_interval_ms: default_min_request_interval_ms(),
        }
    }
}

fn default_catalog_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_uploads_url() -> String {
    DEFAULT_UPLOADS_URL.to_string()
}

fn default_min_request_interval_ms() -> u64 {
    250
}

impl CatalogConfig {
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoversConfig {
    #[serde(default)]
    pub default_quality: CoverQuality,

    #[serde(default = "default_placeholder_url")]
    pub placeholder_url: String,

    /// Unset keeps resolved covers for the whole session
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            default_quality: CoverQuality::default(),
            placeholder_url: default_placeholder_url(),
            ttl_secs: None,
        }
    }
}

fn default_placeholder_url() -> String {
    DEFAULT_PLACEHOLDER_URL.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub backward_entry: BackwardEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub guest: bool,
}

impl SessionConfig {
    pub fn context(&self) -> SessionContext {
        if self.guest {
            return SessionContext::guest();
        }
        match &self.session_id {
            Some(id) => SessionContext::authenticated(id.clone()),
            None => SessionContext::guest(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Explicit path first, then `MANGASHELF_CONFIG`, then the user config
    /// directory. `None` when nothing exists.
    pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let candidates = [
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            dirs::config_dir().map(|p| p.join("mangashelf").join("config.toml")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Load from the located file, or fall back to defaults
    pub fn resolve(explicit: Option<&Path>) -> AppResult<Self> {
        match Self::find_config_file(explicit) {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn cover_cache(&self) -> CoverCacheConfig {
        CoverCacheConfig {
            uploads_url: self.catalog.uploads_url.clone(),
            placeholder_url: self.covers.placeholder_url.clone(),
            default_quality: self.covers.default_quality,
            ttl: self.covers.ttl_secs.map(Duration::from_secs),
        }
    }

    pub fn generate_default() -> String {
        r#"# mangashelf configuration

[api]
base_url = "http://localhost:3000"
timeout_secs = 15
# token = "..."

[catalog]
api_url = "https://api.mangadex.org"
uploads_url = "https://uploads.mangadex.org"
min_request_interval_ms = 250

[covers]
# "256", "512" or "original"
default_quality = "256"
# ttl_secs = 3600

[reader]
# "first_page" or "last_page"
backward_entry = "first_page"

[session]
# session_id = "..."
guest = false
"#
        .to_string()
    }
}
