//! Service configuration.

use crate::url::UrlSettings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "THUMBS_CONFIG";

/// Configuration for the thumbs service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbsConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Directory holding source images.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
    /// Directory rendered images are written to.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,
    /// How long a successful render record is kept.
    #[serde(default = "default_render_ttl")]
    pub render_ttl_secs: u64,
    /// How long a missing-source record is kept.
    #[serde(default = "default_not_found_ttl")]
    pub not_found_ttl_secs: u64,
    /// Cache-Control max-age for served images.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
    /// Cache-Control max-age for not-found responses.
    #[serde(default = "default_not_found_max_age")]
    pub not_found_max_age_secs: u64,
    /// Base the render endpoint is mounted at.
    #[serde(default = "default_render_url_base")]
    pub render_url_base: String,
    /// Public URL prefix of the media root.
    #[serde(default = "default_media_url")]
    pub media_url: String,
    /// Emit placeholder URLs instead of render URLs.
    #[serde(default)]
    pub dummy: bool,
    /// Placeholder template with `{width}` and `{height}` markers.
    #[serde(default = "default_dummy_url")]
    pub dummy_url: String,
    /// Upper bound on renders running at once.
    #[serde(default = "default_max_concurrent_renders")]
    pub max_concurrent_renders: usize,
    /// Per-render time limit.
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
    /// Largest width or height a render request may ask for.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_source_root() -> PathBuf {
    PathBuf::from("/var/thumbs/source")
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("/var/thumbs/rendered")
}

fn default_render_ttl() -> u64 {
    86400 * 30
}

fn default_not_found_ttl() -> u64 {
    300
}

fn default_max_age() -> u64 {
    86400
}

fn default_not_found_max_age() -> u64 {
    60
}

fn default_render_url_base() -> String {
    "/".to_string()
}

fn default_media_url() -> String {
    "/media/".to_string()
}

fn default_dummy_url() -> String {
    "https://placekitten.com/{width}/{height}".to_string()
}

fn default_max_concurrent_renders() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_render_timeout() -> u64 {
    30
}

fn default_max_dimension() -> u32 {
    4096
}

impl Default for ThumbsConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            source_root: default_source_root(),
            storage_root: default_storage_root(),
            render_ttl_secs: default_render_ttl(),
            not_found_ttl_secs: default_not_found_ttl(),
            max_age_secs: default_max_age(),
            not_found_max_age_secs: default_not_found_max_age(),
            render_url_base: default_render_url_base(),
            media_url: default_media_url(),
            dummy: false,
            dummy_url: default_dummy_url(),
            max_concurrent_renders: default_max_concurrent_renders(),
            render_timeout_secs: default_render_timeout(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl ThumbsConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `explicit`, then `$THUMBS_CONFIG`, then the platform config
    /// directory. Missing files fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default configuration file location.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "thumbs", "thumbs")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_renders == 0 {
            return Err(Error::Config(
                "max_concurrent_renders must be at least 1".into(),
            ));
        }
        if self.render_timeout_secs == 0 {
            return Err(Error::Config("render_timeout_secs must be positive".into()));
        }
        if self.max_dimension == 0 {
            return Err(Error::Config("max_dimension must be positive".into()));
        }
        Ok(())
    }

    pub fn render_ttl(&self) -> Duration {
        Duration::from_secs(self.render_ttl_secs)
    }

    pub fn not_found_ttl(&self) -> Duration {
        Duration::from_secs(self.not_found_ttl_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn url_settings(&self) -> UrlSettings {
        UrlSettings {
            render_url_base: self.render_url_base.clone(),
            media_url: self.media_url.clone(),
            dummy: self.dummy,
            dummy_url: self.dummy_url.clone(),
        }
    }
}
