use std::{
    io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use axum::http::HeaderValue;
use serde::Deserialize;
use thiserror::Error;

use libs::util;

const APP_DIR: &str = "photo_gallery";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration from env: {0}")]
    Env(#[from] envy::Error),
    #[error("cannot resolve base directory: {0}")]
    BaseDir(#[source] io::Error),
    #[error("cannot create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("media url must name a prefix below `/`, got {0:?}")]
    MediaUrl(String),
    #[error("invalid allowed origin {0:?}")]
    Origin(String),
    #[error("invalid listen address {0:?}")]
    Address(String),
}

/// Runtime settings. Built once at startup and handed to [`crate::AppState`].
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_ipv4_address")]
    pub gallery_ipv4_address: String,
    #[serde(default = "default_gallery_port")]
    pub gallery_port: u16,
    #[serde(default)]
    pub gallery_base_dir: Option<PathBuf>,
    #[serde(default = "default_db_file")]
    pub gallery_db_file: PathBuf,
    #[serde(default = "default_media_root")]
    pub gallery_media_root: PathBuf,
    #[serde(default = "default_media_url")]
    pub gallery_media_url: String,
    #[serde(default = "default_allowed_origins")]
    pub gallery_allowed_origins: Vec<String>,
    #[serde(default)]
    pub gallery_debug: bool,
    #[serde(default = "default_ipv4_address")]
    pub prometheus_ipv4_address: String,
    #[serde(default = "default_prometheus_port")]
    pub prometheus_port: u16,
    #[serde(default = "default_refresh_interval")]
    pub prometheus_refresh_interval: u64,
}

fn default_ipv4_address() -> String {
    "127.0.0.1".to_string()
}

fn default_gallery_port() -> u16 {
    8000
}

fn default_db_file() -> PathBuf {
    PathBuf::from("db.sqlite3")
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_media_url() -> String {
    "/media/".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_prometheus_port() -> u16 {
    9000
}

fn default_refresh_interval() -> u64 {
    15
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        envy::from_env::<Config>()?.resolve()
    }

    /// Same as [`Config::from_env`] but reads `(NAME, value)` pairs instead of the process env.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars.into_iter().map(|(k, v)| (k.into(), v.into()));
        envy::from_iter::<_, Config>(vars)?.resolve()
    }

    fn resolve(mut self) -> Result<Self, ConfigError> {
        let base_dir = match &self.gallery_base_dir {
            Some(dir) => dir.clone(),
            None => util::get_config_dir(APP_DIR).map_err(ConfigError::BaseDir)?,
        };

        self.gallery_db_file = base_dir.join(&self.gallery_db_file);
        self.gallery_media_root = base_dir.join(&self.gallery_media_root);
        self.gallery_media_url = normalize_media_url(&self.gallery_media_url)?;
        self.gallery_allowed_origins = self
            .gallery_allowed_origins
            .iter()
            .map(|o| normalize_origin(o))
            .filter(|o| !o.is_empty())
            .collect();

        create_dir(&self.gallery_media_root)?;
        if let Some(parent) = self.gallery_db_file.parent() {
            create_dir(parent)?;
        }

        // full paths from here on
        self.gallery_base_dir = Some(base_dir);
        Ok(self)
    }

    pub fn api_addr(&self) -> Result<SocketAddr, ConfigError> {
        socket_addr(&self.gallery_ipv4_address, self.gallery_port)
    }

    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        socket_addr(&self.prometheus_ipv4_address, self.prometheus_port)
    }

    pub fn allowed_origin_headers(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.gallery_allowed_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::Origin(o.clone())))
            .collect()
    }

    /// Filter used when `LOG_LEVEL` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.gallery_debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn socket_addr(ip: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    format!("{ip}:{port}")
        .parse()
        .map_err(|_| ConfigError::Address(format!("{ip}:{port}")))
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Browsers send origins with a lowercase scheme and host and no trailing slash.
fn normalize_origin(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_ascii_lowercase()
}

fn normalize_media_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MediaUrl(raw.to_string()));
    }
    Ok(format!("/{trimmed}"))
}
