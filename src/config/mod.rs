//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `FACEFIND_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    CACHE_MAX_SIZE, DEFAULT_DISTANCE_THRESHOLD, DEFAULT_EMBEDDING_DIM, DEFAULT_MODEL_NAME,
    DEFAULT_SEARCH_CONCURRENCY, DEFAULT_SEARCH_TOP_K,
};
use crate::embedding::{DEFAULT_EMBEDDING_TIMEOUT, EmbedderConfig};
use crate::search::SearchOptions;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5001;

/// Default request body limit for image uploads (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FACEFIND_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `5001`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory of reference photos searched by `/api/search`.
    pub corpus_path: Option<PathBuf>,

    /// Embedding service endpoint. Unset runs the stub embedder.
    pub embedding_url: Option<String>,

    /// Model name sent to the embedding service. Default: `Facenet512`.
    pub model_name: String,

    /// Model baseline cosine distance threshold. Default: `0.30`.
    pub distance_threshold: f64,

    /// Embedding length the remote model must return. Default: `512`.
    pub embedding_dim: usize,

    /// Capacity of each comparison cache. Default: `100`.
    pub cache_capacity: usize,

    /// Matches returned by a search when the request does not say. Default: `3`.
    pub search_top_k: usize,

    /// Corpus records prepared concurrently per search. Default: `4`.
    pub search_concurrency: usize,

    /// Maximum request body size in bytes. Default: 16 MiB.
    pub max_upload_bytes: usize,

    /// Per-request timeout for the embedding service. Default: 30 s.
    pub embedding_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            corpus_path: None,
            embedding_url: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            cache_capacity: CACHE_MAX_SIZE,
            search_top_k: DEFAULT_SEARCH_TOP_K,
            search_concurrency: DEFAULT_SEARCH_CONCURRENCY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "FACEFIND_PORT";
    const ENV_BIND_ADDR: &'static str = "FACEFIND_BIND_ADDR";
    const ENV_CORPUS_PATH: &'static str = "FACEFIND_CORPUS_PATH";
    const ENV_EMBEDDING_URL: &'static str = "FACEFIND_EMBEDDING_URL";
    const ENV_MODEL_NAME: &'static str = "FACEFIND_MODEL_NAME";
    const ENV_DISTANCE_THRESHOLD: &'static str = "FACEFIND_DISTANCE_THRESHOLD";
    const ENV_EMBEDDING_DIM: &'static str = "FACEFIND_EMBEDDING_DIM";
    const ENV_CACHE_CAPACITY: &'static str = "FACEFIND_CACHE_CAPACITY";
    const ENV_SEARCH_TOP_K: &'static str = "FACEFIND_SEARCH_TOP_K";
    const ENV_SEARCH_CONCURRENCY: &'static str = "FACEFIND_SEARCH_CONCURRENCY";
    const ENV_MAX_UPLOAD_BYTES: &'static str = "FACEFIND_MAX_UPLOAD_BYTES";
    const ENV_EMBEDDING_TIMEOUT_SECS: &'static str = "FACEFIND_EMBEDDING_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let corpus_path = Self::parse_optional_string_from_env(Self::ENV_CORPUS_PATH)
            .map(PathBuf::from);
        let embedding_url = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL);
        let model_name = Self::parse_optional_string_from_env(Self::ENV_MODEL_NAME)
            .unwrap_or(defaults.model_name);
        let distance_threshold =
            Self::parse_from_env(Self::ENV_DISTANCE_THRESHOLD, defaults.distance_threshold)?;
        let embedding_dim = Self::parse_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let cache_capacity =
            Self::parse_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?;
        let search_top_k = Self::parse_from_env(Self::ENV_SEARCH_TOP_K, defaults.search_top_k)?;
        let search_concurrency =
            Self::parse_from_env(Self::ENV_SEARCH_CONCURRENCY, defaults.search_concurrency)?;
        let max_upload_bytes =
            Self::parse_from_env(Self::ENV_MAX_UPLOAD_BYTES, defaults.max_upload_bytes)?;
        let embedding_timeout = Duration::from_secs(Self::parse_from_env(
            Self::ENV_EMBEDDING_TIMEOUT_SECS,
            defaults.embedding_timeout.as_secs(),
        )?);

        Ok(Self {
            port,
            bind_addr,
            corpus_path,
            embedding_url,
            model_name,
            distance_threshold,
            embedding_dim,
            cache_capacity,
            search_top_k,
            search_concurrency,
            max_upload_bytes,
            embedding_timeout,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.corpus_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if !(self.distance_threshold > 0.0 && self.distance_threshold <= 1.0) {
            return Err(Self::invalid(
                Self::ENV_DISTANCE_THRESHOLD,
                self.distance_threshold,
                "must be in (0, 1]",
            ));
        }

        for (name, value) in [
            (Self::ENV_EMBEDDING_DIM, self.embedding_dim),
            (Self::ENV_SEARCH_TOP_K, self.search_top_k),
            (Self::ENV_SEARCH_CONCURRENCY, self.search_concurrency),
            (Self::ENV_MAX_UPLOAD_BYTES, self.max_upload_bytes),
        ] {
            if value == 0 {
                return Err(Self::invalid(name, value, "must be positive"));
            }
        }

        if self.embedding_timeout.is_zero() {
            return Err(Self::invalid(
                Self::ENV_EMBEDDING_TIMEOUT_SECS,
                0,
                "must be positive",
            ));
        }

        if let Some(ref url) = self.embedding_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(Self::invalid(
                Self::ENV_EMBEDDING_URL,
                url,
                "must be an http(s) URL",
            ));
        }

        Ok(())
    }

    /// Address to bind; IPv6 binds render as `[addr]:port`.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Embedder settings: remote when an endpoint is configured, stub otherwise.
    pub fn embedder_config(&self) -> EmbedderConfig {
        let base = match self.embedding_url {
            Some(ref url) => EmbedderConfig::remote(url.clone()),
            None => EmbedderConfig::stub(),
        };
        base.model_name(self.model_name.clone())
            .distance_threshold(self.distance_threshold)
            .embedding_dim(self.embedding_dim)
            .timeout(self.embedding_timeout)
    }

    /// Search defaults applied when a request does not override them.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::default()
            .top_k(self.search_top_k)
            .concurrency(self.search_concurrency)
    }

    fn invalid(name: &'static str, value: impl ToString, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse()
                .map_err(|e: T::Err| Self::invalid(var_name, &value, &e.to_string())),
            None => Ok(default),
        }
    }
}
