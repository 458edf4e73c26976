use crate::warn;
use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};
use strum_macros::Display;

pub const USERNAME_VAR: &str = "SPACETRACK_USERNAME";
pub const PASSWORD_VAR: &str = "SPACETRACK_PASSWORD";
pub const REGISTRY_URL_VAR: &str = "SPACETRACK_BASE_URL";
pub const API_ADDR_VAR: &str = "DEBRIS_API_ADDR";
pub const CACHE_PATH_VAR: &str = "DEBRIS_CACHE_PATH";
pub const REFRESH_HOURS_VAR: &str = "DEBRIS_REFRESH_HOURS";
pub const HTTP_TIMEOUT_VAR: &str = "DEBRIS_HTTP_TIMEOUT_SECS";

const DEFAULT_REGISTRY_URL: &str = "https://www.space-track.org";
const DEFAULT_CACHE_PATH: &str = "cache/debris_data.json";
const DEFAULT_REFRESH_HOURS: u64 = 4;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingCredential(&'static str),
    InvalidValue(&'static str),
}

impl std::error::Error for ConfigError {}

/// Registry account used by the refresh job.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// Reads both credentials through `lookup`. Blank values count as missing.
    ///
    /// # Errors
    /// [`ConfigError::MissingCredential`] naming the first absent variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String> {
        let required = |key: &'static str| {
            lookup(key).filter(|v| !v.trim().is_empty()).ok_or(ConfigError::MissingCredential(key))
        };
        Ok(Self { username: required(USERNAME_VAR)?, password: required(PASSWORD_VAR)? })
    }

    /// # Errors
    /// See [`Credentials::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn username(&self) -> &str { &self.username }
    pub fn password(&self) -> &str { &self.password }
}

/// Everything except the credentials. Every value has a default, so this never fails.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    api_addr: SocketAddr,
    cache_path: PathBuf,
    registry_url: String,
    refresh_interval: Duration,
    http_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let refresh_hours = parse_or_default(&lookup, REFRESH_HOURS_VAR, DEFAULT_REFRESH_HOURS, |h| *h > 0);
        let timeout_secs =
            parse_or_default(&lookup, HTTP_TIMEOUT_VAR, DEFAULT_HTTP_TIMEOUT_SECS, |s| *s > 0);
        let default_addr = SocketAddr::from(([127, 0, 0, 1], 8000));
        Self {
            api_addr: parse_or_default(&lookup, API_ADDR_VAR, default_addr, |_| true),
            cache_path: lookup(CACHE_PATH_VAR)
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH), PathBuf::from),
            registry_url: lookup(REGISTRY_URL_VAR)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
            refresh_interval: Duration::from_secs(refresh_hours * 3600),
            http_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_env() -> Self { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn api_addr(&self) -> SocketAddr { self.api_addr }
    pub fn cache_path(&self) -> &std::path::Path { &self.cache_path }
    pub fn registry_url(&self) -> &str { &self.registry_url }
    pub fn refresh_interval(&self) -> Duration { self.refresh_interval }
    pub fn http_timeout(&self) -> Duration { self.http_timeout }

    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self { Self::from_lookup(|_| None) }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue(key))
}

fn parse_or_default<T, F, V>(lookup: &F, key: &'static str, default: T, valid: V) -> T
where
    T: FromStr + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let Some(raw) = lookup(key) else { return default };
    match parse_value::<T>(key, &raw) {
        Ok(value) if valid(&value) => value,
        Ok(_) | Err(_) => {
            warn!("{}: {raw:?} for {key} is not usable, falling back to {default:?}.", ConfigError::InvalidValue(key));
            default
        }
    }
}
