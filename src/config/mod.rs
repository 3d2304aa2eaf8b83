//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroUsize, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::cache::CacheConfig;

mod cli;

pub use cli::{SettingsArgs, SettingsOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "choplink";
const ENV_PREFIX: &str = "CHOPLINK";
pub const DEFAULT_BASE_URL: &str = "https://choplinks-bot.fly.dev";
pub const DEFAULT_AUTH_HEADER: &str = "abidoshaker";
pub const DEFAULT_AUTH_TOKEN: &str = "secret";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    /// Name of the shared-secret header sent with every request.
    pub auth_header: String,
    pub auth_token: String,
    pub timeout: Option<Duration>,
}

impl ApiSettings {
    /// Default credentials against an explicit backend.
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub stale_time: Duration,
    pub retry: u32,
    pub retry_delay: Duration,
    pub max_entries: NonZeroUsize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            stale_time: defaults.stale_time(),
            retry: defaults.retry,
            retry_delay: Duration::from_millis(defaults.retry_delay_ms),
            max_entries: defaults.max_entries_non_zero(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(args: &SettingsArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = args.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&args.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    cache: RawCacheSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    auth_header: Option<String>,
    auth_token: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    stale_seconds: Option<u64>,
    retry: Option<u32>,
    retry_delay_ms: Option<u64>,
    max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(url) = overrides.base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.api.timeout_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.cache_stale_seconds {
            self.cache.stale_seconds = Some(seconds);
        }
        if let Some(retry) = overrides.cache_retry {
            self.cache.retry = Some(retry);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            cache,
            logging,
        } = raw;

        let api = build_api_settings(api)?;
        let cache = build_cache_settings(cache)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self {
            api,
            cache,
            logging,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let raw_url = api
        .base_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("api.base_url", format!("failed to parse: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "api.base_url",
            format!("unsupported scheme `{}`", base_url.scheme()),
        ));
    }

    let auth_header = api
        .auth_header
        .unwrap_or_else(|| DEFAULT_AUTH_HEADER.to_string());
    HeaderName::from_bytes(auth_header.as_bytes())
        .map_err(|err| LoadError::invalid("api.auth_header", err.to_string()))?;

    let auth_token = api
        .auth_token
        .unwrap_or_else(|| DEFAULT_AUTH_TOKEN.to_string());
    HeaderValue::from_str(&auth_token)
        .map_err(|err| LoadError::invalid("api.auth_token", err.to_string()))?;

    let timeout = match api.timeout_seconds {
        Some(0) => {
            return Err(LoadError::invalid(
                "api.timeout_seconds",
                "must be greater than zero",
            ));
        }
        Some(seconds) => Some(Duration::from_secs(seconds)),
        None => None,
    };

    Ok(ApiSettings {
        base_url,
        auth_header,
        auth_token,
        timeout,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let defaults = CacheSettings::default();

    let stale_time = cache
        .stale_seconds
        .map(Duration::from_secs)
        .unwrap_or(defaults.stale_time);
    let retry = cache.retry.unwrap_or(defaults.retry);
    let retry_delay = cache
        .retry_delay_ms
        .map(Duration::from_millis)
        .unwrap_or(defaults.retry_delay);
    let max_entries = match cache.max_entries {
        Some(value) => NonZeroUsize::new(value).ok_or_else(|| {
            LoadError::invalid("cache.max_entries", "must be greater than zero")
        })?,
        None => defaults.max_entries,
    };

    Ok(CacheSettings {
        stale_time,
        retry,
        retry_delay,
        max_entries,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}
