use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3030/api/v3";
pub const DEFAULT_FACILITY: &str = "ESS";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const FACILITY_ENV: &str = "FACILITY";
pub const TIMEOUT_ENV: &str = "SCIBRIDGE_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base url `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid timeout `{0}`")]
    Timeout(String),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for one deployment of the bridge, threaded explicitly into the fetcher and the
/// hydrator.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Root of the native store's REST API, e.g. `https://scicat.example.org/api/v3`.
    pub base_url: Url,
    /// Facility every native record implicitly belongs to.
    pub facility: String,
    pub request_timeout: Duration,
}

/** Raw TOML mapping; every key is optional. */
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RawConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    facility: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            facility: DEFAULT_FACILITY.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BridgeConfig {
    pub fn from_parts(
        base_url: &str,
        facility: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            facility: facility.into(),
            ..Self::default()
        })
    }

    /// Reads `BASE_URL`, `FACILITY` and `SCIBRIDGE_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV) {
            config.base_url = parse_base_url(&url)?;
        }
        if let Some(facility) = lookup(FACILITY_ENV) {
            config.facility = facility;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Timeout(raw.clone()))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    ///
    /// Example TOML:
    /// base_url = "https://scicat.example.org/api/v3"
    /// facility = "ESS"
    /// request_timeout_secs = 10
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(input)?;
        let mut config = Self::default();
        if let Some(url) = raw.base_url {
            config.base_url = parse_base_url(&url)?;
        }
        if let Some(facility) = raw.facility {
            config.facility = facility;
        }
        if let Some(secs) = raw.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.facility = facility.into();
        self
    }

    /// URL of a collection, e.g. `{base}/Datasets`.
    pub fn collection_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::BaseUrl {
        url: raw.to_string(),
        source,
    })
}
