use std::env;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

/// Public Mailgun API endpoint, used when neither `url` nor `host` is set.
pub const DEFAULT_URL: &str = "https://api.mailgun.net";
pub const DEFAULT_PROTOCOL: &str = "https:";

/// API credentials. Accepts both `api_key` and `apiKey` spellings.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(alias = "apiKey")]
    pub api_key: String,
    pub domain: String,
}

/// Connection settings for the Mailgun transport
#[derive(Debug, Clone, Deserialize)]
pub struct TransportOptions {
    pub url: Option<String>,
    pub host: Option<String>,
    pub protocol: Option<String>,
    pub port: Option<u16>,
    pub auth: Credentials,
    /// Request timeout in milliseconds
    pub timeout: Option<u64>,
}

impl TransportOptions {
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            url: None,
            host: None,
            protocol: None,
            port: None,
            auth: Credentials {
                api_key: api_key.into(),
                domain: domain.into(),
            },
            timeout: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_timeout(mut self, millis: u64) -> Self {
        self.timeout = Some(millis);
        self
    }

    /// Load options from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build options from an arbitrary `MAILGUN_*` key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            url: lookup("MAILGUN_URL"),
            host: lookup("MAILGUN_HOST"),
            protocol: lookup("MAILGUN_PROTOCOL"),
            port: lookup("MAILGUN_PORT")
                .map(|port| port.parse())
                .transpose()
                .map_err(|_| ConfigError::InvalidPort)?,
            auth: Credentials {
                api_key: lookup("MAILGUN_API_KEY").ok_or(ConfigError::MissingApiKey)?,
                domain: lookup("MAILGUN_DOMAIN").ok_or(ConfigError::MissingDomain)?,
            },
            timeout: lookup("MAILGUN_TIMEOUT")
                .map(|timeout| timeout.parse())
                .transpose()
                .map_err(|_| ConfigError::InvalidTimeout)?,
        })
    }

    /// Resolve the API base URL.
    ///
    /// An explicit `url` wins. Otherwise a `host` is combined with `protocol`
    /// and `port`; with neither, the public endpoint is used.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        if let Some(url) = &self.url {
            return Url::parse(url).map_err(|e| ConfigError::InvalidUrl(e.to_string()));
        }

        let Some(host) = &self.host else {
            return Url::parse(DEFAULT_URL).map_err(|e| ConfigError::InvalidUrl(e.to_string()));
        };

        let protocol = self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL);
        let scheme = protocol.trim_end_matches(':');
        if scheme != "https" && scheme != "http" {
            return Err(ConfigError::UnsupportedProtocol(protocol.to_string()));
        }

        let mut url = Url::parse(&format!("{}://{}", scheme, host))
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        // Url drops the port again when it is the scheme's default
        if let Some(port) = self.port {
            url.set_port(Some(port))
                .map_err(|_| ConfigError::InvalidUrl(format!("cannot set port on {}", host)))?;
        }

        Ok(url)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MAILGUN_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("MAILGUN_DOMAIN environment variable is required")]
    MissingDomain,
    #[error("Invalid port")]
    InvalidPort,
    #[error("Invalid timeout")]
    InvalidTimeout,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),
}
