use std::time::Duration;

use bon::Builder;
use url::Url;

use crate::{
    errors::ConfigurationError,
    khash::Khash,
    request::{DEFAULT_VERSION, Request},
};

pub const ENV_MERCHANT_ID: &str = "RIS_MERCHANT_ID";
pub const ENV_URL: &str = "RIS_URL";
pub const ENV_API_KEY: &str = "RIS_API_KEY";
pub const ENV_CERT_PATH: &str = "RIS_CERT_PATH";
pub const ENV_CERT_PASSWORD: &str = "RIS_CERT_PASSWORD";
pub const ENV_CONFIG_KEY: &str = "RIS_CONFIG_KEY";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "RIS_CONNECT_TIMEOUT_MS";
pub const ENV_STRICT_VALIDATION: &str = "RIS_STRICT_VALIDATION";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the client proves its identity to RIS. Exactly one is used.
#[derive(Clone, PartialEq, Eq)]
pub enum Authentication {
    /// Sent in the API key header.
    ApiKey(String),
    /// PKCS#12 archive holding the client certificate and key.
    Certificate { pkcs12: Vec<u8>, password: String },
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authentication::ApiKey(_) => write!(f, "ApiKey(<redacted>)"),
            Authentication::Certificate { pkcs12, .. } => {
                write!(f, "Certificate({} bytes)", pkcs12.len())
            }
        }
    }
}

/// Client configuration.
#[derive(Builder, Clone)]
pub struct ClientConfig {
    /// Six digit merchant id, sent in `MERC`.
    #[builder(into)]
    pub merchant_id: String,
    /// RIS endpoint.
    pub url: Url,
    pub authentication: Authentication,
    /// Salt for KHASH token digests.
    #[builder(into)]
    pub config_key: String,
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    pub connect_timeout: Duration,
    /// Refuse to send requests that fail validation.
    #[builder(default = true)]
    pub strict_validation: bool,
    #[builder(into, default = DEFAULT_VERSION.to_string())]
    pub version: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("merchant_id", &self.merchant_id)
            .field("url", &self.url.as_str())
            .field("authentication", &self.authentication)
            .field("config_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("strict_validation", &self.strict_validation)
            .field("version", &self.version)
            .finish()
    }
}

impl ClientConfig {
    /// A fresh request for this merchant, hashing tokens with the configured key.
    pub fn new_request(&self) -> Request<Khash> {
        let mut request = Request::with_khash(&self.merchant_id, &self.config_key);
        request.set_version(&self.version);
        request
    }

    /// Load from `RIS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve each `RIS_*` variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigurationError::Missing(key))
        };

        let merchant_id = require(ENV_MERCHANT_ID)?;
        let url = require(ENV_URL)?
            .parse::<Url>()
            .map_err(|err| ConfigurationError::Invalid {
                key: ENV_URL,
                reason: err.to_string(),
            })?;
        let config_key = require(ENV_CONFIG_KEY)?;

        let api_key = lookup(ENV_API_KEY).filter(|value| !value.is_empty());
        let cert_path = lookup(ENV_CERT_PATH).filter(|value| !value.is_empty());
        let authentication = match (api_key, cert_path) {
            (Some(_), Some(_)) => return Err(ConfigurationError::ConflictingAuthentication),
            (Some(key), None) => Authentication::ApiKey(key),
            (None, Some(path)) => {
                let pkcs12 =
                    std::fs::read(&path).map_err(|source| ConfigurationError::Unreadable {
                        path: path.clone(),
                        source,
                    })?;
                Authentication::Certificate {
                    pkcs12,
                    password: lookup(ENV_CERT_PASSWORD).unwrap_or_default(),
                }
            }
            (None, None) => return Err(ConfigurationError::Missing(ENV_API_KEY)),
        };

        let connect_timeout = match lookup(ENV_CONNECT_TIMEOUT_MS) {
            Some(ms) => Duration::from_millis(ms.trim().parse().map_err(
                |err: std::num::ParseIntError| ConfigurationError::Invalid {
                    key: ENV_CONNECT_TIMEOUT_MS,
                    reason: err.to_string(),
                },
            )?),
            None => DEFAULT_CONNECT_TIMEOUT,
        };

        let strict_validation = match lookup(ENV_STRICT_VALIDATION).as_deref().map(str::trim) {
            None => true,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigurationError::Invalid {
                    key: ENV_STRICT_VALIDATION,
                    reason: format!("expected true or false, got {}", other),
                });
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Loaded RIS configuration for merchant {}", merchant_id);

        Ok(ClientConfig {
            merchant_id,
            url,
            authentication,
            config_key,
            connect_timeout,
            strict_validation,
            version: DEFAULT_VERSION.to_string(),
        })
    }
}
