//! Environment-based configuration types for ccgate server runtime settings.

use anyhow::Result;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::oauth::auth_server::ClientInfoHandler;

/// HTTP server port configuration
#[derive(Clone)]
pub struct HttpPort(u16);

/// Lifetime of access tokens issued by the token endpoint
#[derive(Clone, Debug)]
pub struct AccessTokenExpiration(chrono::Duration);

/// Period of the expired access token sweep
#[derive(Clone, Debug)]
pub struct TokenCleanupInterval(Duration);

/// Whether token requests may be made with GET
#[derive(Clone)]
pub struct AllowGetAccessRequest(bool);

/// Upper bound on registered clients, unbounded when unset
#[derive(Clone, Default)]
pub struct MaxClients(Option<usize>);

/// Main application configuration
#[derive(Clone)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub access_token_expiration: AccessTokenExpiration,
    pub token_cleanup_interval: TokenCleanupInterval,
    pub client_default_domain: String,
    pub allow_get_access_request: AllowGetAccessRequest,
    pub client_info_handler: ClientInfoHandler,
    pub max_clients: MaxClients,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let http_port: HttpPort = default_env("HTTP_PORT", "8080").try_into()?;
        let access_token_expiration: AccessTokenExpiration =
            default_env("ACCESS_TOKEN_EXPIRATION", "2h").try_into()?;
        let token_cleanup_interval: TokenCleanupInterval =
            default_env("TOKEN_CLEANUP_INTERVAL", "5m").try_into()?;
        let client_default_domain = default_env("CLIENT_DEFAULT_DOMAIN", "http://localhost:8084");
        let allow_get_access_request: AllowGetAccessRequest =
            default_env("ALLOW_GET_ACCESS_REQUEST", "true").try_into()?;
        let client_info_handler: ClientInfoHandler =
            default_env("CLIENT_INFO_HANDLER", "form").try_into()?;
        let max_clients: MaxClients = optional_env("MAX_CLIENTS").try_into()?;

        Ok(Self {
            version: version()?,
            http_port,
            access_token_expiration,
            token_cleanup_interval,
            client_default_domain,
            allow_get_access_request,
            client_info_handler,
            max_clients,
        })
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

fn parse_duration(value: String) -> Result<Duration, ConfigError> {
    duration_str::parse(&value).map_err(|e| ConfigError::DurationParsingFailed(value, e.to_string()))
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(8080))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<String> for AccessTokenExpiration {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let duration = parse_duration(value)?;
        Ok(Self(chrono::Duration::from_std(duration)?))
    }
}

impl AsRef<chrono::Duration> for AccessTokenExpiration {
    fn as_ref(&self) -> &chrono::Duration {
        &self.0
    }
}

impl TryFrom<String> for TokenCleanupInterval {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let interval = parse_duration(value.clone())?;
        if interval.is_zero() {
            return Err(ConfigError::ZeroDuration(value).into());
        }
        Ok(Self(interval))
    }
}

impl AsRef<Duration> for TokenCleanupInterval {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

impl TryFrom<String> for AllowGetAccessRequest {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Self(true)),
            "false" | "0" | "no" | "off" => Ok(Self(false)),
            _ => Err(ConfigError::BoolParsingFailed(value).into()),
        }
    }
}

impl AsRef<bool> for AllowGetAccessRequest {
    fn as_ref(&self) -> &bool {
        &self.0
    }
}

impl TryFrom<String> for ClientInfoHandler {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "form" => Ok(ClientInfoHandler::Form),
            "basic" => Ok(ClientInfoHandler::Basic),
            _ => Err(ConfigError::UnknownClientInfoHandler(value).into()),
        }
    }
}

impl TryFrom<Option<String>> for MaxClients {
    type Error = anyhow::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value {
            None => Ok(Self(None)),
            Some(v) if v.trim().is_empty() => Ok(Self(None)),
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map(|max| Self(Some(max)))
                .map_err(|err| ConfigError::CapacityParsingFailed(err).into()),
        }
    }
}

impl TryFrom<String> for MaxClients {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(Some(value))
    }
}

impl AsRef<Option<usize>> for MaxClients {
    fn as_ref(&self) -> &Option<usize> {
        &self.0
    }
}
