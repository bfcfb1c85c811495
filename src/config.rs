//! Room client configuration parsed from environment variables.

use std::time::Duration;

use crate::error::{Result, RoomError};

pub const DEFAULT_BASE_URL: &str = "https://room.meltos.net";

pub const BASE_URL_VAR: &str = "MELTOS_BASE_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "MELTOS_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "MELTOS_CONNECT_TIMEOUT_SECS";

/// Optional transport timeouts. `None` waits for the transport to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomTimeouts {
    pub request_secs: Option<u64>,
    pub connect_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// Origin of the room server, without a trailing slash.
    pub base_url: String,
    pub timeouts: RoomTimeouts,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RoomConfig {
    /// Config targeting `base_url` with no timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: normalize_base_url(&base_url.into()), timeouts: RoomTimeouts::default() }
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: RoomTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `MELTOS_BASE_URL`: default `https://room.meltos.net`
    /// - `MELTOS_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    /// - `MELTOS_CONNECT_TIMEOUT_SECS`: unset means no connect timeout
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ConfigParse`] if a timeout is not a whole number
    /// of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RoomConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::ConfigParse`] if a timeout is not a whole number
    /// of seconds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeouts = RoomTimeouts {
            request_secs: parse_secs(REQUEST_TIMEOUT_VAR, lookup(REQUEST_TIMEOUT_VAR).as_deref())?,
            connect_secs: parse_secs(CONNECT_TIMEOUT_VAR, lookup(CONNECT_TIMEOUT_VAR).as_deref())?,
        };
        Ok(Self::new(base_url).with_timeouts(timeouts))
    }

    /// Construct the shared HTTP client for this config.
    pub(crate) fn build_http(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.timeouts.connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| RoomError::HttpClientBuild(e.to_string()))
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_secs(key: &str, raw: Option<&str>) -> Result<Option<u64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|e| RoomError::ConfigParse(format!("{key}={value}: {e}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
