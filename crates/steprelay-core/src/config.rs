//! Relay configuration.

use serde::{Deserialize, Serialize};

/// Base URL of the collector receiving mirrored steps.
pub const SERVER_URL_ENV: &str = "STEPRELAY_SERVER_URL";

/// Configuration for step mirroring.
///
/// An unset or empty server URL disables mirroring entirely; wrapped
/// streams then pass through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    pub server_url: Option<String>,
}

impl RelayConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        let server_url = std::env::var(SERVER_URL_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self { server_url }
    }

    pub fn with_server_url(url: impl Into<String>) -> Self {
        Self {
            server_url: Some(url.into()),
        }
    }

    /// Sink base URL, when mirroring is enabled.
    ///
    /// Trailing slashes are trimmed so endpoint paths can be appended
    /// verbatim.
    pub fn sink_base(&self) -> Option<&str> {
        self.server_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_url_disables_mirroring() {
        let config = RelayConfig::default();
        assert!(config.sink_base().is_none());
    }

    #[test]
    fn empty_url_disables_mirroring() {
        let config = RelayConfig {
            server_url: Some("  ".to_string()),
        };
        assert!(config.sink_base().is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = RelayConfig::with_server_url("http://localhost:8000/");
        assert_eq!(config.sink_base(), Some("http://localhost:8000"));
    }
}
