//! Process-wide logging bootstrap.
//!
//! Components emit through the `tracing` macros and never touch the
//! subscriber themselves; which backend receives those events is decided
//! once at startup. When tracing is enabled the full backend is installed
//! (env-filter driven, optionally JSON-formatted). When it is disabled a
//! minimal compact subscriber takes its place so warnings still reach
//! stderr.

use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

/// Disables the full tracing backend when set to a false-y value.
pub const TRACING_ENV: &str = "STEPRELAY_TRACING";
/// Selects JSON log output when set to `json`.
pub const LOG_FORMAT_ENV: &str = "STEPRELAY_LOG_FORMAT";
/// Filter directives for the full backend, `RUST_LOG` syntax.
pub const LOG_FILTER_ENV: &str = "STEPRELAY_LOG";

const DEFAULT_FILTER: &str = "info";
const FALLBACK_FILTER: &str = "warn";

static INIT: Once = Once::new();
static ENABLED: AtomicBool = AtomicBool::new(false);

/// Telemetry configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Install the full tracing backend.
    pub enabled: bool,
    /// Emit JSON-formatted records instead of plain text.
    pub json: bool,
    /// Filter directives; falls back to `info` when unset.
    pub filter: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            json: false,
            filter: None,
        }
    }
}

impl TelemetryConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        let enabled = std::env::var(TRACING_ENV)
            .map(|value| parse_flag(&value))
            .unwrap_or(true);
        let json = std::env::var(LOG_FORMAT_ENV)
            .map(|value| value.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let filter = std::env::var(LOG_FILTER_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            enabled,
            json,
            filter,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no" | "disabled"
    )
}

/// Initialize logging from the environment. See [`init`].
pub fn init_from_env() -> bool {
    init(&TelemetryConfig::from_env())
}

/// Install the process-wide subscriber.
///
/// Idempotent: the first call wins and later calls are no-ops. Returns
/// whether the full tracing backend is active after the call.
pub fn init(config: &TelemetryConfig) -> bool {
    INIT.call_once(|| {
        if config.enabled {
            let filter = match &config.filter {
                Some(directives) => EnvFilter::new(directives),
                None => EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| DEFAULT_FILTER.into()),
            };
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_level(true);
            let installed = if config.json {
                builder.json().try_init().is_ok()
            } else {
                builder.try_init().is_ok()
            };
            ENABLED.store(installed, Ordering::SeqCst);
            if installed {
                tracing::info!(json = config.json, "telemetry initialized");
            }
        } else {
            // Fallback keeps warnings visible without the full backend.
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(FALLBACK_FILTER))
                .with_target(false)
                .compact()
                .try_init();
            ENABLED.store(false, Ordering::SeqCst);
        }
    });

    is_enabled()
}

/// Whether the full tracing backend won at initialization.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::SeqCst)
}
