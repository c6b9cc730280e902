// Logging setup
//
// Console logging through tracing-subscriber, filtered by RUST_LOG
// (or LOG_LEVEL) with a per-crate default.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when neither RUST_LOG nor LOG_LEVEL is set
pub const DEFAULT_LOG_FILTER: &str = "eventdesk_control_plane=debug,eventdesk_core=info,tower_http=debug";

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name, attached to the startup log line
    pub service_name: String,
    /// Log filter (e.g., "info", "eventdesk_core=debug")
    pub log_filter: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "eventdesk-control-plane".to_string(),
            log_filter: None,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: "eventdesk-control-plane")
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "eventdesk-control-plane".to_string()),
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok())
                .filter(|f| !f.is_empty()),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

/// Install the global subscriber. Call once, at the top of `main`.
pub fn init_telemetry(config: &TelemetryConfig) {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(config.env_filter());

    tracing_subscriber::registry().with(console_layer).init();

    tracing::debug!(
        service = %config.service_name,
        filter = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER),
        "Logging initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_falls_back_to_default() {
        let config = TelemetryConfig {
            log_filter: Some("eventdesk=loud".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.env_filter().to_string(),
            EnvFilter::new(DEFAULT_LOG_FILTER).to_string()
        );
    }

    #[test]
    fn test_custom_filter() {
        let config = TelemetryConfig {
            log_filter: Some("warn".to_string()),
            ..Default::default()
        };
        assert_eq!(config.env_filter().to_string(), "warn");
    }
}
