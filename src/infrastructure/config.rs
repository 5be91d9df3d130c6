use crate::application::dashboard_service::CoreSettings;
use crate::application::stream_client::ReconnectPolicy;
use crate::domain::error::ConfigurationError;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

pub const STREAM_SCHEMES: &[&str] = &["ws", "wss"];
pub const AUDIT_SCHEMES: &[&str] = &["http", "https"];

const DEFAULT_STREAM_ENDPOINT: &str = "ws://localhost:8000/ws/live-data";
const DEFAULT_AUDIT_ENDPOINT: &str = "http://localhost:8000/api/energy-audit";
const ENV_PREFIX: &str = "GRID_DASHBOARD";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub stream: StreamSettings,
    pub audit: AuditSettings,
    pub window: WindowSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamSettings {
    pub endpoint: String,
    pub reconnect: ReconnectSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconnectSettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditSettings {
    pub endpoint: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowSettings {
    pub capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen: String,
}

/// Defaults, then `config/dashboard.*` if present, then `GRID_DASHBOARD__*`
/// environment variables.
pub fn load_settings() -> Result<Settings, ConfigurationError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
    settings_from(builder)
}

fn settings_from(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigurationError> {
    let settings: Settings = with_defaults(builder)
        .and_then(|b| b.build())
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ConfigurationError::Source(e.to_string()))?;

    settings.validate()?;
    Ok(settings)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("stream.endpoint", DEFAULT_STREAM_ENDPOINT)?
        .set_default("stream.reconnect.initial_delay_ms", 1000_i64)?
        .set_default("stream.reconnect.max_delay_ms", 30_000_i64)?
        .set_default("stream.reconnect.multiplier", 2.0_f64)?
        .set_default("audit.endpoint", DEFAULT_AUDIT_ENDPOINT)?
        .set_default("audit.interval_secs", 60_i64)?
        .set_default("audit.timeout_secs", 10_i64)?
        .set_default("window.capacity", 21_i64)?
        .set_default("server.listen", "0.0.0.0:8080")
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_endpoint(&self.stream.endpoint, STREAM_SCHEMES)?;
        validate_endpoint(&self.audit.endpoint, AUDIT_SCHEMES)?;
        if self.audit.interval_secs == 0 {
            return Err(ConfigurationError::ZeroInterval);
        }
        self.listen_addr()?;
        self.core_settings().validate()
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            window_capacity: self.window.capacity,
            reconnect: ReconnectPolicy {
                initial_delay: Duration::from_millis(self.stream.reconnect.initial_delay_ms),
                max_delay: Duration::from_millis(self.stream.reconnect.max_delay_ms),
                multiplier: self.stream.reconnect.multiplier,
            },
            fetch_timeout: Duration::from_secs(self.audit.timeout_secs),
            ..CoreSettings::default()
        }
    }

    pub fn audit_interval(&self) -> Duration {
        Duration::from_secs(self.audit.interval_secs)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigurationError> {
        self.server
            .listen
            .parse()
            .map_err(|_| ConfigurationError::ListenAddress(self.server.listen.clone()))
    }
}

/// Check that `endpoint` is an absolute URL with a host and one of `schemes`.
pub fn validate_endpoint(endpoint: &str, schemes: &[&str]) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = reqwest::Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(format!(
            "scheme `{}` is not one of {:?}",
            url.scheme(),
            schemes
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
