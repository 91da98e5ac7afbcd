use std::time::Duration;

use pulse_core::error::{PulseError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub demo: DemoSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            app: AppSection::default(),
            demo: DemoSection::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PulseError::Configuration(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.app.validate()?;
        self.demo.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Grace period for in-flight requests after SIGINT/SIGTERM.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(PulseError::Configuration("server.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(PulseError::Configuration("server.port must not be 0".into()));
        }
        if !(1..=300_000).contains(&self.shutdown_timeout_ms) {
            return Err(PulseError::Configuration(
                "server.shutdown_timeout_ms must be between 1 and 300000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// Reported by `/version`.
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: default_app_version(),
        }
    }
}

impl AppSection {
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(PulseError::Configuration("app.version must not be empty".into()));
        }
        Ok(())
    }
}

/// Knobs for the synthetic traffic endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoSection {
    #[serde(default = "default_slow_delay_ms")]
    pub slow_delay_ms: u64,

    /// Chance that `/api/error` answers 500.
    #[serde(default = "default_error_probability")]
    pub error_probability: f64,
}

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            slow_delay_ms: default_slow_delay_ms(),
            error_probability: default_error_probability(),
        }
    }
}

impl DemoSection {
    pub fn validate(&self) -> Result<()> {
        if self.slow_delay_ms > 60_000 {
            return Err(PulseError::Configuration(
                "demo.slow_delay_ms must be at most 60000".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(PulseError::Configuration(
                "demo.error_probability must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }

    pub fn slow_delay(&self) -> Duration {
        Duration::from_millis(self.slow_delay_ms)
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_shutdown_timeout_ms() -> u64 {
    30_000
}
fn default_app_version() -> String {
    "v1.0.0".into()
}
fn default_slow_delay_ms() -> u64 {
    2_000
}
fn default_error_probability() -> f64 {
    0.5
}
