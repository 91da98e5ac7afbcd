//! Service config loader (strict parsing).
//!
//! Precedence, lowest first: built-in defaults, the YAML file named by
//! `PULSE_CONFIG`, then the `PORT` and `VERSION` environment variables.

pub mod schema;

use std::fs;

use pulse_core::error::{PulseError, Result};

pub use schema::{AppConfig, AppSection, DemoSection, ServerSection};

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "PULSE_CONFIG";
pub const PORT_ENV: &str = "PORT";
pub const VERSION_ENV: &str = "VERSION";

/// Load from the process environment.
pub fn load() -> Result<AppConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using `lookup` in place of the process environment.
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let mut cfg = match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        Some(path) => {
            tracing::info!(%path, "loading config file");
            parse_str(&read(&path)?)?
        }
        None => AppConfig::default(),
    };
    apply_env(&mut cfg, &lookup)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<AppConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn read(path: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| PulseError::Configuration(format!("read config {path} failed: {e}")))
}

fn parse_str(s: &str) -> Result<AppConfig> {
    serde_yaml::from_str(s).map_err(|e| PulseError::Configuration(format!("invalid yaml: {e}")))
}

/// Empty values are treated as unset.
fn apply_env(cfg: &mut AppConfig, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(port) = lookup(PORT_ENV).filter(|v| !v.is_empty()) {
        cfg.server.port = port.trim().parse().map_err(|_| {
            PulseError::Configuration(format!("{PORT_ENV} must be a port number, got {port:?}"))
        })?;
    }
    if let Some(version) = lookup(VERSION_ENV).filter(|v| !v.is_empty()) {
        cfg.app.version = version;
    }
    Ok(())
}
