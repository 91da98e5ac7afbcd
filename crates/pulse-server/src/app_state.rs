//! Shared application state.
//!
//! Owns the metric registry (created once per process), the HTTP metric
//! handles and the dispatcher. Startup errors are explicit (`Result`).

use std::sync::Arc;

use chrono::Utc;
use pulse_core::error::Result;
use pulse_core::metrics::Registry;

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::obs::metrics::HttpMetrics;
use crate::services;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AppConfig,
    registry: Registry,
    metrics: HttpMetrics,
    dispatcher: Dispatcher,
}

impl AppState {
    /// State with the built-in routes.
    pub fn new(cfg: AppConfig) -> Result<Self> {
        let dispatcher = services::builtin_dispatcher(&cfg, Utc::now());
        Self::with_dispatcher(cfg, dispatcher)
    }

    /// State with a caller-supplied dispatcher.
    pub fn with_dispatcher(cfg: AppConfig, dispatcher: Dispatcher) -> Result<Self> {
        let registry = Registry::new();
        let metrics = HttpMetrics::register(&registry)?;

        tracing::info!(
            routes = ?dispatcher.registered_paths(),
            metrics = registry.len(),
            "app state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                metrics,
                dispatcher,
            }),
        })
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn metrics(&self) -> &HttpMetrics {
        &self.inner.metrics
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}

