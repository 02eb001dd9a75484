//! Application state

use rolegate_auth::{Authenticator, RememberMeService};
use rolegate_core::RuleSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Prometheus render handle
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// HTTP-level security settings
#[derive(Debug, Clone)]
pub struct WebSettings {
    /// Login form field that requests a remember-me token
    pub remember_me_parameter: String,
    pub remember_me_cookie: String,
    pub remember_me_secure: bool,
    pub session_cookie: String,
    pub session_secure: bool,
    pub session_inactivity_minutes: i64,
    pub csrf_enabled: bool,
    /// Root of `/js` and `/images`; not served when unset
    pub static_dir: Option<PathBuf>,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            remember_me_parameter: "remember-me".to_string(),
            remember_me_cookie: "remember_me".to_string(),
            remember_me_secure: true,
            session_cookie: "rolegate.sid".to_string(),
            session_secure: true,
            session_inactivity_minutes: 30,
            csrf_enabled: true,
            static_dir: None,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub rules: Arc<RuleSet>,
    pub remember_me: Arc<RememberMeService>,
    pub settings: Arc<WebSettings>,
    pub metrics: Option<Arc<MetricsHandle>>,
}

impl AppState {
    pub fn new(
        authenticator: Arc<Authenticator>,
        rules: Arc<RuleSet>,
        remember_me: Arc<RememberMeService>,
        settings: WebSettings,
    ) -> Self {
        Self {
            authenticator,
            rules,
            remember_me,
            settings: Arc::new(settings),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: MetricsHandle) -> Self {
        self.metrics = Some(Arc::new(handle));
        self
    }
}
