//! Pipeline configuration.

use herald_common::Platform;

use crate::error::ConfigError;

pub const DEFAULT_SERVICE_WORKER_URL: &str = "/firebase-messaging-sw.js";
pub const DEFAULT_ICON: &str = "/icons/icon-192.png";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 10_000;

/// Static configuration of the push pipeline. Supplied out-of-band
/// (build-time environment in the browser build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushConfig {
    /// Platform this runtime registers tokens for.
    pub platform: Platform,
    /// Provider signing key (VAPID public key). Required.
    pub vapid_key: Option<String>,
    /// Script URL of the service worker that receives background pushes.
    pub service_worker_url: String,
    /// Icon used when a message does not carry one.
    pub default_icon: Option<String>,
    /// Upper bound on a single registry request.
    pub request_timeout_ms: u32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Web,
            vapid_key: None,
            service_worker_url: DEFAULT_SERVICE_WORKER_URL.into(),
            default_icon: Some(DEFAULT_ICON.into()),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl PushConfig {
    pub fn with_vapid_key(mut self, key: impl Into<String>) -> Self {
        self.vapid_key = Some(key.into());
        self
    }

    /// The signing key, or [`ConfigError::MissingSigningKey`] when absent or blank.
    pub fn signing_key(&self) -> Result<&str, ConfigError> {
        self.vapid_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingSigningKey)
    }

    /// Startup check. Call once when wiring the pipeline so a missing key
    /// shows up before the first login rather than on it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signing_key()?;
        if self.service_worker_url.trim().is_empty() {
            return Err(ConfigError::EmptyServiceWorkerUrl);
        }
        Ok(())
    }
}
