//! Error types of the push pipeline.
//!
//! None of these cross the public `register`/`remove` boundary; they exist
//! so the internal steps can use `?` and so the outermost function can log
//! each failure at the right level.

use thiserror::Error;

/// Misconfiguration. Fatal for the pipeline, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("push provider signing key (VAPID) is not configured")]
    MissingSigningKey,
    #[error("service worker script URL is empty")]
    EmptyServiceWorkerUrl,
}

/// Why a device token could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("notification permission was not granted")]
    PermissionDenied,
    #[error("service workers are not supported in this runtime")]
    ServiceWorkerUnsupported,
    #[error("push provider error: {0}")]
    Provider(String),
    #[error("push provider signing key (VAPID) is not configured")]
    MissingSigningKey,
}

impl AcquireError {
    /// Configuration errors are bugs in the deployment, not user choices.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AcquireError::MissingSigningKey)
    }
}

impl From<ConfigError> for AcquireError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingSigningKey => AcquireError::MissingSigningKey,
            other => AcquireError::Provider(other.to_string()),
        }
    }
}

/// A registry call that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Non-2xx response; `message` is the registry's own explanation.
    #[error("{status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
}

/// Local key-value storage failure (quota, private mode, serialization).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// Failure reported by a platform adapter (permission API, service worker
/// container, push provider SDK).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

/// Why a notification could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no active service worker registration")]
    NoActiveWorker,
    #[error("notification permission not granted")]
    NotPermitted,
    #[error("render failed: {0}")]
    Failed(String),
}
