//! Capability acquisition: permission, service worker, provider token.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herald_common::Platform;

use crate::config::PushConfig;
use crate::error::AcquireError;
use crate::ports::{Clock, Permission, PushPlatform};

/// A provider-issued device token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistration {
    pub token: String,
    pub platform: Platform,
    pub acquired_at: DateTime<Utc>,
}

/// Obtains a device token from the push provider.
///
/// Holds no state of its own: every call walks the full sequence, and the
/// caller decides whether to retry or cache.
pub struct CapabilityAcquirer<P: PushPlatform> {
    platform: Rc<P>,
    config: Rc<PushConfig>,
    clock: Rc<dyn Clock>,
}

impl<P: PushPlatform> CapabilityAcquirer<P> {
    pub fn new(platform: Rc<P>, config: Rc<PushConfig>, clock: Rc<dyn Clock>) -> Self {
        Self {
            platform,
            config,
            clock,
        }
    }

    /// Prompt for permission, bring up the service worker, and fetch a token.
    ///
    /// # Errors
    ///
    /// - [`AcquireError::MissingSigningKey`] when no VAPID key is configured
    ///   (checked before anything touches the user).
    /// - [`AcquireError::ServiceWorkerUnsupported`] when the runtime has no
    ///   service worker or notification API.
    /// - [`AcquireError::PermissionDenied`] when the prompt is denied or dismissed.
    /// - [`AcquireError::Provider`] for worker registration or token failures.
    pub async fn acquire(&self) -> Result<DeviceRegistration, AcquireError> {
        let vapid_key = match self.config.signing_key() {
            Ok(key) => key,
            Err(e) => {
                log::error!("cannot acquire push token: {e}");
                return Err(e.into());
            }
        };

        if !self.platform.supports_service_worker() {
            return Err(AcquireError::ServiceWorkerUnsupported);
        }

        let permission = self.platform.request_permission().await.map_err(|e| {
            log::debug!("notification permission API unavailable: {e}");
            AcquireError::ServiceWorkerUnsupported
        })?;
        if permission != Permission::Granted {
            log::info!("notification permission not granted ({permission:?})");
            return Err(AcquireError::PermissionDenied);
        }

        let worker = self
            .platform
            .register_worker(&self.config.service_worker_url)
            .await
            .map_err(|e| AcquireError::Provider(format!("service worker registration failed: {e}")))?;

        if let Err(e) = self.platform.update_worker(&worker).await {
            log::warn!("service worker update failed, continuing with current script: {e}");
        }

        let token = self
            .platform
            .device_token(&worker, vapid_key)
            .await
            .map_err(|e| AcquireError::Provider(e.to_string()))?;
        if token.trim().is_empty() {
            return Err(AcquireError::Provider("provider returned an empty token".into()));
        }

        let acquired_at = DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_else(Utc::now);

        Ok(DeviceRegistration {
            token,
            platform: self.config.platform,
            acquired_at,
        })
    }
}
