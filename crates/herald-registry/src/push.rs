//! Outbound push delivery.
//!
//! The provider transport lives outside this service. [`LogPushSender`] stands
//! in for it: every push is logged and counted as delivered.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use herald_common::payload::{NotificationPayload, PushMessage};

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("device token rejected by provider")]
    Unregistered,
    #[error("provider error: {0}")]
    Provider(String),
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), PushError>;
}

/// Logs each push instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), PushError> {
        let title = message
            .notification
            .as_ref()
            .and_then(|n| n.title.as_deref())
            .unwrap_or_default();
        tracing::info!(
            token = %redact(device_token),
            kind = message.kind(),
            title,
            "push (log only)"
        );
        Ok(())
    }
}

/// First eight characters of a device token, for logs.
pub fn redact(device_token: &str) -> String {
    let head: String = device_token.chars().take(8).collect();
    format!("{head}…")
}

/// The one-off notification sent by the test endpoint.
pub fn test_message() -> PushMessage {
    let mut data = BTreeMap::new();
    data.insert("type".to_string(), "test".to_string());
    data.insert("timestamp".to_string(), Utc::now().timestamp_millis().to_string());

    PushMessage {
        notification: Some(NotificationPayload {
            title: Some("Test notification".into()),
            body: Some("Push notifications are working on this device.".into()),
            ..Default::default()
        }),
        data,
        ..Default::default()
    }
}
