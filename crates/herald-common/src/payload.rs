//! Provider message payloads and the renderable envelope built from them.
//!
//! Providers deliver either a structured `notification` block, a data-only
//! message (everything in `data`), or both. [`NotificationEnvelope::from_message`]
//! normalises all three into one shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "New notification";
pub const DEFAULT_KIND: &str = "general";

// ── Incoming message ────────────────────────────────────────────────

/// A message as handed over by the push provider while the page is open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationPayload>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcm_options: Option<FcmOptions>,
}

/// Structured notification block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "click_action")]
    pub click_action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FcmOptions {
    #[serde(default)]
    pub link: Option<String>,
}

impl PushMessage {
    /// Data-only constructor.
    pub fn from_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: data.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Self::default()
        }
    }

    /// The `type` field of the data payload, or [`DEFAULT_KIND`].
    pub fn kind(&self) -> &str {
        non_empty(self.data.get("type").map(String::as_str)).unwrap_or(DEFAULT_KIND)
    }

    fn data_field(&self, key: &str) -> Option<&str> {
        non_empty(self.data.get(key).map(String::as_str))
    }
}

// ── Envelope ────────────────────────────────────────────────────────

/// What actually gets rendered and handed to the application handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    /// Where a click on the notification should navigate.
    pub click_url: Option<String>,
    pub data: BTreeMap<String, String>,
    pub dedup_tag: String,
}

impl NotificationEnvelope {
    /// Build the envelope for `message` received at `received_at_ms`.
    ///
    /// The structured notification block wins over data fields; the data
    /// payload is the fallback for data-only messages.
    pub fn from_message(message: &PushMessage, received_at_ms: i64, default_icon: Option<&str>) -> Self {
        let n = message.notification.as_ref();

        let title = non_empty(n.and_then(|n| n.title.as_deref()))
            .or_else(|| message.data_field("title"))
            .unwrap_or(DEFAULT_TITLE)
            .to_string();

        let body = non_empty(n.and_then(|n| n.body.as_deref()))
            .or_else(|| message.data_field("body"))
            .or_else(|| message.data_field("message"))
            .unwrap_or_default()
            .to_string();

        let icon = non_empty(n.and_then(|n| n.icon.as_deref()))
            .or_else(|| message.data_field("icon"))
            .or(default_icon)
            .map(str::to_string);

        let click_url = non_empty(
            message
                .fcm_options
                .as_ref()
                .and_then(|o| o.link.as_deref()),
        )
        .or_else(|| non_empty(n.and_then(|n| n.click_action.as_deref())))
        .or_else(|| message.data_field("url"))
        .or_else(|| message.data_field("link"))
        .or_else(|| message.data_field("click_action"))
        .map(str::to_string);

        Self {
            title,
            body,
            icon,
            click_url,
            data: message.data.clone(),
            dedup_tag: dedup_tag(message.kind(), received_at_ms),
        }
    }
}

/// Notification tag: `<kind>-<timestamp_ms>`.
///
/// The timestamp makes every tag unique, so two messages of the same kind
/// never replace each other on screen.
pub fn dedup_tag(kind: &str, timestamp_ms: i64) -> String {
    format!("{kind}-{timestamp_ms}")
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
