//! Build-time configuration.
//!
//! The browser bundle has no process environment, so settings are baked in
//! when the crate is compiled:
//!
//! - `HERALD_VAPID_KEY`          — provider signing key (required)
//! - `HERALD_SW_URL`             — service worker script URL
//! - `HERALD_DEFAULT_ICON`       — icon for messages without one
//! - `HERALD_REQUEST_TIMEOUT_MS` — registry request timeout
//! - `HERALD_API_BASE`           — prefix of the `/fcm-tokens/*` endpoints

use herald_client::config::{
    DEFAULT_ICON, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SERVICE_WORKER_URL,
};
use herald_client::PushConfig;
use herald_common::Platform;

const DEFAULT_API_BASE: &str = "/api";

pub fn from_build_env() -> PushConfig {
    PushConfig {
        platform: Platform::Web,
        vapid_key: option_env!("HERALD_VAPID_KEY").map(String::from),
        service_worker_url: option_env!("HERALD_SW_URL")
            .unwrap_or(DEFAULT_SERVICE_WORKER_URL)
            .into(),
        default_icon: Some(option_env!("HERALD_DEFAULT_ICON").unwrap_or(DEFAULT_ICON).into()),
        request_timeout_ms: option_env!("HERALD_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
    }
}

pub fn api_base() -> &'static str {
    option_env!("HERALD_API_BASE").unwrap_or(DEFAULT_API_BASE)
}
