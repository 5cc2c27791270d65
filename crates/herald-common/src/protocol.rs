//! Registry wire protocol.
//!
//! POST   /fcm-tokens/save    — bind a device token to the caller
//! DELETE /fcm-tokens/remove  — drop the caller's binding for a token
//! POST   /fcm-tokens/test    — push a one-off test notification to the caller
//!
//! All endpoints take `Authorization: Bearer <credential>`. Failures carry
//! an [`ApiErrorResponse`] body.

use serde::{Deserialize, Serialize};

use crate::identity::Platform;

pub const SAVE_PATH: &str = "/fcm-tokens/save";
pub const REMOVE_PATH: &str = "/fcm-tokens/remove";
pub const TEST_PATH: &str = "/fcm-tokens/test";

/// Body of both the save and the remove call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub token: String,
    pub platform: Platform,
}

/// Generic success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response to the test endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResponse {
    pub message: String,
    /// Number of device tokens the test push was handed to.
    pub delivered: usize,
}

/// Non-2xx body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
}
