//! Shared types for the Herald push pipeline.
//!
//! This crate contains:
//! - **Identity** — push platforms and the authenticated roles that can own a device token
//! - **Protocol** — request/response bodies of the `/fcm-tokens/*` registry endpoints
//! - **Payload** — provider message parsing and notification envelope construction
//! - **Auth** (feature `auth`) — Ed25519-signed JWTs used as bearer credentials

#[cfg(feature = "auth")]
pub mod auth;
pub mod identity;
pub mod payload;
pub mod protocol;

pub use identity::{Platform, Role};
