//! Herald push pipeline.
//!
//! Acquires a device push token, binds it to the signed-in identity in the
//! backend registry, and renders messages that arrive while the page is
//! open. Everything the browser owns (storage, permission prompts, service
//! workers, the push provider, HTTP) sits behind the traits in [`ports`], so
//! the pipeline runs the same against `web-sys` adapters and in-memory fakes.
//!
//! The pipeline is single-threaded: components share state through `Rc`
//! and background work is handed to a [`futures::task::LocalSpawn`].

pub mod acquire;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod ports;
pub mod registration;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use acquire::{CapabilityAcquirer, DeviceRegistration};
pub use config::PushConfig;
pub use dispatch::{ForegroundDispatcher, ListenerState, RenderOutcome};
pub use error::{AcquireError, ConfigError, RegistryError, StorageError};
pub use locator::{IdentityCredential, SessionTokenLocator};
pub use pipeline::{PushPipeline, PushPorts};
pub use registration::RegistrationClient;
pub use session::SessionCoordinator;
pub use storage::MemoryStore;
