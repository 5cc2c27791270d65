//! Registration client: binds the device token to the signed-in identity.
//!
//! Every public operation resolves to a plain value. Failures are logged
//! here and never reach the login/logout flow that triggered them.

use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use thiserror::Error;

use herald_common::protocol::TokenRequest;
use herald_common::{Platform, Role};

use crate::acquire::{CapabilityAcquirer, DeviceRegistration};
use crate::error::{AcquireError, RegistryError};
use crate::locator::{IdentityCredential, SessionTokenLocator};
use crate::ports::{KeyValueStore, PushPlatform, TokenRegistry};
use crate::storage;

/// Internal failure of one registration attempt.
#[derive(Debug, Error)]
enum RegisterError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error("no bearer credential stored yet")]
    NoCredential,
    #[error("registry call failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Registers and removes this device's push token in the backend registry.
pub struct RegistrationClient<P: PushPlatform> {
    inner: Rc<Inner<P>>,
}

struct Inner<P: PushPlatform> {
    acquirer: CapabilityAcquirer<P>,
    locator: SessionTokenLocator,
    store: Rc<dyn KeyValueStore>,
    registry: Rc<dyn TokenRegistry>,
    spawner: Rc<dyn LocalSpawn>,
    platform: Platform,
}

impl<P: PushPlatform> Clone for RegistrationClient<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: PushPlatform + 'static> RegistrationClient<P> {
    pub fn new(
        acquirer: CapabilityAcquirer<P>,
        store: Rc<dyn KeyValueStore>,
        registry: Rc<dyn TokenRegistry>,
        spawner: Rc<dyn LocalSpawn>,
        platform: Platform,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                acquirer,
                locator: SessionTokenLocator::new(Rc::clone(&store)),
                store,
                registry,
                spawner,
                platform,
            }),
        }
    }

    pub fn locator(&self) -> &SessionTokenLocator {
        &self.inner.locator
    }

    /// The cached registration for this platform, if any.
    pub fn cached(&self) -> Option<DeviceRegistration> {
        storage::load_registration(self.inner.store.as_ref(), self.inner.platform)
    }

    pub fn cached_token(&self) -> Option<String> {
        self.cached().map(|r| r.token)
    }

    /// Register the device token for whichever role is signed in (priority scan).
    ///
    /// With a warm cache and `force_update == false` this returns the cached
    /// token without prompting or touching the network. Resolves to `None`
    /// on any failure.
    pub async fn register(&self, force_update: bool) -> Option<String> {
        self.run_register(None, force_update).await
    }

    /// Register the device token for `role` specifically.
    pub async fn register_as(&self, role: Role, force_update: bool) -> Option<String> {
        self.run_register(Some(role), force_update).await
    }

    /// Unregister the cached token for whichever role is signed in, then
    /// clear the local cache whatever the registry answered.
    pub async fn remove(&self) {
        self.run_remove(None).await
    }

    /// Unregister using `role`'s credential.
    pub async fn remove_as(&self, role: Role) {
        self.run_remove(Some(role)).await
    }

    async fn run_register(&self, scope: Option<Role>, force_update: bool) -> Option<String> {
        if !force_update {
            if let Some(cached) = self.cached() {
                log::debug!("push token already registered, reusing cached token");
                return Some(cached.token);
            }
        }

        match self.try_register(scope).await {
            Ok(token) => Some(token),
            Err(RegisterError::Acquire(e)) if e.is_configuration() => {
                log::error!("push registration misconfigured: {e}");
                None
            }
            Err(RegisterError::NoCredential) => {
                log::info!("push registration skipped: not logged in yet");
                None
            }
            Err(e) => {
                log::warn!("push registration failed: {e}");
                None
            }
        }
    }

    async fn try_register(&self, scope: Option<Role>) -> Result<String, RegisterError> {
        let registration = self.inner.acquirer.acquire().await?;
        let credential = self.credential(scope).ok_or(RegisterError::NoCredential)?;

        let request = TokenRequest {
            token: registration.token.clone(),
            platform: registration.platform,
        };
        self.inner
            .registry
            .save(&credential.bearer_token, &request)
            .await?;

        log::info!(
            "push token registered for {} on {}",
            credential.role,
            registration.platform
        );

        // The binding exists server-side either way; a failed cache write only
        // costs a redundant registration on the next page load.
        if let Err(e) = storage::save_registration(self.inner.store.as_ref(), &registration) {
            log::warn!("could not cache push registration: {e}");
        }

        self.spawn_test_notification(credential.bearer_token);
        Ok(registration.token)
    }

    async fn run_remove(&self, scope: Option<Role>) {
        let Some(cached) = self.cached() else {
            log::debug!("no cached push token, nothing to unregister");
            return;
        };

        match self.credential(scope) {
            Some(credential) => {
                let request = TokenRequest {
                    token: cached.token,
                    platform: cached.platform,
                };
                match self
                    .inner
                    .registry
                    .remove(&credential.bearer_token, &request)
                    .await
                {
                    Ok(()) => log::info!("push token unregistered for {}", credential.role),
                    Err(e) => log::warn!("push token unregister failed: {e}"),
                }
            }
            None => log::debug!("no credential available, clearing local push token only"),
        }

        storage::clear_registration(self.inner.store.as_ref(), self.inner.platform);
    }

    fn credential(&self, scope: Option<Role>) -> Option<IdentityCredential> {
        match scope {
            Some(role) => self
                .inner
                .locator
                .locate_for(role)
                .map(|bearer_token| IdentityCredential { role, bearer_token }),
            None => self.inner.locator.locate_credential(),
        }
    }

    /// Detached one-shot test push. Its outcome is only logged.
    fn spawn_test_notification(&self, bearer: String) {
        let registry = Rc::clone(&self.inner.registry);
        let task = async move {
            match registry.send_test(&bearer).await {
                Ok(()) => log::debug!("test notification requested"),
                Err(e) => log::warn!("test notification failed: {e}"),
            }
        };
        if let Err(e) = self.inner.spawner.spawn_local(task) {
            log::warn!("could not spawn test notification task: {e}");
        }
    }
}
