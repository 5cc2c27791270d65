//! Session lifecycle hooks for the role login/logout flows.
//!
//! Ordering is the whole point of this module:
//! - login: the credential write completes *before* registration is
//!   scheduled, because registration reads that credential back;
//! - logout: unregistration completes *before* the credential is deleted,
//!   because unregistration authenticates with it.

use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};

use herald_common::Role;

use crate::error::StorageError;
use crate::ports::{KeyValueStore, PushPlatform};
use crate::registration::RegistrationClient;

pub struct SessionCoordinator<P: PushPlatform> {
    store: Rc<dyn KeyValueStore>,
    client: RegistrationClient<P>,
    spawner: Rc<dyn LocalSpawn>,
}

impl<P: PushPlatform> Clone for SessionCoordinator<P> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            client: self.client.clone(),
            spawner: Rc::clone(&self.spawner),
        }
    }
}

impl<P: PushPlatform + 'static> SessionCoordinator<P> {
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        client: RegistrationClient<P>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Self {
        Self {
            store,
            client,
            spawner,
        }
    }

    /// Persist `role`'s credential, then schedule a forced registration for
    /// that role in the background. Returns once the credential is stored;
    /// registration never delays the caller.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the credential could not be written. No
    /// registration is scheduled in that case.
    pub fn on_login(&self, role: Role, bearer_token: &str) -> Result<(), StorageError> {
        if let Err(e) = self.store.set(&role.credential_key(), bearer_token) {
            log::error!("could not persist {role} credential, push registration not scheduled: {e}");
            return Err(e);
        }

        let client = self.client.clone();
        let task = async move {
            if client.register_as(role, true).await.is_none() {
                log::debug!("push registration after {role} login produced no token");
            }
        };
        if let Err(e) = self.spawner.spawn_local(task) {
            log::warn!("could not schedule push registration after {role} login: {e}");
        }
        Ok(())
    }

    /// Unregister the device token with `role`'s credential, then delete
    /// the credential.
    pub async fn on_logout(&self, role: Role) {
        self.client.remove_as(role).await;
        self.store.delete(&role.credential_key());
        log::info!("{role} logged out");
    }

    /// Roles that currently have a stored credential.
    pub fn active_roles(&self) -> Vec<Role> {
        self.client.locator().signed_in_roles()
    }

    pub fn client(&self) -> &RegistrationClient<P> {
        &self.client
    }
}
