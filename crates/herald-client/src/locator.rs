//! Bearer credential lookup across the role-specific storage keys.

use std::rc::Rc;

use herald_common::Role;

use crate::ports::KeyValueStore;

/// A stored bearer credential and the role it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCredential {
    pub role: Role,
    pub bearer_token: String,
}

/// Finds which signed-in identity should own a registration.
#[derive(Clone)]
pub struct SessionTokenLocator {
    store: Rc<dyn KeyValueStore>,
}

impl SessionTokenLocator {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// First non-empty credential in [`Role::PRIORITY`] order. With several
    /// roles signed in, the earliest one wins.
    pub fn locate(&self) -> Option<String> {
        self.locate_credential().map(|c| c.bearer_token)
    }

    /// Like [`locate`](Self::locate), keeping the role.
    pub fn locate_credential(&self) -> Option<IdentityCredential> {
        Role::PRIORITY.into_iter().find_map(|role| {
            self.locate_for(role).map(|bearer_token| IdentityCredential { role, bearer_token })
        })
    }

    /// The credential of exactly `role`.
    pub fn locate_for(&self, role: Role) -> Option<String> {
        self.store
            .get(&role.credential_key())
            .filter(|token| !token.trim().is_empty())
    }

    /// Every role with a stored credential, in priority order.
    pub fn signed_in_roles(&self) -> Vec<Role> {
        Role::PRIORITY
            .into_iter()
            .filter(|role| self.locate_for(*role).is_some())
            .collect()
    }
}
