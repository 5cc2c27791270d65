//! Shared application state.

use std::sync::Arc;

use herald_common::auth::JwtContext;

use crate::push::PushSender;
use crate::store::TokenStore;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    jwt: JwtContext,
    store: Arc<dyn TokenStore>,
    push: Arc<dyn PushSender>,
}

impl AppState {
    pub fn new(jwt: JwtContext, store: Arc<dyn TokenStore>, push: Arc<dyn PushSender>) -> Self {
        Self {
            inner: Arc::new(Inner { jwt, store, push }),
        }
    }

    pub fn jwt(&self) -> &JwtContext {
        &self.inner.jwt
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.inner.store.as_ref()
    }

    pub fn push(&self) -> &dyn PushSender {
        self.inner.push.as_ref()
    }
}
