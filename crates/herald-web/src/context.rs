//! Reactive push state, provided via Leptos context.
//!
//! Role login pages call [`PushContext::login`] after a successful sign-in
//! and [`PushContext::logout`] from their logout buttons; UI badges read
//! [`PushContext::unread`].

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use herald_client::StorageError;
use herald_common::payload::NotificationEnvelope;
use herald_common::Role;

use crate::firebase::FirebaseMessageSource;
use crate::BrowserPipeline;

#[derive(Clone, Copy)]
pub struct PushContext {
    pipeline: StoredValue<BrowserPipeline, LocalStorage>,
    /// Foreground messages received since the last [`mark_all_read`](Self::mark_all_read).
    pub unread: ReadSignal<u32>,
    set_unread: WriteSignal<u32>,
    /// The most recent foreground message.
    pub last_message: ReadSignal<Option<NotificationEnvelope>>,
    set_last_message: WriteSignal<Option<NotificationEnvelope>>,
    /// Roles with a stored credential.
    pub roles: ReadSignal<Vec<Role>>,
    set_roles: WriteSignal<Vec<Role>>,
}

impl PushContext {
    pub fn new(pipeline: BrowserPipeline) -> Self {
        let (unread, set_unread) = signal(0u32);
        let (last_message, set_last_message) = signal(None::<NotificationEnvelope>);
        let (roles, set_roles) = signal(pipeline.sessions().active_roles());
        Self {
            pipeline: StoredValue::new_local(pipeline),
            unread,
            set_unread,
            last_message,
            set_last_message,
            roles,
            set_roles,
        }
    }

    fn pipeline(&self) -> BrowserPipeline {
        self.pipeline.get_value()
    }

    /// Subscribe the foreground dispatcher to Firebase messages.
    pub fn start_listening(&self) {
        let set_unread = self.set_unread;
        let set_last_message = self.set_last_message;
        let result = self
            .pipeline()
            .dispatcher()
            .listen(&FirebaseMessageSource, move |envelope| {
                set_unread.update(|n| *n += 1);
                set_last_message.set(Some(envelope.clone()));
            });
        if let Err(e) = result {
            log::warn!("foreground push listener not started: {e}");
        }
    }

    /// Store `role`'s credential and register this device for it in the
    /// background.
    pub fn login(&self, role: Role, bearer_token: &str) -> Result<(), StorageError> {
        let pipeline = self.pipeline();
        let result = pipeline.sessions().on_login(role, bearer_token);
        self.set_roles.set(pipeline.sessions().active_roles());
        result
    }

    /// Unregister this device for `role`, then drop the credential.
    pub fn logout(&self, role: Role) {
        let sessions = self.pipeline().sessions().clone();
        let set_roles = self.set_roles;
        leptos::task::spawn_local(async move {
            sessions.on_logout(role).await;
            set_roles.set(sessions.active_roles());
        });
    }

    pub fn mark_all_read(&self) {
        self.set_unread.set(0);
    }

    /// The device token currently registered, if any.
    pub fn registered_token(&self) -> Option<String> {
        self.pipeline().registration().cached_token()
    }
}

/// Create the context and provide it to the current reactive owner.
pub fn provide_push_context(pipeline: BrowserPipeline) -> PushContext {
    let ctx = PushContext::new(pipeline);
    provide_context(ctx);
    ctx
}

pub fn use_push() -> PushContext {
    expect_context::<PushContext>()
}
