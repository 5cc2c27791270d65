//! Foreground message dispatcher.
//!
//! While the page is open the provider hands messages to the page instead
//! of the service worker. The dispatcher turns each one into a
//! [`NotificationEnvelope`], shows it, and forwards it to the application.

use std::cell::Cell;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};

use herald_common::payload::{NotificationEnvelope, PushMessage};

use crate::error::PlatformError;
use crate::ports::{Clock, MessageSource, NotificationSurface};

/// Listener lifecycle. There is no way back to `Idle`; the subscription
/// lives as long as the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Subscribed,
}

/// How a message ended up on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Shown by the service worker registration.
    Worker,
    /// Shown as an in-page notification after the worker path failed.
    InPage,
    /// Neither path worked; the handler still ran.
    Dropped,
}

#[derive(Clone)]
pub struct ForegroundDispatcher {
    inner: Rc<Inner>,
}

struct Inner {
    surface: Rc<dyn NotificationSurface>,
    clock: Rc<dyn Clock>,
    spawner: Rc<dyn LocalSpawn>,
    default_icon: Option<String>,
    state: Cell<ListenerState>,
}

impl ForegroundDispatcher {
    pub fn new(
        surface: Rc<dyn NotificationSurface>,
        clock: Rc<dyn Clock>,
        spawner: Rc<dyn LocalSpawn>,
        default_icon: Option<String>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                surface,
                clock,
                spawner,
                default_icon,
                state: Cell::new(ListenerState::Idle),
            }),
        }
    }

    pub fn state(&self) -> ListenerState {
        self.inner.state.get()
    }

    /// Subscribe to `source` once. Every message is rendered and then passed
    /// to `handler`, whether or not rendering succeeded.
    ///
    /// A second call on a subscribed dispatcher is ignored.
    pub fn listen<F>(&self, source: &dyn MessageSource, handler: F) -> Result<(), PlatformError>
    where
        F: Fn(&NotificationEnvelope) + 'static,
    {
        if self.state() == ListenerState::Subscribed {
            log::warn!("foreground listener already subscribed, ignoring second listen()");
            return Ok(());
        }

        let dispatcher = self.clone();
        let handler = Rc::new(handler);
        source.subscribe(Box::new(move |message: PushMessage| {
            let d = dispatcher.clone();
            let handler = Rc::clone(&handler);
            let task = async move {
                let (envelope, _) = d.deliver(&message).await;
                handler(&envelope);
            };
            if let Err(e) = dispatcher.inner.spawner.spawn_local(task) {
                log::error!("could not spawn foreground message task: {e}");
            }
        }))?;

        self.inner.state.set(ListenerState::Subscribed);
        log::debug!("foreground push listener subscribed");
        Ok(())
    }

    /// Build the envelope for `message` and render it, preferring the
    /// service worker and falling back to an in-page notification once.
    pub async fn deliver(&self, message: &PushMessage) -> (NotificationEnvelope, RenderOutcome) {
        let envelope = NotificationEnvelope::from_message(
            message,
            self.inner.clock.now_ms(),
            self.inner.default_icon.as_deref(),
        );
        log::debug!("foreground push received: {} ({})", envelope.title, envelope.dedup_tag);

        let outcome = match self.inner.surface.show_via_worker(&envelope).await {
            Ok(()) => RenderOutcome::Worker,
            Err(worker_err) => {
                log::debug!("worker render unavailable ({worker_err}), falling back to in-page");
                match self.inner.surface.show_in_page(&envelope) {
                    Ok(()) => RenderOutcome::InPage,
                    Err(page_err) => {
                        log::warn!(
                            "dropping notification {}: worker: {worker_err}; in-page: {page_err}",
                            envelope.dedup_tag
                        );
                        RenderOutcome::Dropped
                    }
                }
            }
        };

        (envelope, outcome)
    }
}
