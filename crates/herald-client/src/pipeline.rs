//! Wiring of the pipeline components over one set of ports.

use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::acquire::CapabilityAcquirer;
use crate::config::PushConfig;
use crate::dispatch::ForegroundDispatcher;
use crate::ports::{Clock, KeyValueStore, NotificationSurface, PushPlatform, TokenRegistry};
use crate::registration::RegistrationClient;
use crate::session::SessionCoordinator;

/// Adapters for every browser-owned resource the pipeline touches.
pub struct PushPorts<P: PushPlatform> {
    pub platform: Rc<P>,
    pub store: Rc<dyn KeyValueStore>,
    pub registry: Rc<dyn TokenRegistry>,
    pub surface: Rc<dyn NotificationSurface>,
    pub spawner: Rc<dyn LocalSpawn>,
    pub clock: Rc<dyn Clock>,
}

/// The assembled pipeline: one instance per page load.
pub struct PushPipeline<P: PushPlatform> {
    config: Rc<PushConfig>,
    registration: RegistrationClient<P>,
    dispatcher: ForegroundDispatcher,
    sessions: SessionCoordinator<P>,
}

impl<P: PushPlatform> Clone for PushPipeline<P> {
    fn clone(&self) -> Self {
        Self {
            config: Rc::clone(&self.config),
            registration: self.registration.clone(),
            dispatcher: self.dispatcher.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

impl<P: PushPlatform + 'static> PushPipeline<P> {
    /// Wire the components. A configuration problem is reported here, at
    /// startup, and again by the acquirer on first use.
    pub fn new(config: PushConfig, ports: PushPorts<P>) -> Self {
        if let Err(e) = config.validate() {
            log::error!("push pipeline misconfigured: {e}");
        }
        let config = Rc::new(config);

        let acquirer = CapabilityAcquirer::new(ports.platform, Rc::clone(&config), Rc::clone(&ports.clock));
        let registration = RegistrationClient::new(
            acquirer,
            Rc::clone(&ports.store),
            ports.registry,
            Rc::clone(&ports.spawner),
            config.platform,
        );
        let dispatcher = ForegroundDispatcher::new(
            ports.surface,
            ports.clock,
            Rc::clone(&ports.spawner),
            config.default_icon.clone(),
        );
        let sessions = SessionCoordinator::new(ports.store, registration.clone(), ports.spawner);

        Self {
            config,
            registration,
            dispatcher,
            sessions,
        }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    pub fn registration(&self) -> &RegistrationClient<P> {
        &self.registration
    }

    pub fn dispatcher(&self) -> &ForegroundDispatcher {
        &self.dispatcher
    }

    pub fn sessions(&self) -> &SessionCoordinator<P> {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::{FakePlatform, FakeRegistry, FakeSource, FakeSurface, FixedClock};
    use futures::executor::LocalPool;
    use herald_common::Role;
    use herald_common::payload::PushMessage;
    use std::cell::Cell;

    #[test]
    fn login_message_logout_round() {
        let mut pool = LocalPool::new();
        let registry = Rc::new(FakeRegistry::new());
        let surface = Rc::new(FakeSurface::new());
        let pipeline = PushPipeline::new(
            PushConfig::default().with_vapid_key("test-vapid"),
            PushPorts {
                platform: Rc::new(FakePlatform::granted()),
                store: Rc::new(MemoryStore::new()),
                registry: registry.clone(),
                surface: surface.clone(),
                spawner: Rc::new(pool.spawner()),
                clock: Rc::new(FixedClock::new(42)),
            },
        );

        let unread = Rc::new(Cell::new(0));
        let counter = Rc::clone(&unread);
        let source = FakeSource::new();
        pipeline
            .dispatcher()
            .listen(&source, move |_| counter.set(counter.get() + 1))
            .unwrap();

        pipeline.sessions().on_login(Role::Admin, "admin-jwt").unwrap();
        pool.run_until_stalled();
        assert_eq!(
            pipeline.registration().cached_token().as_deref(),
            Some("device-token-1")
        );
        assert_eq!(registry.test_calls().len(), 1);

        source.emit(PushMessage::from_data([("type", "lead_new")]));
        pool.run_until_stalled();
        assert_eq!(unread.get(), 1);
        assert_eq!(surface.worker_shown()[0].icon.as_deref(), Some("/icons/icon-192.png"));

        let sessions = pipeline.sessions().clone();
        pool.run_until(async move { sessions.on_logout(Role::Admin).await });
        assert!(pipeline.registration().cached_token().is_none());
        assert_eq!(registry.remove_calls().len(), 1);
    }
}
