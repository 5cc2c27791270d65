//! In-memory fakes for the ports, with call counters.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use herald_common::payload::{NotificationEnvelope, PushMessage};
use herald_common::protocol::TokenRequest;

use crate::error::{PlatformError, RegistryError, RenderError};
use crate::ports::{
    Clock, MessageCallback, MessageSource, NotificationSurface, Permission, PushPlatform,
    TokenRegistry,
};

// ── Platform ────────────────────────────────────────────────────────

pub struct FakePlatform {
    permission: Cell<Permission>,
    sw_supported: Cell<bool>,
    permission_requests: Cell<usize>,
    worker_updates: Cell<usize>,
    token_requests: Cell<usize>,
    fail_update: Cell<bool>,
    token_error: RefCell<Option<String>>,
    last_vapid_key: RefCell<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeWorker(pub String);

impl FakePlatform {
    pub fn with_permission(permission: Permission) -> Self {
        Self {
            permission: Cell::new(permission),
            sw_supported: Cell::new(true),
            permission_requests: Cell::new(0),
            worker_updates: Cell::new(0),
            token_requests: Cell::new(0),
            fail_update: Cell::new(false),
            token_error: RefCell::new(None),
            last_vapid_key: RefCell::new(None),
        }
    }

    pub fn granted() -> Self {
        Self::with_permission(Permission::Granted)
    }

    pub fn set_permission(&self, permission: Permission) {
        self.permission.set(permission);
    }

    pub fn set_service_worker_supported(&self, supported: bool) {
        self.sw_supported.set(supported);
    }

    pub fn fail_worker_update(&self, fail: bool) {
        self.fail_update.set(fail);
    }

    pub fn fail_token(&self, msg: &str) {
        *self.token_error.borrow_mut() = Some(msg.to_string());
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.get()
    }

    pub fn worker_updates(&self) -> usize {
        self.worker_updates.get()
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.get()
    }

    pub fn last_vapid_key(&self) -> Option<String> {
        self.last_vapid_key.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PushPlatform for FakePlatform {
    type Worker = FakeWorker;

    fn supports_service_worker(&self) -> bool {
        self.sw_supported.get()
    }

    async fn request_permission(&self) -> Result<Permission, PlatformError> {
        self.permission_requests.set(self.permission_requests.get() + 1);
        Ok(self.permission.get())
    }

    async fn register_worker(&self, script_url: &str) -> Result<FakeWorker, PlatformError> {
        Ok(FakeWorker(script_url.to_string()))
    }

    async fn update_worker(&self, _worker: &FakeWorker) -> Result<(), PlatformError> {
        self.worker_updates.set(self.worker_updates.get() + 1);
        if self.fail_update.get() {
            return Err(PlatformError("update failed".into()));
        }
        Ok(())
    }

    async fn device_token(&self, _worker: &FakeWorker, vapid_key: &str) -> Result<String, PlatformError> {
        *self.last_vapid_key.borrow_mut() = Some(vapid_key.to_string());
        if let Some(msg) = self.token_error.borrow().clone() {
            return Err(PlatformError(msg));
        }
        let n = self.token_requests.get() + 1;
        self.token_requests.set(n);
        Ok(format!("device-token-{n}"))
    }
}

// ── Registry ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeRegistry {
    saves: RefCell<Vec<(String, TokenRequest)>>,
    removes: RefCell<Vec<(String, TokenRequest)>>,
    tests: RefCell<Vec<String>>,
    save_error: RefCell<Option<RegistryError>>,
    remove_error: RefCell<Option<RegistryError>>,
    test_error: RefCell<Option<RegistryError>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_save(&self, err: RegistryError) {
        *self.save_error.borrow_mut() = Some(err);
    }

    pub fn fail_remove(&self, err: RegistryError) {
        *self.remove_error.borrow_mut() = Some(err);
    }

    pub fn fail_test(&self, err: RegistryError) {
        *self.test_error.borrow_mut() = Some(err);
    }

    pub fn save_calls(&self) -> Vec<(String, TokenRequest)> {
        self.saves.borrow().clone()
    }

    pub fn remove_calls(&self) -> Vec<(String, TokenRequest)> {
        self.removes.borrow().clone()
    }

    pub fn test_calls(&self) -> Vec<String> {
        self.tests.borrow().clone()
    }

    pub fn network_calls(&self) -> usize {
        self.saves.borrow().len() + self.removes.borrow().len() + self.tests.borrow().len()
    }
}

#[async_trait(?Send)]
impl TokenRegistry for FakeRegistry {
    async fn save(&self, bearer: &str, request: &TokenRequest) -> Result<(), RegistryError> {
        self.saves
            .borrow_mut()
            .push((bearer.to_string(), request.clone()));
        match self.save_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn remove(&self, bearer: &str, request: &TokenRequest) -> Result<(), RegistryError> {
        self.removes
            .borrow_mut()
            .push((bearer.to_string(), request.clone()));
        match self.remove_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn send_test(&self, bearer: &str) -> Result<(), RegistryError> {
        self.tests.borrow_mut().push(bearer.to_string());
        match self.test_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSurface {
    worker_error: RefCell<Option<RenderError>>,
    in_page_error: RefCell<Option<RenderError>>,
    worker_shown: RefCell<Vec<NotificationEnvelope>>,
    in_page_shown: RefCell<Vec<NotificationEnvelope>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_worker(&self, err: RenderError) {
        *self.worker_error.borrow_mut() = Some(err);
    }

    pub fn fail_in_page(&self, err: RenderError) {
        *self.in_page_error.borrow_mut() = Some(err);
    }

    pub fn worker_shown(&self) -> Vec<NotificationEnvelope> {
        self.worker_shown.borrow().clone()
    }

    pub fn in_page_shown(&self) -> Vec<NotificationEnvelope> {
        self.in_page_shown.borrow().clone()
    }
}

#[async_trait(?Send)]
impl NotificationSurface for FakeSurface {
    async fn show_via_worker(&self, envelope: &NotificationEnvelope) -> Result<(), RenderError> {
        if let Some(err) = self.worker_error.borrow().clone() {
            return Err(err);
        }
        self.worker_shown.borrow_mut().push(envelope.clone());
        Ok(())
    }

    fn show_in_page(&self, envelope: &NotificationEnvelope) -> Result<(), RenderError> {
        if let Some(err) = self.in_page_error.borrow().clone() {
            return Err(err);
        }
        self.in_page_shown.borrow_mut().push(envelope.clone());
        Ok(())
    }
}

// ── Message source ──────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSource {
    callbacks: RefCell<Vec<MessageCallback>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribers(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn emit(&self, message: PushMessage) {
        for callback in self.callbacks.borrow().iter() {
            callback(message.clone());
        }
    }
}

impl MessageSource for FakeSource {
    fn subscribe(&self, callback: MessageCallback) -> Result<(), PlatformError> {
        self.callbacks.borrow_mut().push(callback);
        Ok(())
    }
}

// ── Clock ───────────────────────────────────────────────────────────

pub struct FixedClock(Cell<i64>);

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self(Cell::new(now_ms))
    }

    pub fn advance(&self, ms: i64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}
