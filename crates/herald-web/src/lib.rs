//! Herald push pipeline, browser build.
//!
//! Binds every port of `herald-client` to the real browser: `localStorage`,
//! `fetch`, the Notification API, the service worker container, and the
//! Firebase Messaging SDK loaded by the host page. The host application
//! calls [`install`] once per page load and drives logins/logouts through
//! the [`context::PushContext`] it provides.

pub mod api;
pub mod config;
pub mod context;
pub mod firebase;
pub mod platform;
pub mod spawn;
pub mod storage;
pub mod surface;

use std::rc::Rc;

use herald_client::ports::SystemClock;
use herald_client::{PushPipeline, PushPorts};

use api::HttpRegistry;
use platform::BrowserPlatform;
use spawn::BrowserSpawner;
use storage::BrowserStorage;
use surface::BrowserSurface;

/// The pipeline as wired for the browser.
pub type BrowserPipeline = PushPipeline<BrowserPlatform>;

/// Build the pipeline from the build-time configuration.
pub fn build_pipeline() -> BrowserPipeline {
    let push_config = config::from_build_env();
    let registry = HttpRegistry::new(config::api_base(), push_config.request_timeout_ms);

    PushPipeline::new(
        push_config,
        PushPorts {
            platform: Rc::new(BrowserPlatform::new()),
            store: Rc::new(BrowserStorage),
            registry: Rc::new(registry),
            surface: Rc::new(BrowserSurface::new()),
            spawner: Rc::new(BrowserSpawner),
            clock: Rc::new(SystemClock),
        },
    )
}

/// Wire the pipeline, start the foreground listener, and provide the
/// [`context::PushContext`] to the surrounding Leptos tree.
///
/// Must run inside a reactive owner (e.g. the root component).
pub fn install() -> context::PushContext {
    let ctx = context::provide_push_context(build_pipeline());
    ctx.start_listening();
    ctx
}

/// Logging setup for hosts that do not install their own logger.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    log::info!("Herald push pipeline starting");
}
