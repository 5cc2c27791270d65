//! Detached tasks on the browser event loop.

use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};

/// Spawns onto the page's microtask queue. Spawned tasks are never joined.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
