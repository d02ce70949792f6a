//! Cooperative flush driver for async hosts
//!
//! Mirrors the built-in flusher thread for processes that already run an
//! async scheduler: one task repeatedly drains a batch and sleeps the
//! configured interval. Configure the engine with
//! `spawn_flush_thread: false` when this task is the driver.

use super::engine::Engine;

/// Drives the engine's batch flush until shutdown begins or the engine is
/// unpublished. Returns immediately when no engine is live.
pub async fn flusher_task() {
    if let Some(engine) = Engine::try_instance() {
        engine.mark_flusher_started();
    }

    loop {
        let Some(engine) = Engine::try_instance() else {
            return;
        };
        if engine.is_shutting_down() {
            return;
        }
        engine.flush_once_batch();
        tokio::time::sleep(engine.flush_interval()).await;
    }
}
