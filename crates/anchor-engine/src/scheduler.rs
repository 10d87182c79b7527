//! Recurring tick threads.
//!
//! Each tick runs on a dedicated named thread woken by
//! `crossbeam_channel::recv_timeout`; sending `Shutdown` (or dropping the
//! handle) terminates the loop deterministically, so no tick can outlive
//! the engine that spawned it.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::debug;

enum TickCommand {
    Shutdown,
}

/// Handle to one recurring tick thread.
pub struct TickHandle {
    name: &'static str,
    tx: Sender<TickCommand>,
    handle: Option<JoinHandle<()>>,
}

impl TickHandle {
    /// Spawn a thread that invokes `tick` every `interval` until shutdown.
    /// The first invocation happens one full interval after spawn.
    pub fn spawn<F>(name: &'static str, interval: Duration, tick: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = bounded::<TickCommand>(1);

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || loop {
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(TickCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .expect("failed to spawn tick thread");

        Self {
            name,
            tx,
            handle: Some(handle),
        }
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        let _ = self.tx.send(TickCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!(task = self.name, "tick thread stopped");
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
