//! Background sweep.
//!
//! One dedicated thread runs a sweep immediately, then waits `period` on a stop
//! channel before the next one. Ticks never overlap: a slow tick pushes the
//! next one back. A tick that panics is logged and the loop carries on.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::Shared;

const THREAD_NAME: &str = "expiring-trust-sweep";

pub(crate) struct Sweeper {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub fn spawn(shared: Arc<Shared>, period: Duration) -> io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || loop {
                tick(&shared);
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    // Stop requested, or the manager went away
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        Ok(Self { stop_tx, handle })
    }

    /// Signals the thread and waits for the current tick to finish.
    pub fn shutdown(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            log::error!("Sweep thread terminated abnormally");
        }
    }
}

fn tick(shared: &Shared) {
    match panic::catch_unwind(AssertUnwindSafe(|| shared.sweep())) {
        Ok(0) => {}
        Ok(evicted) => log::debug!("Sweep evicted {} stale bucket(s)", evicted),
        Err(_) => log::error!("Sweep tick panicked; next tick still scheduled"),
    }
}
