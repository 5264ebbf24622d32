use crossbeam_channel::{bounded, select, tick, Sender, TryRecvError};

use crate::helpe::*;

/// A cancellable repeating task: calls a closure every `period` on a
/// worker thread, until cancelled.
///
/// Calls never overlap, since there is a single worker. Cancelling waits
/// for a call already in progress to finish, and discards one that is
/// due but hasn't started yet.
#[derive(Debug, Default)]
pub struct Clock {
    handle: Option<Handle>,
}

#[derive(Debug)]
struct Handle {
    // Dropping the sender is itself the stop signal.
    stop_tx:    Sender<()>,
    worker:     thread::JoinHandle<()>,
}

impl Clock {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Starts firing `on_tick`. A clock that is already running is
    /// cancelled first.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where F: FnMut() + Send + 'static {
        self.cancel();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let worker = thread::spawn(move || {
            let ticker = tick(period);
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        // Both may be ready at once; stopping wins.
                        match stop_rx.try_recv() {
                            Err(TryRecvError::Empty)    => on_tick(),
                            _                           => break,
                        }
                    },
                }
            }
        });
        debug!(?period, "Clock started");
        self.handle = Some(Handle { stop_tx, worker });
    }

    /// Stops the clock and waits for the worker to exit. Returns `false`
    /// if there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        let Some(Handle { stop_tx, worker }) = self.handle.take() else { return false; };
        drop(stop_tx);
        if worker.join().is_err() {
            warn!("Clock worker panicked");
        }
        debug!("Clock cancelled");

        true
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.cancel();
    }
}
