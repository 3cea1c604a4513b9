//! The bounded hand-off queue between upload and download workers.

use std::sync::Mutex;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Result of a non-blocking [`Distributor::try_pop`].
#[derive(Debug, PartialEq, Eq)]
pub enum TryPop {
    /// A fresh object path; ownership transfers to the caller.
    Item(String),
    /// Nothing queued right now; the distributor may still produce items.
    Empty,
    /// The distributor is closed and fully drained.
    Closed,
}

/// A bounded hand-off queue carrying freshly uploaded object paths from
/// upload workers to download workers.
///
/// The small capacity lets a few uploads queue ahead of consumption while
/// blocking producers once consumers fall behind, so memory use stays
/// bounded and a slow download side throttles upload throughput.
#[derive(Debug)]
pub struct Distributor {
    tx: Mutex<Option<mpsc::Sender<String>>>,
    rx: tokio::sync::Mutex<mpsc::Receiver<String>>,
}

impl Distributor {
    /// Queue capacity used by the pool.
    pub const DEFAULT_CAPACITY: usize = 5;

    /// Creates a distributor holding at most `capacity` undelivered paths.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx: Mutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    /// Hands a freshly uploaded path over to the download side.
    ///
    /// Blocks while the queue is at capacity. Returns `false` if the
    /// distributor was already closed, in which case the path is dropped.
    pub async fn push(&self, path: String) -> bool {
        let tx = match &*self.tx.lock().unwrap() {
            Some(tx) => tx.clone(),
            None => return false,
        };
        tx.send(path).await.is_ok()
    }

    /// Non-blocking attempt to receive a fresh path.
    pub fn try_pop(&self) -> TryPop {
        let Ok(mut rx) = self.rx.try_lock() else {
            // Another worker is parked in `pop`; it gets the next item.
            return TryPop::Empty;
        };
        match rx.try_recv() {
            Ok(path) => TryPop::Item(path),
            Err(TryRecvError::Empty) => TryPop::Empty,
            Err(TryRecvError::Disconnected) => TryPop::Closed,
        }
    }

    /// Receives a fresh path, parking the caller until one arrives.
    ///
    /// Returns `None` once the distributor is closed and drained.
    pub async fn pop(&self) -> Option<String> {
        self.rx.lock().await.recv().await
    }

    /// Closes the distributor. Idempotent.
    ///
    /// Already buffered paths stay poppable; any further push is dropped.
    pub fn close(&self) {
        self.tx.lock().unwrap().take();
    }
}
