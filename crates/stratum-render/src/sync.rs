//! Bridge carrying deferred work from worker threads to the render thread.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Default number of queued tasks before producers block.
pub const DEFAULT_SYNC_CAPACITY: usize = 500;

pub type SyncTask<R> = Box<dyn FnOnce(&mut R) + Send>;

/// Producer half. Cheap to clone; one per worker is typical.
pub struct SyncSender<R> {
    tx: Sender<SyncTask<R>>,
}

impl<R> Clone for SyncSender<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<R> SyncSender<R> {
    /// Queues `f` to run on the render thread, blocking while the bridge is full.
    /// Returns false if the render side is gone; `f` is dropped unrun in that case.
    pub fn sync(&self, f: impl FnOnce(&mut R) + Send + 'static) -> bool {
        let task: SyncTask<R> = Box::new(f);
        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(task)) => {
                log::trace!(target: "render", "sync bridge full; waiting");
                self.tx.send(task).is_ok()
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Consumer half, owned by the render thread.
pub struct SyncReceiver<R> {
    rx: Receiver<SyncTask<R>>,
}

impl<R> SyncReceiver<R> {
    /// Runs queued tasks against `target` in FIFO order until the bridge is empty.
    /// Returns how many ran.
    pub fn drain(&self, target: &mut R) -> usize {
        let mut n = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(target);
            n += 1;
        }
        n
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Creates a bridge holding at most `capacity` pending tasks.
pub fn render_sync<R>(capacity: usize) -> (SyncSender<R>, SyncReceiver<R>) {
    let (tx, rx) = bounded(capacity.max(1));
    (SyncSender { tx }, SyncReceiver { rx })
}
