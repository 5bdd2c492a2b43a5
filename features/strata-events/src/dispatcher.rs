use std::panic::{catch_unwind, AssertUnwindSafe};

use futures::{executor::ThreadPool, StreamExt};
use futures_channel::mpsc;

use crate::{errors::EventError, DynError};

/// A single subscriber invocation waiting to be run
pub(crate) struct Notification {
    pub(crate) event: &'static str,
    pub(crate) job: Box<dyn FnOnce() -> Result<(), DynError> + Send>,
}

/// Runs notifications on a worker pool, detached from the publisher
///
/// Notifications are queued without bound and handed to the pool by a pump task.
/// Subscriber errors and panics are logged and never reach the publisher.
#[derive(Clone)]
pub struct Dispatcher {
    queue: mpsc::UnboundedSender<Notification>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("closed", &self.queue.is_closed())
            .finish()
    }
}

impl Dispatcher {
    /// Starts a dispatcher with one worker per available core
    pub fn new() -> Result<Self, EventError> {
        let workers = std::thread::available_parallelism()
            .map(|cores| cores.get())
            .unwrap_or(2);
        Self::with_workers(workers)
    }

    pub fn with_workers(workers: usize) -> Result<Self, EventError> {
        let pool = ThreadPool::builder()
            .pool_size(workers.max(1))
            .name_prefix("strata-events-")
            .create()?;

        let (queue, notifications) = mpsc::unbounded();
        pool.spawn_ok(pump(notifications, pool.clone()));

        tracing::debug!("Started event dispatcher with {} workers", workers.max(1));
        Ok(Dispatcher { queue })
    }

    pub(crate) fn dispatch(&self, notification: Notification) -> Result<(), EventError> {
        self.queue
            .unbounded_send(notification)
            .map_err(|_| EventError::Closed)
    }

    /// Stops accepting notifications, queued ones are still delivered
    pub fn close(&self) {
        self.queue.close_channel();
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

/// Hands every queued notification to the pool until all senders are gone
async fn pump(mut notifications: mpsc::UnboundedReceiver<Notification>, pool: ThreadPool) {
    while let Some(notification) = notifications.next().await {
        pool.spawn_ok(async move { run(notification) });
    }
    tracing::debug!("Event queue drained, dispatcher stopped");
}

fn run(notification: Notification) {
    let Notification { event, job } = notification;

    match catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(())) => tracing::trace!("Delivered '{}'", event),
        Ok(Err(error)) => tracing::warn!("Subscriber of '{}' failed: {}", event, error),
        Err(_) => tracing::warn!("Subscriber of '{}' panicked", event),
    }
}
