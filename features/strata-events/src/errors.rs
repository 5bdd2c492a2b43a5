use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    /// The worker pool could not be started
    #[error("Failed to start the event worker pool: {0}")]
    Pool(#[from] std::io::Error),
    /// The dispatcher stopped accepting notifications
    #[error("The event queue is closed")]
    Closed,
}
