use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    dispatcher::{Dispatcher, Notification},
    errors::EventError,
    DynError,
};

type Handler<E> = Arc<dyn Fn(&E) -> Result<(), DynError> + Send + Sync>;

/// Notifies subscribers of typed events
///
/// Every subscriber of the published event type gets its own notification,
/// run on the [`Dispatcher`]'s workers. Publishing never waits for delivery.
///
/// # Example
/// ```rust
/// use strata_events::{Dispatcher, EventPublisher};
///
/// struct HardwareCreated(&'static str);
///
/// let publisher = EventPublisher::new(Dispatcher::new().unwrap());
/// publisher.subscribe(|event: &HardwareCreated| {
///     println!("created {}", event.0);
///     Ok(())
/// });
///
/// assert_eq!(publisher.publish(HardwareCreated("A")).unwrap(), 1);
/// ```
pub struct EventPublisher {
    dispatcher: Dispatcher,
    /// `Vec<Handler<E>>` keyed by the TypeId of `E`
    subscribers: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let event_types = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("EventPublisher")
            .field("event_types", &event_types)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl EventPublisher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        EventPublisher {
            dispatcher,
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Registers a callback for events of type `E`
    pub fn subscribe<E: Send + Sync + 'static>(
        &self,
        callback: impl Fn(&E) -> Result<(), DynError> + Send + Sync + 'static,
    ) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let handlers = subscribers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Handler<E>>::new()));

        if let Some(handlers) = handlers.downcast_mut::<Vec<Handler<E>>>() {
            handlers.push(Arc::new(callback));
            tracing::debug!("Subscribed to '{}'", event_name::<E>());
        }
    }

    /// Number of callbacks subscribed to events of type `E`
    pub fn subscriber_count<E: Send + Sync + 'static>(&self) -> usize {
        self.handlers::<E>().len()
    }

    /// Queues one notification per subscriber of exactly type `E`
    ///
    /// Returns the number of queued notifications. Failing subscribers are only logged.
    pub fn publish<E: Send + Sync + 'static>(&self, event: E) -> Result<usize, EventError> {
        let handlers = self.handlers::<E>();
        if handlers.is_empty() {
            tracing::trace!("No subscribers for '{}'", event_name::<E>());
            return Ok(0);
        }

        let event = Arc::new(event);
        for handler in &handlers {
            let event = event.clone();
            let handler = handler.clone();
            self.dispatcher.dispatch(Notification {
                event: event_name::<E>(),
                job: Box::new(move || handler(&event)),
            })?;
        }

        tracing::trace!(
            "Published '{}' to {} subscribers",
            event_name::<E>(),
            handlers.len()
        );
        Ok(handlers.len())
    }

    fn handlers<E: Send + Sync + 'static>(&self) -> Vec<Handler<E>> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .and_then(|handlers| handlers.downcast_ref::<Vec<Handler<E>>>())
            .cloned()
            .unwrap_or_default()
    }
}

/// Last path segment of the event type, without generics
fn event_name<E>() -> &'static str {
    let full = type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
