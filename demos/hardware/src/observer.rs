use std::sync::Arc;

use strata_di::{DynError, InjectionContext, ProviderFactory};
use strata_events::{Dispatcher, EventPublisher};

#[derive(Debug, Clone)]
pub struct HardwareCreated {
    pub product: String,
}

#[derive(Debug, Clone)]
pub struct HardwareOperation {
    pub product: String,
    pub operation: String,
}

/// Broadcasts what happens to the hardware
pub trait HardwareObserver: Send + Sync {
    fn update_created(&self, event: HardwareCreated);

    fn update_operation(&self, event: HardwareOperation);

    /// Publisher to subscribe further listeners to
    fn publisher(&self) -> &EventPublisher;
}

pub struct PublishingObserver {
    publisher: EventPublisher,
}

impl PublishingObserver {
    pub fn new(dispatcher: Dispatcher) -> Self {
        let publisher = EventPublisher::new(dispatcher);

        publisher.subscribe(|event: &HardwareCreated| {
            tracing::info!(product = %event.product, "Hardware created");
            Ok(())
        });
        publisher.subscribe(|event: &HardwareOperation| {
            tracing::info!(
                product = %event.product,
                operation = %event.operation,
                "Hardware operation"
            );
            Ok(())
        });

        PublishingObserver { publisher }
    }

    fn notify<E: Send + Sync + 'static>(&self, event: E) {
        if let Err(error) = self.publisher.publish(event) {
            tracing::warn!("Dropped hardware event: {}", error);
        }
    }
}

impl HardwareObserver for PublishingObserver {
    fn update_created(&self, event: HardwareCreated) {
        self.notify(event);
    }

    fn update_operation(&self, event: HardwareOperation) {
        self.notify(event);
    }

    fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }
}

pub struct HardwareObserverA;
impl ProviderFactory for HardwareObserverA {
    type Component = dyn HardwareObserver;

    async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn HardwareObserver>, DynError> {
        let dispatcher = Dispatcher::with_workers(2)?;
        Ok(Arc::new(PublishingObserver::new(dispatcher)))
    }

    async fn release(&self, instance: Arc<dyn HardwareObserver>) -> Result<(), DynError> {
        instance.publisher().dispatcher().close();
        Ok(())
    }
}
