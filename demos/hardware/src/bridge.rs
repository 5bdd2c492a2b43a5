use std::sync::Arc;

use strata_di::{DynError, InjectionContext, ProviderFactory};

use crate::{
    factory::HardwareFactory,
    observer::{HardwareObserver, HardwareOperation},
};

/// Runs operations on hardware without knowing how it is created
pub trait HardwareAbstraction: Send + Sync {
    fn some_operation(&self, product: &str) -> Result<String, DynError>;

    fn other_operation(&self, product: &str) -> Result<String, DynError>;
}

pub struct BridgeA {
    factory: Arc<dyn HardwareFactory>,
    observer: Arc<dyn HardwareObserver>,
}

impl BridgeA {
    fn operate(&self, product: &str, operation: &str) -> Result<String, DynError> {
        let hardware = self.factory.create_hardware(product)?;
        let report = hardware.do_stuff(operation);

        self.observer.update_operation(HardwareOperation {
            product: product.to_string(),
            operation: operation.to_string(),
        });
        Ok(report)
    }
}

impl HardwareAbstraction for BridgeA {
    fn some_operation(&self, product: &str) -> Result<String, DynError> {
        self.operate(product, "someOperation")
    }

    fn other_operation(&self, product: &str) -> Result<String, DynError> {
        self.operate(product, "otherOperation")
    }
}

pub struct HardwareAbstractionBridgeA;
impl ProviderFactory for HardwareAbstractionBridgeA {
    type Component = dyn HardwareAbstraction;

    async fn construct(
        &self,
        ctx: InjectionContext,
    ) -> Result<Arc<dyn HardwareAbstraction>, DynError> {
        Ok(Arc::new(BridgeA {
            factory: ctx.resolve().await?,
            observer: ctx.resolve().await?,
        }))
    }
}
