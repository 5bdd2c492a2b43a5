use std::sync::Arc;

use strata_config::Config;
use strata_di::{DynError, InjectionContext, ProviderFactory, UnknownVariantError};

use crate::{
    config::HardwareConfig,
    observer::{HardwareCreated, HardwareObserver},
};

pub trait Hardware: Send + Sync {
    fn do_stuff(&self, operation: &str) -> String;
}

pub struct HardwareA {
    site: String,
}
impl Hardware for HardwareA {
    fn do_stuff(&self, operation: &str) -> String {
        format!("HardwareA at {} performed {}", self.site, operation)
    }
}

pub struct HardwareB {
    site: String,
}
impl Hardware for HardwareB {
    fn do_stuff(&self, operation: &str) -> String {
        format!("HardwareB at {} performed {}", self.site, operation)
    }
}

/// Creates hardware products by variant name
pub trait HardwareFactory: Send + Sync {
    fn create_hardware(&self, product: &str) -> Result<Box<dyn Hardware>, UnknownVariantError>;
}

pub struct CreatorA {
    site: String,
    observer: Arc<dyn HardwareObserver>,
}

impl HardwareFactory for CreatorA {
    fn create_hardware(&self, product: &str) -> Result<Box<dyn Hardware>, UnknownVariantError> {
        let site = self.site.clone();
        let hardware: Box<dyn Hardware> = match product {
            "A" => Box::new(HardwareA { site }),
            "B" => Box::new(HardwareB { site }),
            _ => {
                return Err(UnknownVariantError {
                    factory: "HardwareFactoryCreatorA",
                    requested: product.to_string(),
                })
            }
        };

        self.observer.update_created(HardwareCreated {
            product: product.to_string(),
        });
        Ok(hardware)
    }
}

pub struct HardwareFactoryCreatorA;
impl ProviderFactory for HardwareFactoryCreatorA {
    type Component = dyn HardwareFactory;

    async fn construct(&self, ctx: InjectionContext) -> Result<Arc<dyn HardwareFactory>, DynError> {
        let observer = ctx.resolve::<Arc<dyn HardwareObserver>>().await?;
        let config = ctx.resolve::<Config<HardwareConfig>>().await?;

        Ok(Arc::new(CreatorA {
            site: config.site.clone(),
            observer,
        }))
    }
}
