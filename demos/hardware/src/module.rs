use std::sync::Arc;

use strata_config::{ConfigModule, ConfigProvider};
use strata_di::{Component, Container, Dependent, DynError, Module, Provider};

use crate::{
    bridge::{HardwareAbstraction, HardwareAbstractionBridgeA},
    factory::{HardwareA, HardwareB, HardwareFactory, HardwareFactoryCreatorA},
    observer::{HardwareObserver, HardwareObserverA},
};

pub struct HardwareModule;
impl Module for HardwareModule {
    fn declare_components(&self) -> Vec<Component> {
        vec![
            Component::of::<dyn HardwareAbstraction>(),
            Component::of::<dyn HardwareFactory>(),
            Component::of::<dyn HardwareObserver>(),
        ]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        vec![
            Provider::builder(HardwareAbstractionBridgeA)
                .imports([
                    Component::of::<dyn HardwareFactory>(),
                    Component::of::<dyn HardwareObserver>(),
                ])
                .build(),
            Provider::builder(HardwareFactoryCreatorA)
                .imports([
                    Component::of::<dyn HardwareObserver>(),
                    ConfigModule::component(),
                ])
                .dependent(
                    Dependent::of::<HardwareA>().import(Component::of::<dyn HardwareObserver>()),
                )
                .dependent(
                    Dependent::of::<HardwareB>().import(Component::of::<dyn HardwareObserver>()),
                )
                .build(),
            Provider::builder(HardwareObserverA).build(),
        ]
    }
}

/// Root of the demo application
pub struct MainModule {
    configs: Arc<ConfigProvider>,
}

impl MainModule {
    pub fn new(configs: ConfigProvider) -> Self {
        MainModule {
            configs: Arc::new(configs),
        }
    }
}

impl Module for MainModule {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![
            Box::new(HardwareModule),
            Box::new(ConfigModule::shared(self.configs.clone())),
        ]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        Vec::new()
    }

    fn init_bootstrap(&self, container: &Container) -> Result<(), DynError> {
        let bridge = container.require::<dyn HardwareAbstraction>()?;

        tracing::info!("{}", bridge.some_operation("A")?);
        tracing::info!("{}", bridge.other_operation("B")?);

        // Unknown products only fail the single request
        if let Err(error) = bridge.some_operation("C") {
            tracing::warn!("{}", error);
        }
        Ok(())
    }
}
