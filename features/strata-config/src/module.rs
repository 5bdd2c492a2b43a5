use std::sync::Arc;

use strata_di::{Component, Module, Provider};

use crate::provider::ConfigProvider;

/// Publishes a [`ConfigProvider`] as a component
///
/// Providers importing `Component::of::<ConfigProvider>()` can resolve
/// [`crate::Config`] during construction.
pub struct ConfigModule {
    provider: Arc<ConfigProvider>,
}

impl ConfigModule {
    pub fn new(provider: ConfigProvider) -> Self {
        ConfigModule {
            provider: Arc::new(provider),
        }
    }

    /// Publishes a registry which is also used elsewhere
    pub fn shared(provider: Arc<ConfigProvider>) -> Self {
        ConfigModule { provider }
    }

    /// The component tag other providers import
    pub fn component() -> Component {
        Component::of::<ConfigProvider>()
    }
}

impl Module for ConfigModule {
    fn declare_components(&self) -> Vec<Component> {
        vec![Self::component()]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        vec![Provider::from_instance(self.provider.clone()).build()]
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use strata_di::{DynError, InjectionContext, Loader, ProviderFactory};

    use super::*;
    use crate::config::Config;

    struct SensorConfig {
        poll_interval_ms: u64,
    }

    struct Sensor {
        interval: u64,
    }

    struct SensorFactory;
    impl ProviderFactory for SensorFactory {
        type Component = Sensor;

        async fn construct(&self, ctx: InjectionContext) -> Result<Arc<Sensor>, DynError> {
            let config = ctx.resolve::<Config<SensorConfig>>().await?;
            Ok(Arc::new(Sensor {
                interval: config.poll_interval_ms,
            }))
        }
    }

    struct SensorModule {
        configured: bool,
    }
    impl Module for SensorModule {
        fn imports(&self) -> Vec<Box<dyn Module>> {
            let mut configs = ConfigProvider::new();
            if self.configured {
                configs
                    .add_config(SensorConfig {
                        poll_interval_ms: 500,
                    })
                    .unwrap();
            }
            vec![Box::new(ConfigModule::new(configs))]
        }

        fn declare_components(&self) -> Vec<Component> {
            vec![Component::of::<Sensor>()]
        }

        fn declare_providers(&self) -> Vec<Provider> {
            vec![Provider::builder(SensorFactory)
                .import(ConfigModule::component())
                .build()]
        }
    }

    #[test]
    fn configs_are_injected_into_constructors() {
        let app = block_on(Loader::new().load(SensorModule { configured: true })).unwrap();

        assert_eq!(app.module_names(), vec!["ConfigModule", "SensorModule"]);
        assert_eq!(app.require::<Sensor>().unwrap().interval, 500);
    }

    #[test]
    fn missing_configs_fail_construction() {
        let error = block_on(Loader::new().load(SensorModule { configured: false })).unwrap_err();
        assert!(error.to_string().contains("SensorConfig"));
    }
}
