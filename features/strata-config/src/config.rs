use std::{ops::Deref, sync::Arc};

use strata_di::{InjectError, InjectionContext, Resolver};

use crate::provider::ConfigProvider;

/// A wrapper type to allow for config injections
///
/// This provides a simple way to retrieve configs from the config registry,
/// and inject them on a factory as a dependency. The factory has to import
/// the [`ConfigProvider`] component.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use strata_config::{Config, ConfigProvider};
/// use strata_di::{DynError, InjectionContext, ProviderFactory};
///
/// pub struct SensorConfig {
///     pub poll_interval_ms: u64,
/// }
///
/// pub struct Sensor {
///     interval: u64,
/// }
///
/// struct SensorFactory;
/// impl ProviderFactory for SensorFactory {
///     type Component = Sensor;
///
///     async fn construct(&self, ctx: InjectionContext) -> Result<Arc<Sensor>, DynError> {
///         let config = ctx.resolve::<Config<SensorConfig>>().await?;
///         Ok(Arc::new(Sensor {
///             interval: config.poll_interval_ms,
///         }))
///     }
/// }
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Send + Sync + 'static> Resolver for Config<T> {
    async fn resolve(ctx: &InjectionContext) -> Result<Self, InjectError> {
        let config_provider = ctx.resolve::<Arc<ConfigProvider>>().await?;

        let config: Arc<T> = config_provider
            .get()
            .map_err(|e| InjectError::Other(Box::new(e)))?;

        Ok(Config { inner: config })
    }
}
