use std::sync::Arc;

use crate::{
    container::{Container, ContainerOptions, ContainerState},
    errors::{InjectError, LoadError, RequireError, TeardownError},
    graph::resolve_layers,
    module::{Module, ModuleGraph},
    resolver::Resolver,
    types::Injectable,
};

// Loading an application happens in three parts.
// 1. All modules reachable from the root are collected and their declarations checked
// 2. The providers are resolved into layers and bound into a fresh container
// 3. The container is validated, its resources initialized and every module bootstrapped

/// Loads an [`Application`] from its root module
///
/// # Example
/// ```rust
/// use strata_di::{Loader, Module, Provider};
///
/// struct EmptyModule;
/// impl Module for EmptyModule {
///     fn declare_providers(&self) -> Vec<Provider> {
///         Vec::new()
///     }
/// }
///
/// let app = futures::executor::block_on(Loader::new().load(EmptyModule)).unwrap();
/// assert_eq!(app.module_names(), vec!["EmptyModule"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: ContainerOptions,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Loader { options }
    }

    /// Construct a layer's singletons concurrently, enabled by default
    pub fn concurrent_layers(mut self, enabled: bool) -> Self {
        self.options.concurrent_layers = enabled;
        self
    }

    /// Fail if a dependent's imports can not be satisfied, instead of warning
    pub fn strict_dependents(mut self, enabled: bool) -> Self {
        self.options.strict_dependents = enabled;
        self
    }

    pub async fn load<M: Module>(&self, root: M) -> Result<Application, LoadError> {
        let graph = ModuleGraph::collect(Box::new(root))?;
        let providers = graph.providers()?;

        tracing::info!(
            modules = graph.len(),
            providers = providers.len(),
            "Resolving dependencies"
        );

        let layers = resolve_layers(providers)?;
        for layer in &layers {
            tracing::info!(providers = layer.len(), "Layer {}: {}", layer.index(), layer);
        }

        let mut container = Container::with_options(self.options.clone());
        for layer in layers {
            container.bind_layer(layer)?;
        }

        container.check_dependencies()?;
        container.init_resources().await?;

        for module in graph.modules() {
            tracing::debug!("Bootstrapping module '{}'", module.name());

            if let Err(error) = module.init_bootstrap(&container) {
                tracing::error!("Bootstrap of '{}' failed: {}", module.name(), error);
                let error = container.fail(LoadError::Bootstrap {
                    module: module.name(),
                    error: Arc::new(error),
                });
                if let Err(teardown) = container.teardown().await {
                    tracing::error!("{}", teardown);
                }
                return Err(error);
            }
        }
        container.mark_bootstrapped()?;

        tracing::info!("Dependencies resolved and injected");
        Ok(Application {
            container,
            modules: graph,
        })
    }
}

/// A fully bootstrapped set of modules and the container owning their components
pub struct Application {
    container: Container,
    modules: ModuleGraph,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("modules", &self.modules.names())
            .field("container", &self.container)
            .finish()
    }
}

impl Application {
    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn state(&self) -> ContainerState {
        self.container.state()
    }

    /// Loaded modules, in bootstrap order
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.names()
    }

    /// Returns a constructed singleton
    pub fn require<C: ?Sized + Injectable>(&self) -> Result<Arc<C>, RequireError> {
        self.container.require::<C>()
    }

    pub async fn resolve<T: Resolver>(&self) -> Result<T, InjectError> {
        self.container.resolve::<T>().await
    }

    /// Releases every resource in reverse initialization order
    pub async fn shutdown(mut self) -> Result<(), TeardownError> {
        tracing::info!("Shutting down");
        self.container.teardown().await
    }
}
