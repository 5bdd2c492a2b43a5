//! Strata DI resolves a set of provider declarations into construction layers and
//! manages the lifecycle of the components they supply.
//!
//! Strata DI is split into three major parts:
//! 1. Declarations: Components, the providers implementing them and the modules grouping both
//! 2. Resolution: Ordering all providers into layers, every layer only importing earlier ones
//! 3. Lifecycle: A container binding the layers, constructing singletons and releasing them again
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_di::{Component, DynError, InjectionContext, Loader, Module, Provider, ProviderFactory};
//!
//! pub trait Observer: Send + Sync {
//!     fn notify(&self, msg: &str) -> String;
//! }
//! pub trait Factory: Send + Sync {
//!     fn create(&self) -> String;
//! }
//!
//! struct Printing;
//! impl Observer for Printing {
//!     fn notify(&self, msg: &str) -> String {
//!         format!("observed: {msg}")
//!     }
//! }
//!
//! struct Creating(Arc<dyn Observer>);
//! impl Factory for Creating {
//!     fn create(&self) -> String {
//!         self.0.notify("created")
//!     }
//! }
//!
//! struct ObserverPublisher;
//! impl ProviderFactory for ObserverPublisher {
//!     type Component = dyn Observer;
//!
//!     async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Observer>, DynError> {
//!         Ok(Arc::new(Printing))
//!     }
//! }
//!
//! struct FactoryCreator;
//! impl ProviderFactory for FactoryCreator {
//!     type Component = dyn Factory;
//!
//!     async fn construct(&self, ctx: InjectionContext) -> Result<Arc<dyn Factory>, DynError> {
//!         Ok(Arc::new(Creating(ctx.resolve().await?)))
//!     }
//! }
//!
//! struct AppModule;
//! impl Module for AppModule {
//!     fn declare_components(&self) -> Vec<Component> {
//!         vec![Component::of::<dyn Observer>(), Component::of::<dyn Factory>()]
//!     }
//!
//!     fn declare_providers(&self) -> Vec<Provider> {
//!         vec![
//!             Provider::builder(FactoryCreator)
//!                 .import(Component::of::<dyn Observer>())
//!                 .build(),
//!             Provider::builder(ObserverPublisher).build(),
//!         ]
//!     }
//! }
//!
//! futures::executor::block_on(async {
//!     let app = Loader::new().load(AppModule).await.unwrap();
//!     let factory = app.require::<dyn Factory>().unwrap();
//!     assert_eq!(factory.create(), "observed: created");
//!     app.shutdown().await.unwrap();
//! });
//! ```

pub mod container;
pub mod context;
pub mod declaration;
pub mod errors;
pub mod graph;
pub mod loader;
pub mod module;
pub mod resolver;
pub mod types;

pub use container::{Container, ContainerOptions, ContainerState};
pub use context::InjectionContext;
pub use declaration::{
    component::Component,
    dependent::Dependent,
    provider::{ExistingInstance, Lifetime, Provider, ProviderBuilder, ProviderFactory},
};
pub use errors::*;
pub use graph::{resolve_layers, Layer};
pub use loader::{Application, Loader};
pub use module::{Module, ModuleGraph};
pub use resolver::Resolver;
pub use types::{DynError, Injectable, Instance, TypeInfo};
