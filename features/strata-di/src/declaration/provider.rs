use std::{any::type_name, fmt::Debug, future::Future, sync::Arc};

use futures::future::BoxFuture;

use crate::{
    context::InjectionContext,
    declaration::{component::Component, dependent::Dependent},
    errors::RequireError,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// How often a provider's component is constructed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifetime {
    /// Constructed once during resource initialization and shared afterwards
    #[default]
    Singleton,
    /// Constructed anew for every request, never cached by the container
    Transient,
}

/// A Factory constructing the implementation of a component
pub trait ProviderFactory: Send + Sync + 'static {
    /// The component this factory supplies, usually a trait object
    type Component: ?Sized + Injectable;

    /// Constructs a new instance of the component
    ///
    /// Imports can be resolved through the context, singletons of earlier layers are already live.
    fn construct(
        &self,
        ctx: InjectionContext,
    ) -> impl Future<Output = Result<Arc<Self::Component>, DynError>> + Send + '_;

    /// Releases resources held by a constructed instance
    ///
    /// Called once per singleton during teardown, in reverse construction order.
    fn release(
        &self,
        instance: Arc<Self::Component>,
    ) -> impl Future<Output = Result<(), DynError>> + Send + '_ {
        drop(instance);
        async { Ok(()) }
    }
}

/// Wrapper Trait for factories, providing type erased instances
pub(crate) trait DynFactory: Send + Sync {
    fn supplies(&self) -> TypeInfo;

    fn implementation(&self) -> TypeInfo;

    fn construct(&self, ctx: InjectionContext) -> BoxFuture<'_, Result<Instance, DynError>>;

    fn release(&self, instance: Instance) -> BoxFuture<'_, Result<(), DynError>>;
}
// Impl DynFactory for any ProviderFactory
impl<F: ProviderFactory> DynFactory for F {
    fn supplies(&self) -> TypeInfo {
        TypeInfo::of::<F::Component>()
    }

    fn implementation(&self) -> TypeInfo {
        TypeInfo::of::<F>()
    }

    fn construct(&self, ctx: InjectionContext) -> BoxFuture<'_, Result<Instance, DynError>> {
        Box::pin(async move {
            // Forward the call to the specific implementation
            ProviderFactory::construct(self, ctx)
                .await
                .map(Instance::new::<F::Component>)
        })
    }

    fn release(&self, instance: Instance) -> BoxFuture<'_, Result<(), DynError>> {
        Box::pin(async move {
            let component = instance.downcast::<F::Component>().map_err(|actual_type| {
                RequireError::DowncastFailed {
                    required_type: type_name::<F::Component>(),
                    actual_type,
                }
            })?;
            drop(instance);

            ProviderFactory::release(self, component).await
        })
    }
}

/// Supplies an instance which was built outside of the container
pub struct ExistingInstance<C: ?Sized + Injectable>(Arc<C>);
impl<C: ?Sized + Injectable> ProviderFactory for ExistingInstance<C> {
    type Component = C;

    async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<C>, DynError> {
        Ok(self.0.clone())
    }
}

/// Declaration binding one implementation to a component
///
/// Providers are immutable once built, see [`ProviderBuilder`].
#[derive(Clone)]
pub struct Provider {
    name: &'static str,
    component: Component,
    implementation: TypeInfo,
    imports: Vec<Component>,
    dependents: Vec<Dependent>,
    conforms_to: Vec<TypeInfo>,
    lifetime: Lifetime,
    pub(crate) factory: Arc<dyn DynFactory>,
}

impl Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("component", &self.component.name())
            .field(
                "imports",
                &self.imports.iter().map(Component::name).collect::<Vec<_>>(),
            )
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Provider {
    /// Starts declaring a provider backed by the given factory
    pub fn builder<F: ProviderFactory>(factory: F) -> ProviderBuilder {
        let implementation = TypeInfo::of::<F>();
        ProviderBuilder {
            name: implementation.short_name(),
            component: Component::of::<F::Component>(),
            implementation,
            imports: Vec::new(),
            dependents: Vec::new(),
            conforms_to: Vec::new(),
            lifetime: Lifetime::Singleton,
            factory: Arc::new(factory),
        }
    }

    /// Starts declaring a provider for an instance that already exists
    pub fn from_instance<C: ?Sized + Injectable>(instance: Arc<C>) -> ProviderBuilder {
        Provider::builder(ExistingInstance(instance)).name(TypeInfo::of::<C>().short_name())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn component(&self) -> Component {
        self.component
    }

    /// The factory type which implements the component
    pub fn implementation(&self) -> TypeInfo {
        self.implementation
    }

    pub fn imports(&self) -> &[Component] {
        &self.imports
    }

    pub fn dependents(&self) -> &[Dependent] {
        &self.dependents
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Replaces the component with an equal one, e.g. to adopt its declared name
    pub(crate) fn with_component(mut self, component: Component) -> Self {
        if component == self.component {
            self.component = component;
        }
        self
    }

    /// Whether this provider's product conforms to the given capability
    ///
    /// A provider conforms to its own component and every capability declared with
    /// [`ProviderBuilder::implements`].
    pub fn satisfies(&self, capability: &TypeInfo) -> bool {
        self.component.capability() == *capability || self.conforms_to.contains(capability)
    }
}

/// Builder for [`Provider`] declarations
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use strata_di::{Component, DynError, InjectionContext, Provider, ProviderFactory};
///
/// pub trait Observer: Send + Sync {}
/// pub trait Factory: Send + Sync {}
///
/// struct FactoryCreator;
/// struct SimpleFactory;
/// impl Factory for SimpleFactory {}
///
/// impl ProviderFactory for FactoryCreator {
///     type Component = dyn Factory;
///
///     async fn construct(&self, ctx: InjectionContext) -> Result<Arc<dyn Factory>, DynError> {
///         let _observer = ctx.resolve::<Arc<dyn Observer>>().await?;
///         Ok(Arc::new(SimpleFactory))
///     }
/// }
///
/// let provider = Provider::builder(FactoryCreator)
///     .import(Component::of::<dyn Observer>())
///     .build();
/// assert_eq!(provider.name(), "FactoryCreator");
/// assert_eq!(provider.component(), Component::of::<dyn Factory>());
/// ```
pub struct ProviderBuilder {
    name: &'static str,
    component: Component,
    implementation: TypeInfo,
    imports: Vec<Component>,
    dependents: Vec<Dependent>,
    conforms_to: Vec<TypeInfo>,
    lifetime: Lifetime,
    factory: Arc<dyn DynFactory>,
}

impl ProviderBuilder {
    /// Overrides the diagnostic name, defaults to the factory's type name
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Uses the declared component, keeping its name for diagnostics
    ///
    /// The capability must match the factory's, otherwise the declaration is ignored.
    pub fn component(mut self, component: Component) -> Self {
        if component == self.component {
            self.component = component;
        } else {
            tracing::warn!(
                "Provider '{}' supplies '{}', ignoring declared component '{}'",
                self.name,
                self.component.capability(),
                component.capability()
            );
        }
        self
    }

    /// Adds a component which must be bound before this provider is constructed
    pub fn import(mut self, component: Component) -> Self {
        if !self.imports.contains(&component) {
            self.imports.push(component);
        }
        self
    }

    pub fn imports(self, components: impl IntoIterator<Item = Component>) -> Self {
        components.into_iter().fold(self, Self::import)
    }

    /// Adds a concrete type this provider constructs internally
    pub fn dependent(mut self, dependent: Dependent) -> Self {
        self.dependents.push(dependent);
        self
    }

    /// Declares that the product also conforms to capability `C`
    pub fn implements<C: ?Sized + Injectable>(mut self) -> Self {
        self.conforms_to.push(TypeInfo::of::<C>());
        self
    }

    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn transient(self) -> Self {
        self.lifetime(Lifetime::Transient)
    }

    pub fn build(self) -> Provider {
        Provider {
            name: self.name,
            component: self.component,
            implementation: self.implementation,
            imports: self.imports,
            dependents: self.dependents,
            conforms_to: self.conforms_to,
            lifetime: self.lifetime,
            factory: self.factory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Factory: Send + Sync {}
    trait Observer: Send + Sync {}
    trait Publisher: Send + Sync {}

    struct Publishing;
    impl Observer for Publishing {}

    struct ObserverPublisher;
    impl ProviderFactory for ObserverPublisher {
        type Component = dyn Observer;

        async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Observer>, DynError> {
            Ok(Arc::new(Publishing))
        }
    }

    #[test]
    fn builder_defaults_from_factory_type() {
        let provider = Provider::builder(ObserverPublisher).build();

        assert_eq!(provider.name(), "ObserverPublisher");
        assert_eq!(provider.component(), Component::of::<dyn Observer>());
        assert_eq!(provider.implementation(), TypeInfo::of::<ObserverPublisher>());
        assert_eq!(provider.lifetime(), Lifetime::Singleton);
        assert!(provider.imports().is_empty());
    }

    #[test]
    fn imports_are_deduplicated_in_declaration_order() {
        let provider = Provider::builder(ObserverPublisher)
            .import(Component::of::<dyn Factory>())
            .imports([
                Component::of::<dyn Publisher>(),
                Component::of::<dyn Factory>(),
            ])
            .build();

        assert_eq!(
            provider.imports(),
            &[Component::of::<dyn Factory>(), Component::of::<dyn Publisher>()]
        );
    }

    #[test]
    fn satisfies_own_component_and_declared_capabilities() {
        let plain = Provider::builder(ObserverPublisher).build();
        assert!(plain.satisfies(&TypeInfo::of::<dyn Observer>()));
        assert!(!plain.satisfies(&TypeInfo::of::<dyn Publisher>()));

        let conforming = Provider::builder(ObserverPublisher)
            .implements::<dyn Publisher>()
            .build();
        assert!(conforming.satisfies(&TypeInfo::of::<dyn Publisher>()));
    }

    #[test]
    fn declared_component_must_match_the_factory() {
        let renamed = Provider::builder(ObserverPublisher)
            .component(Component::named::<dyn Observer>("EventSink"))
            .build();
        assert_eq!(renamed.component().name(), "EventSink");

        let mismatched = Provider::builder(ObserverPublisher)
            .component(Component::of::<dyn Factory>())
            .build();
        assert_eq!(mismatched.component(), Component::of::<dyn Observer>());
    }

    #[test]
    fn existing_instances_are_named_after_their_type() {
        let provider = Provider::from_instance::<String>(Arc::new("cfg".to_string())).build();
        assert_eq!(provider.name(), "String");
        assert_eq!(provider.component(), Component::of::<String>());
    }
}
