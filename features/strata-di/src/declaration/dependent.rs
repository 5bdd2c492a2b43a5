use crate::{
    declaration::{component::Component, provider::Provider},
    errors::UnresolvedImportError,
    types::TypeInfo,
};

/// A concrete type a provider constructs internally, e.g. a factory's products
///
/// Dependents are never injected themselves, their imports are only checked for
/// compatibility with the selected provider set.
#[derive(Debug, Clone)]
pub struct Dependent {
    info: TypeInfo,
    imports: Vec<Component>,
}

impl Dependent {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Dependent {
            info: TypeInfo::of::<T>(),
            imports: Vec::new(),
        }
    }

    /// Adds a capability the dependent requires when it is constructed
    pub fn import(mut self, component: Component) -> Self {
        self.imports.push(component);
        self
    }

    pub fn name(&self) -> &'static str {
        self.info.short_name()
    }

    pub fn imports(&self) -> &[Component] {
        &self.imports
    }

    /// Returns the names of all imports no candidate provider conforms to
    ///
    /// An empty list means the dependent can be constructed with these providers.
    pub fn resolve<'a>(&self, providers: impl IntoIterator<Item = &'a Provider>) -> Vec<String> {
        self.unresolved(providers)
            .into_iter()
            .map(|unresolved| unresolved.component.to_string())
            .collect()
    }

    /// Same check as [`Dependent::resolve`], keeping the full diagnostic
    pub fn unresolved<'a>(
        &self,
        providers: impl IntoIterator<Item = &'a Provider>,
    ) -> Vec<UnresolvedImportError> {
        let providers: Vec<&Provider> = providers.into_iter().collect();

        self.imports
            .iter()
            .filter(|component| {
                !providers
                    .iter()
                    .any(|provider| provider.satisfies(&component.capability()))
            })
            .map(|component| UnresolvedImportError {
                dependent: self.name(),
                component: *component,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{context::InjectionContext, declaration::provider::ProviderFactory, types::DynError};

    trait Observer: Send + Sync {}
    trait Publisher: Send + Sync {}
    trait Reporter: Send + Sync {}

    struct ProductB;

    struct Publishing;
    impl Observer for Publishing {}
    impl Publisher for Publishing {}

    struct ObserverPublisher;
    impl ProviderFactory for ObserverPublisher {
        type Component = dyn Observer;

        async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Observer>, DynError> {
            Ok(Arc::new(Publishing))
        }
    }

    #[test]
    fn satisfied_dependent_reports_nothing() {
        let providers = [Provider::builder(ObserverPublisher).build()];
        let dependent = Dependent::of::<ProductB>().import(Component::of::<dyn Observer>());

        assert!(dependent.resolve(&providers).is_empty());
    }

    #[test]
    fn reports_every_unmet_import_by_name() {
        let providers = [Provider::builder(ObserverPublisher).build()];
        let dependent = Dependent::of::<ProductB>()
            .import(Component::of::<dyn Reporter>())
            .import(Component::of::<dyn Observer>())
            .import(Component::of::<dyn Publisher>());

        assert_eq!(dependent.resolve(&providers), vec!["Reporter", "Publisher"]);

        let unresolved = dependent.unresolved(&providers);
        assert_eq!(unresolved[0].dependent, "ProductB");
        assert_eq!(unresolved[0].component, Component::of::<dyn Reporter>());
    }

    #[test]
    fn declared_conformance_satisfies_other_capabilities() {
        let providers = [Provider::builder(ObserverPublisher)
            .implements::<dyn Publisher>()
            .build()];
        let dependent = Dependent::of::<ProductB>().import(Component::of::<dyn Publisher>());

        assert!(dependent.resolve(&providers).is_empty());
    }

    #[test]
    fn no_candidates_means_everything_is_unmet() {
        let dependent = Dependent::of::<ProductB>().import(Component::of::<dyn Observer>());
        let none: [Provider; 0] = [];
        assert_eq!(dependent.resolve(&none), vec!["Observer"]);
    }
}
