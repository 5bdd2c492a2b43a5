use std::sync::Arc;

use crate::{
    context::{downcast, InjectionContext},
    errors::{InjectError, RequireError},
    resolver::Resolver,
    types::{Injectable, TypeInfo},
};

impl<C: ?Sized + Injectable> Resolver for Arc<C> {
    async fn resolve(ctx: &InjectionContext) -> Result<Self, InjectError> {
        let resolved = ctx.instance(TypeInfo::of::<C>()).await?;
        Ok(downcast::<C>(&resolved)?)
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    async fn resolve(ctx: &InjectionContext) -> Result<Self, InjectError> {
        match Resolvable::resolve(ctx).await {
            Ok(resolved) => Ok(Some(resolved)),
            // If the required component is not bound at all, Option does not fail
            Err(InjectError::RequireError(RequireError::TypeMissing(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::{
        container::Container,
        declaration::{component::Component, provider::{Provider, ProviderFactory}},
        types::DynError,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Product: Send + Sync {
        fn serial(&self) -> usize;
    }
    trait Observer: Send + Sync {}

    struct Serial(usize);
    impl Product for Serial {
        fn serial(&self) -> usize {
            self.0
        }
    }

    struct ProductLine(AtomicUsize);
    impl ProviderFactory for ProductLine {
        type Component = dyn Product;

        async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Product>, DynError> {
            Ok(Arc::new(Serial(self.0.fetch_add(1, Ordering::SeqCst))))
        }
    }

    struct Broken;
    impl ProviderFactory for Broken {
        type Component = dyn Observer;

        async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Observer>, DynError> {
            Err("sensor offline".into())
        }
    }

    trait Inspection: Send + Sync {
        fn seen(&self) -> (usize, bool);
    }

    struct Seen(usize, bool);
    impl Inspection for Seen {
        fn seen(&self) -> (usize, bool) {
            (self.0, self.1)
        }
    }

    /// Resolves trait objects, plain and optional, while being constructed
    struct Inspector;
    impl ProviderFactory for Inspector {
        type Component = dyn Inspection;

        async fn construct(&self, ctx: InjectionContext) -> Result<Arc<dyn Inspection>, DynError> {
            let product = ctx.resolve::<Arc<dyn Product>>().await?;
            let observer = ctx.resolve::<Option<Arc<dyn Observer>>>().await?;
            Ok(Arc::new(Seen(product.serial(), observer.is_some())))
        }
    }

    fn ready(providers: Vec<Provider>) -> Container {
        let mut container = Container::new();
        for provider in providers {
            container.bind(provider).unwrap();
        }
        container.check_dependencies().unwrap();
        block_on(container.init_resources()).unwrap();
        container
    }

    #[test]
    fn transient_components_are_constructed_per_request() {
        let container = ready(vec![Provider::builder(ProductLine(AtomicUsize::new(1)))
            .transient()
            .build()]);

        let first = block_on(container.resolve::<Arc<dyn Product>>()).unwrap();
        let second = block_on(container.resolve::<Arc<dyn Product>>()).unwrap();

        assert_eq!((first.serial(), second.serial()), (1, 2));
        // Transient components are never cached
        assert!(matches!(
            container.require::<dyn Product>(),
            Err(RequireError::NotInitialized("ProductLine"))
        ));
    }

    #[test]
    fn failing_transient_construction_only_fails_the_request() {
        let container = ready(vec![Provider::builder(Broken).transient().build()]);

        let Err(error) = block_on(container.resolve::<Arc<dyn Observer>>()) else {
            panic!("expected the transient construction to fail");
        };
        assert!(matches!(
            error,
            InjectError::RequireError(RequireError::ConstructionFailed { product: "Broken", .. })
        ));
    }

    #[test]
    fn option_is_none_only_for_unbound_components() {
        let container = ready(vec![Provider::builder(ProductLine(AtomicUsize::new(0))).build()]);

        let observer = block_on(container.resolve::<Option<Arc<dyn Observer>>>()).unwrap();
        assert!(observer.is_none());

        let product = block_on(container.resolve::<Option<Arc<dyn Product>>>()).unwrap();
        assert_eq!(product.map(|p| p.serial()), Some(0));
        assert!(container.is_bound(&Component::of::<dyn Product>()));
    }

    #[test]
    fn constructors_resolve_trait_object_imports() {
        let container = ready(vec![
            Provider::builder(ProductLine(AtomicUsize::new(7))).build(),
            Provider::builder(Inspector)
                .import(Component::of::<dyn Product>())
                .build(),
        ]);

        let inspection = container.require::<dyn Inspection>().unwrap();
        assert_eq!(inspection.seen(), (7, false));
    }
}
