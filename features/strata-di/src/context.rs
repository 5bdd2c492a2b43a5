use std::{any::type_name, future::Future, sync::Arc};

use crate::{
    container::{BindingTable, Binding},
    declaration::{component::Component, provider::Lifetime},
    errors::{InjectError, RequireError},
    resolver::Resolver,
    types::{Injectable, Instance, TypeInfo},
};

/// Handle for resolving bound components
///
/// Handed to every constructor during resource initialization, and used by the
/// container itself to serve requests afterwards.
#[derive(Clone)]
pub struct InjectionContext {
    table: Arc<BindingTable>,
    requester: &'static str,
    /// Declared imports of the requesting provider, `None` when requested from outside
    imports: Option<Arc<[Component]>>,
}

impl InjectionContext {
    pub(crate) fn new(table: Arc<BindingTable>) -> Self {
        InjectionContext {
            table,
            requester: "container",
            imports: None,
        }
    }

    pub(crate) fn for_provider(
        table: Arc<BindingTable>,
        requester: &'static str,
        imports: &[Component],
    ) -> Self {
        InjectionContext {
            table,
            requester,
            imports: Some(imports.into()),
        }
    }

    /// Resolves anything implementing [`Resolver`], e.g. `Arc<dyn Observer>`
    pub fn resolve<T: Resolver>(&self) -> impl Future<Output = Result<T, InjectError>> + Send + '_ {
        async move { T::resolve(self).await }
    }

    /// Returns an already constructed singleton
    pub fn require<C: ?Sized + Injectable>(&self) -> Result<Arc<C>, RequireError> {
        let binding = self.lookup(TypeInfo::of::<C>())?;
        let instance = binding
            .instance()
            .ok_or(RequireError::NotInitialized(binding.provider.name()))?;

        downcast(&instance)
    }

    /// Returns the instance for the component, constructing transient ones
    pub(crate) async fn instance(&self, info: TypeInfo) -> Result<Instance, RequireError> {
        let binding = self.lookup(info)?;

        match binding.provider.lifetime() {
            Lifetime::Singleton => binding
                .instance()
                .ok_or(RequireError::NotInitialized(binding.provider.name())),
            Lifetime::Transient => {
                let provider = &binding.provider;
                let ctx = InjectionContext::for_provider(
                    self.table.clone(),
                    provider.name(),
                    provider.imports(),
                );

                tracing::trace!("Constructing transient '{}' for '{}'", provider, self.requester);
                provider
                    .factory
                    .construct(ctx)
                    .await
                    .map_err(|error| RequireError::ConstructionFailed {
                        product: provider.name(),
                        error: Arc::new(error),
                    })
            }
        }
    }

    fn lookup(&self, info: TypeInfo) -> Result<&Arc<Binding>, RequireError> {
        let binding = self
            .table
            .get(&info.type_id)
            .ok_or(RequireError::TypeMissing(info.type_name))?;

        if let Some(imports) = &self.imports {
            if !imports.iter().any(|import| import.id() == info.type_id) {
                tracing::warn!(
                    "'{}' resolved '{}' without importing it, its construction order is not guaranteed",
                    self.requester,
                    binding.provider.component()
                );
            }
        }

        Ok(binding)
    }
}

pub(crate) fn downcast<C: ?Sized + Injectable>(instance: &Instance) -> Result<Arc<C>, RequireError> {
    instance
        .downcast::<C>()
        .map_err(|actual_type| RequireError::DowncastFailed {
            required_type: type_name::<C>(),
            actual_type,
        })
}
