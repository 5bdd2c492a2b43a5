use std::{
    any::TypeId,
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, PoisonError, RwLock},
};

use futures::future::join_all;

use crate::{
    context::{downcast, InjectionContext},
    declaration::{
        component::Component,
        provider::{Lifetime, Provider},
    },
    errors::{
        ContainerError, DuplicateBindingError, InjectError, MissingDependencyError, MissingImport,
        ReleaseFailure, RequireError, TeardownError, UnresolvedDependentsError,
    },
    graph::Layer,
    resolver::Resolver,
    types::{DynError, Injectable, Instance, TypeInfo},
};

pub(crate) type BindingTable = HashMap<TypeId, Arc<Binding>>;

/// A provider bound to its component, plus the singleton once constructed
pub(crate) struct Binding {
    pub(crate) provider: Provider,
    slot: RwLock<Option<Instance>>,
}

impl Binding {
    fn new(provider: Provider) -> Self {
        Binding {
            provider,
            slot: RwLock::new(None),
        }
    }

    pub(crate) fn instance(&self) -> Option<Instance> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, instance: Instance) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(instance);
    }

    fn take(&self) -> Option<Instance> {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Lifecycle of a [`Container`]
///
/// `Empty -> Populated -> Validated -> ResourcesReady -> Bootstrapped`, any unrecoverable
/// error moves the container to `Failed`, a teardown from any other state to `TornDown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Empty,
    Populated,
    Validated,
    ResourcesReady,
    Bootstrapped,
    Failed,
    TornDown,
}

/// Behaviour of the container lifecycle
#[derive(Debug, Clone)]
pub struct ContainerOptions {
    /// Construct all singletons of a layer concurrently instead of one after another
    pub concurrent_layers: bool,
    /// Fail validation if a dependent's imports are not satisfied, instead of warning
    pub strict_dependents: bool,
}
impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            concurrent_layers: true,
            strict_dependents: false,
        }
    }
}

/// Runtime registry owning all bound providers and their instances
///
/// Bindings are added layer by layer, then validated, then all singletons are
/// constructed in binding order. Consumers only ever receive `Arc` handles.
pub struct Container {
    state: ContainerState,
    options: ContainerOptions,
    table: Arc<BindingTable>,
    /// Bound components, grouped by the layer they were bound in
    groups: Vec<Vec<TypeId>>,
    /// Constructed singletons, in construction order
    initialized: Vec<TypeId>,
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Container");
        map.field("state", &self.state);
        for binding in self.bindings() {
            let val = match (binding.provider.lifetime(), binding.instance().is_some()) {
                (Lifetime::Transient, _) => "transient",
                (Lifetime::Singleton, true) => "initialized",
                (Lifetime::Singleton, false) => "bound",
            };
            map.field(binding.provider.name(), &val);
        }
        map.finish()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Container {
            state: ContainerState::Empty,
            options,
            table: Arc::new(HashMap::new()),
            groups: Vec::new(),
            initialized: Vec::new(),
        }
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Whether the component has a binding
    pub fn is_bound(&self, component: &Component) -> bool {
        self.table.contains_key(&component.id())
    }

    /// Names of all bound providers, in binding order
    pub fn bound_providers(&self) -> Vec<&'static str> {
        self.bindings().map(|binding| binding.provider.name()).collect()
    }

    /// Names of all constructed singletons, in construction order
    pub fn initialized_providers(&self) -> Vec<&'static str> {
        self.initialized
            .iter()
            .filter_map(|type_id| self.table.get(type_id))
            .map(|binding| binding.provider.name())
            .collect()
    }

    /// Binds the provider to its component
    ///
    /// Fails if the component already has a binding, there is no override.
    pub fn bind(&mut self, provider: Provider) -> Result<(), ContainerError> {
        self.bind_group(vec![provider])
    }

    /// Binds an instance which was built outside of the container
    pub fn bind_instance<C: ?Sized + Injectable>(
        &mut self,
        instance: Arc<C>,
    ) -> Result<(), ContainerError> {
        self.bind(Provider::from_instance(instance).build())
    }

    /// Binds all providers of a resolved layer
    ///
    /// Singletons of one layer are initialized together, after all previously bound layers.
    pub fn bind_layer(&mut self, layer: Layer) -> Result<(), ContainerError> {
        self.bind_group(layer.into_providers())
    }

    fn bind_group(&mut self, providers: Vec<Provider>) -> Result<(), ContainerError> {
        self.expect_state("bind", &[ContainerState::Empty, ContainerState::Populated])?;

        let mut group = Vec::with_capacity(providers.len());
        for provider in providers {
            let component = provider.component();

            if let Some(existing) = self.table.get(&component.id()) {
                let error = DuplicateBindingError {
                    component,
                    bound: existing.provider.name(),
                    rejected: provider.name(),
                };
                return Err(self.fail(error.into()));
            }

            tracing::debug!("Binding '{}' to '{}'", provider, component);
            group.push(component.id());
            Arc::make_mut(&mut self.table).insert(component.id(), Arc::new(Binding::new(provider)));
        }

        self.groups.push(group);
        self.transition(ContainerState::Populated);
        Ok(())
    }

    /// Verifies every import of every bound provider is bound itself
    ///
    /// Reports all missing imports at once. Dependents of the bound providers are checked
    /// against the bound set too, failing only with [`ContainerOptions::strict_dependents`].
    pub fn check_dependencies(&mut self) -> Result<(), ContainerError> {
        if self.state == ContainerState::Validated {
            return Ok(());
        }
        self.expect_state(
            "check dependencies",
            &[ContainerState::Empty, ContainerState::Populated],
        )?;

        let missing: Vec<MissingImport> = self
            .bindings()
            .flat_map(|binding| {
                binding
                    .provider
                    .imports()
                    .iter()
                    .filter(|import| !self.table.contains_key(&import.id()))
                    .map(|import| MissingImport {
                        provider: binding.provider.name(),
                        component: *import,
                    })
            })
            .collect();

        if !missing.is_empty() {
            return Err(self.fail(MissingDependencyError { missing }.into()));
        }

        let providers: Vec<&Provider> = self.bindings().map(|binding| &binding.provider).collect();
        let unresolved: Vec<_> = providers
            .iter()
            .copied()
            .flat_map(|provider| provider.dependents())
            .flat_map(|dependent| dependent.unresolved(providers.iter().copied()))
            .collect();

        if !unresolved.is_empty() {
            if self.options.strict_dependents {
                return Err(self.fail(UnresolvedDependentsError { unresolved }.into()));
            }
            for issue in &unresolved {
                tracing::warn!("{}", issue);
            }
        }

        self.transition(ContainerState::Validated);
        Ok(())
    }

    /// Constructs every singleton not constructed yet, layer by layer
    ///
    /// Calling this again after success does nothing. If any constructor fails, all
    /// resources initialized so far are released in reverse order and the container fails.
    pub async fn init_resources(&mut self) -> Result<(), ContainerError> {
        if matches!(
            self.state,
            ContainerState::ResourcesReady | ContainerState::Bootstrapped
        ) {
            return Ok(());
        }
        self.expect_state("initialize resources", &[ContainerState::Validated])?;

        let total: usize = self.groups.iter().map(Vec::len).sum();
        tracing::debug!(
            "Initializing resources of {} bindings in {} layers",
            total,
            self.groups.len()
        );

        for group in self.groups.clone() {
            let pending: Vec<Arc<Binding>> = group
                .iter()
                .filter_map(|type_id| self.table.get(type_id))
                .filter(|binding| {
                    binding.provider.lifetime() == Lifetime::Singleton
                        && binding.instance().is_none()
                })
                .cloned()
                .collect();

            let results = if self.options.concurrent_layers {
                join_all(pending.iter().map(|binding| self.construct(binding))).await
            } else {
                let mut results = Vec::with_capacity(pending.len());
                for binding in &pending {
                    results.push(self.construct(binding).await);
                }
                results
            };

            let mut failure = None;
            for (binding, result) in pending.iter().zip(results) {
                match result {
                    Ok(instance) => {
                        tracing::debug!("Constructed instance of '{}'", binding.provider);
                        binding.store(instance);
                        self.initialized.push(binding.provider.component().id());
                    }
                    Err(error) => {
                        tracing::error!("Failed to construct '{}': {}", binding.provider, error);
                        failure.get_or_insert((binding.provider.name(), error));
                    }
                }
            }

            if let Some((provider, error)) = failure {
                let error = ContainerError::ResourceInit {
                    provider,
                    error: Arc::new(error),
                };
                self.fail(error.clone());
                if let Err(teardown) = self.release_all().await {
                    tracing::error!("{}", teardown);
                }
                return Err(error);
            }
        }

        self.transition(ContainerState::ResourcesReady);
        Ok(())
    }

    fn construct(
        &self,
        binding: &Binding,
    ) -> impl std::future::Future<Output = Result<Instance, DynError>> + Send {
        let provider = binding.provider.clone();
        let ctx = InjectionContext::for_provider(
            self.table.clone(),
            provider.name(),
            provider.imports(),
        );

        async move { provider.factory.construct(ctx).await }
    }

    /// Releases all constructed singletons in reverse construction order
    ///
    /// Permitted in every state. Every resource is released even if some fail.
    pub async fn teardown(&mut self) -> Result<(), TeardownError> {
        let result = self.release_all().await;
        if self.state != ContainerState::Failed {
            self.transition(ContainerState::TornDown);
        }
        result
    }

    async fn release_all(&mut self) -> Result<(), TeardownError> {
        let mut failures = Vec::new();

        while let Some(type_id) = self.initialized.pop() {
            let Some(binding) = self.table.get(&type_id).cloned() else {
                continue;
            };
            let Some(instance) = binding.take() else {
                continue;
            };

            match binding.provider.factory.release(instance).await {
                Ok(()) => tracing::debug!("Released '{}'", binding.provider),
                Err(error) => {
                    tracing::warn!("Releasing '{}' failed: {}", binding.provider, error);
                    failures.push(ReleaseFailure {
                        provider: binding.provider.name(),
                        error: Arc::new(error),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(TeardownError { failures })
        }
    }

    /// Returns a constructed singleton
    pub fn require<C: ?Sized + Injectable>(&self) -> Result<Arc<C>, RequireError> {
        let info = TypeInfo::of::<C>();
        let binding = self
            .table
            .get(&info.type_id)
            .ok_or(RequireError::TypeMissing(info.type_name))?;

        let instance = binding
            .instance()
            .ok_or(RequireError::NotInitialized(binding.provider.name()))?;
        downcast(&instance)
    }

    /// Resolves anything implementing [`Resolver`], constructing transient components
    pub async fn resolve<T: Resolver>(&self) -> Result<T, InjectError> {
        self.context().resolve::<T>().await
    }

    /// A context to resolve components outside of any provider
    pub fn context(&self) -> InjectionContext {
        InjectionContext::new(self.table.clone())
    }

    pub(crate) fn mark_bootstrapped(&mut self) -> Result<(), ContainerError> {
        self.expect_state("finish bootstrap", &[ContainerState::ResourcesReady])?;
        self.transition(ContainerState::Bootstrapped);
        Ok(())
    }

    /// Moves the container into the failed state, returning the cause
    pub(crate) fn fail<E>(&mut self, error: E) -> E {
        self.transition(ContainerState::Failed);
        error
    }

    fn bindings(&self) -> impl Iterator<Item = &Arc<Binding>> {
        self.groups
            .iter()
            .flatten()
            .filter_map(|type_id| self.table.get(type_id))
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[ContainerState],
    ) -> Result<(), ContainerError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ContainerError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, to: ContainerState) {
        if self.state != to {
            tracing::debug!("Container {:?} -> {:?}", self.state, to);
            self.state = to;
        }
    }
}
