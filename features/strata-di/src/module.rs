use std::{any::TypeId, collections::HashMap, sync::Arc};

use crate::{
    container::Container,
    declaration::{component::Component, provider::Provider},
    errors::{DeclarationErrors, DeclarationIssue, ModuleError},
    types::{DynError, TypeInfo},
};

/// A named group of component and provider declarations
///
/// Modules only describe what exists, the [`crate::Loader`] resolves and constructs it.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use strata_di::{Component, DynError, InjectionContext, Module, Provider, ProviderFactory};
///
/// pub trait Observer: Send + Sync {}
/// struct Publishing;
/// impl Observer for Publishing {}
///
/// struct ObserverPublisher;
/// impl ProviderFactory for ObserverPublisher {
///     type Component = dyn Observer;
///
///     async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Observer>, DynError> {
///         Ok(Arc::new(Publishing))
///     }
/// }
///
/// struct ObserverModule;
/// impl Module for ObserverModule {
///     fn declare_components(&self) -> Vec<Component> {
///         vec![Component::of::<dyn Observer>()]
///     }
///
///     fn declare_providers(&self) -> Vec<Provider> {
///         vec![Provider::builder(ObserverPublisher).build()]
///     }
/// }
/// ```
pub trait Module: Send + Sync + 'static {
    /// Identifies the module, a module type imported twice is only loaded once
    fn id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Name used in diagnostics, not necessarily unique
    fn name(&self) -> &'static str {
        TypeInfo::of::<Self>().short_name()
    }

    /// Modules whose declarations this module builds upon
    fn imports(&self) -> Vec<Box<dyn Module>> {
        Vec::new()
    }

    fn declare_components(&self) -> Vec<Component> {
        Vec::new()
    }

    fn declare_providers(&self) -> Vec<Provider>;

    /// Runs once after every resource is initialized, after all imported modules bootstrapped
    fn init_bootstrap(&self, container: &Container) -> Result<(), DynError> {
        let _ = container;
        Ok(())
    }
}

/// All modules reachable from a root module, imported modules first
pub struct ModuleGraph {
    modules: Vec<Arc<dyn Module>>,
    /// Modules imported again with declarations differing from the loaded instance
    conflicts: Vec<&'static str>,
}

/// Shape of a module's declarations, two instances of one module type should agree on it
#[derive(PartialEq, Eq)]
struct Declarations {
    components: Vec<TypeId>,
    providers: Vec<(&'static str, TypeId, TypeId)>,
}

impl Declarations {
    fn of(module: &dyn Module) -> Self {
        Declarations {
            components: module
                .declare_components()
                .iter()
                .map(Component::id)
                .collect(),
            providers: module
                .declare_providers()
                .iter()
                .map(|provider| {
                    (
                        provider.name(),
                        provider.component().id(),
                        provider.implementation().type_id,
                    )
                })
                .collect(),
        }
    }
}

impl ModuleGraph {
    /// Collects the root and everything it imports, transitively
    ///
    /// Fails if modules import each other in a cycle.
    pub fn collect(root: Box<dyn Module>) -> Result<Self, ModuleError> {
        let mut graph = ModuleGraph {
            modules: Vec::new(),
            conflicts: Vec::new(),
        };
        let mut chain = Vec::new();
        visit(Arc::from(root), &mut graph, &mut chain)?;
        return Ok(graph);

        fn visit(
            module: Arc<dyn Module>,
            graph: &mut ModuleGraph,
            chain: &mut Vec<(TypeId, &'static str)>,
        ) -> Result<(), ModuleError> {
            let id = module.id();
            let name = module.name();

            // Circular import check
            if chain.iter().any(|(visiting, _)| *visiting == id) {
                let mut names: Vec<&'static str> = chain.iter().map(|(_, name)| *name).collect();
                names.push(name); // Add current so chain is complete
                return Err(ModuleError::ImportCycle { chain: names });
            }

            // Skip if already loaded through another import
            if let Some(loaded) = graph.modules.iter().find(|loaded| loaded.id() == id) {
                if Declarations::of(loaded.as_ref()) == Declarations::of(module.as_ref()) {
                    tracing::trace!("Module '{}' already loaded", name);
                } else {
                    tracing::warn!(
                        "Module '{}' is imported again with different declarations",
                        name
                    );
                    graph.conflicts.push(name);
                }
                return Ok(());
            }

            chain.push((id, name));
            for import in module.imports() {
                visit(Arc::from(import), graph, chain)?;
            }
            chain.pop();

            graph.modules.push(module);
            Ok(())
        }
    }

    /// Modules in bootstrap order, every module after the modules it imports
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Returns the unordered provider set of all modules
    ///
    /// Checks that every capability is declared by one module only, and that every
    /// provider supplies a declared component. All issues are reported at once.
    pub fn providers(&self) -> Result<Vec<Provider>, ModuleError> {
        let mut issues: Vec<DeclarationIssue> = self
            .conflicts
            .iter()
            .map(|module| DeclarationIssue::ConflictingModule { module: *module })
            .collect();
        let mut declared: HashMap<TypeId, (Component, &'static str)> = HashMap::new();

        for module in &self.modules {
            for component in module.declare_components() {
                match declared.get(&component.id()) {
                    Some((_, first)) => issues.push(DeclarationIssue::DuplicateComponent {
                        component,
                        first: *first,
                        second: module.name(),
                    }),
                    None => {
                        declared.insert(component.id(), (component, module.name()));
                    }
                }
            }
        }

        let mut providers = Vec::new();
        for module in &self.modules {
            for provider in module.declare_providers() {
                match declared.get(&provider.component().id()) {
                    // Carry the declared name into diagnostics
                    Some((component, _)) => providers.push(provider.with_component(*component)),
                    None => issues.push(DeclarationIssue::UndeclaredComponent {
                        provider: provider.name(),
                        component: provider.component(),
                        module: module.name(),
                    }),
                }
            }
        }

        if !issues.is_empty() {
            return Err(DeclarationErrors { issues }.into());
        }

        Ok(providers)
    }
}
