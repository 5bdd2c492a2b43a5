use std::sync::Arc;

use thiserror::Error;

use crate::{container::ContainerState, declaration::component::Component, types::DynError};

/// Writes an aggregated error as a header followed by one line per offender
fn write_list<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    header: &str,
    items: &[T],
) -> std::fmt::Result {
    let mut display = Vec::with_capacity(items.len() + 1);
    display.push(header.to_string());
    for item in items {
        display.push(format!("- {}", item));
    }
    f.write_str(&display.join("\n"))
}

#[derive(Error, Debug)]
pub enum InjectError {
    /// Could not require the type
    #[error(transparent)]
    RequireError(#[from] RequireError),
    /// Generic error during Injection
    #[error("Error during injection: {0}")]
    Other(DynError),
}

/// Errors when trying to require a certain component
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    /// The required component has no binding
    #[error("'{0}' is not bound in the container")]
    TypeMissing(&'static str),
    /// The required singleton has not been constructed (yet)
    #[error("'{0}' is bound but has not been initialized")]
    NotInitialized(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// Constructing a transient instance failed
    #[error("Constructing '{product}' failed - error: {error}")]
    ConstructionFailed {
        product: &'static str,
        error: Arc<DynError>,
    },
}

/// A dependent needs a capability no candidate provider conforms to
///
/// Diagnostic only, see [`crate::ContainerOptions::strict_dependents`].
#[derive(Error, Debug, Clone)]
#[error("'{dependent}' needs '{component}' but no candidate provider supplies it")]
pub struct UnresolvedImportError {
    pub dependent: &'static str,
    pub component: Component,
}

/// A provider which could not be placed into any layer
#[derive(Debug, Clone)]
pub struct UnplacedProvider {
    pub provider: &'static str,
    /// Imports no provider in the set supplies at all
    pub missing: Vec<Component>,
    /// Imports whose suppliers could not be placed either
    pub blocked_by: Vec<Component>,
}
impl std::fmt::Display for UnplacedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |components: &[Component]| {
            components
                .iter()
                .map(|component| format!("'{}'", component))
                .collect::<Vec<_>>()
                .join(", ")
        };

        write!(f, "'{}'", self.provider)?;
        if !self.missing.is_empty() {
            write!(f, " imports {} which no provider supplies", names(&self.missing))?;
        }
        if !self.blocked_by.is_empty() {
            if !self.missing.is_empty() {
                f.write_str(" and")?;
            }
            write!(
                f,
                " waits on {} which can never be placed (circular or missing supplier)",
                names(&self.blocked_by)
            )?;
        }
        Ok(())
    }
}

/// The resolver could not place every provider into a layer
#[derive(Error, Debug, Clone)]
pub struct UnsatisfiableDependencyError {
    pub providers: Vec<UnplacedProvider>,
}
impl UnsatisfiableDependencyError {
    /// Names of all unplaced providers, in declaration order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|unplaced| unplaced.provider).collect()
    }
}
impl std::fmt::Display for UnsatisfiableDependencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_list(
            f,
            "The following providers can never have their imports satisfied:",
            &self.providers,
        )
    }
}

#[derive(Error, Debug, Clone)]
#[error("'{component}' is already bound to '{bound}', refusing to bind '{rejected}'")]
pub struct DuplicateBindingError {
    pub component: Component,
    pub bound: &'static str,
    pub rejected: &'static str,
}

/// An import of a bound provider which has no binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingImport {
    pub provider: &'static str,
    pub component: Component,
}
impl std::fmt::Display for MissingImport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' imports '{}' but it is not bound",
            self.provider, self.component
        )
    }
}

#[derive(Error, Debug, Clone)]
pub struct MissingDependencyError {
    pub missing: Vec<MissingImport>,
}
impl std::fmt::Display for MissingDependencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_list(f, "The container is missing one or more imports:", &self.missing)
    }
}

#[derive(Error, Debug, Clone)]
pub struct UnresolvedDependentsError {
    pub unresolved: Vec<UnresolvedImportError>,
}
impl std::fmt::Display for UnresolvedDependentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_list(
            f,
            "One or more dependents can not be constructed with the bound providers:",
            &self.unresolved,
        )
    }
}

/// A factory style provider was asked for a product it does not know
///
/// Only fails the single request, the container is unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{factory}' does not know how to produce '{requested}'")]
pub struct UnknownVariantError {
    pub factory: &'static str,
    pub requested: String,
}

/// Errors of the container lifecycle
#[derive(Error, Debug, Clone)]
pub enum ContainerError {
    #[error(transparent)]
    DuplicateBinding(#[from] DuplicateBindingError),

    #[error(transparent)]
    MissingDependency(#[from] MissingDependencyError),

    #[error(transparent)]
    UnresolvedDependents(#[from] UnresolvedDependentsError),

    /// A singleton failed to construct, already initialized resources were released
    #[error("Initializing resource '{provider}' failed - error: {error}")]
    ResourceInit {
        provider: &'static str,
        error: Arc<DynError>,
    },

    #[error("Cannot {operation} while the container is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ContainerState,
    },
}

#[derive(Debug, Clone)]
pub struct ReleaseFailure {
    pub provider: &'static str,
    pub error: Arc<DynError>,
}
impl std::fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.provider, self.error)
    }
}

/// Releasing one or more resources failed, all others were still released
#[derive(Error, Debug, Clone)]
pub struct TeardownError {
    pub failures: Vec<ReleaseFailure>,
}
impl std::fmt::Display for TeardownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_list(f, "Releasing resources failed:", &self.failures)
    }
}

/// A problem with the combined declarations of all loaded modules
#[derive(Error, Debug, Clone)]
pub enum DeclarationIssue {
    #[error("Component '{component}' is declared by both '{first}' and '{second}'")]
    DuplicateComponent {
        component: Component,
        first: &'static str,
        second: &'static str,
    },
    #[error("Module '{module}' is imported more than once with different declarations")]
    ConflictingModule { module: &'static str },
    #[error("Provider '{provider}' of module '{module}' supplies '{component}' which no module declares")]
    UndeclaredComponent {
        provider: &'static str,
        component: Component,
        module: &'static str,
    },
}

#[derive(Error, Debug, Clone)]
pub struct DeclarationErrors {
    pub issues: Vec<DeclarationIssue>,
}
impl std::fmt::Display for DeclarationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_list(f, "The module declarations had one or more errors:", &self.issues)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ModuleError {
    #[error("Modules import each other in a cycle: {}", .chain.join(" -> "))]
    ImportCycle { chain: Vec<&'static str> },

    #[error(transparent)]
    Declaration(#[from] DeclarationErrors),
}

/// Errors while loading an application from its root module
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Resolve(#[from] UnsatisfiableDependencyError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Bootstrap of module '{module}' failed - error: {error}")]
    Bootstrap {
        module: &'static str,
        error: Arc<DynError>,
    },
}
