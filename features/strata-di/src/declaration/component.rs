use std::{
    any::TypeId,
    hash::{Hash, Hasher},
};

use crate::types::{Injectable, TypeInfo};

/// An abstract service contract providers can be bound to
///
/// A component is identified by its capability type, usually a trait object
/// such as `dyn Observer`. The name is for diagnostics only, two components
/// with the same capability are the same component.
///
/// # Example
/// ```rust
/// use strata_di::Component;
///
/// pub trait Observer: Send + Sync {}
///
/// let observer = Component::of::<dyn Observer>();
/// assert_eq!(observer.name(), "Observer");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Component {
    name: &'static str,
    capability: TypeInfo,
}

impl Component {
    /// Declares the component for capability `C`, named after the type
    pub fn of<C: ?Sized + Injectable>() -> Self {
        let capability = TypeInfo::of::<C>();
        Component {
            name: capability.short_name(),
            capability,
        }
    }

    /// Declares the component for capability `C` with a custom name
    pub fn named<C: ?Sized + Injectable>(name: &'static str) -> Self {
        Component {
            name,
            capability: TypeInfo::of::<C>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capability(&self) -> TypeInfo {
        self.capability
    }

    pub fn id(&self) -> TypeId {
        self.capability.type_id
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.capability.type_id == other.capability.type_id
    }
}
impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.capability.type_id.hash(state);
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}
