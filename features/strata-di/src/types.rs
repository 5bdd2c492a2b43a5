use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All errors must be Send + Sync to cross layer boundaries
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything bound in the container may be shared between threads,
/// so components need to be Send + Sync + 'static.
///
/// Unlike plain values, components are usually trait objects (`dyn Observer`),
/// hence the `?Sized`.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type erased instance of a component
///
/// Holds an `Arc<C>` where `C` is the component's capability type.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<C: ?Sized + Injectable>(component: Arc<C>) -> Self {
        Instance {
            info: TypeInfo::of::<C>(),
            instance: Arc::new(component),
        }
    }

    /// Returns a handle to the wrapped component, or the actual type name on mismatch
    pub fn downcast<C: ?Sized + Injectable>(&self) -> Result<Arc<C>, &'static str> {
        match self.instance.downcast_ref::<Arc<C>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Last path segment of the type name, without generics
    ///
    /// `dyn my_crate::observer::Observer` becomes `Observer`
    pub fn short_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }
}
