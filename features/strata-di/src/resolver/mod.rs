use std::future::Future;

use crate::{context::InjectionContext, errors::InjectError};

pub mod arc;

/// Allows custom behaviour on injection
///
/// Implemented for `Arc<C>` of any bound component and for `Option` of any resolver.
/// Resolved values never borrow from the context, hence `'static`.
pub trait Resolver: Sized + Send + 'static {
    fn resolve(ctx: &InjectionContext) -> impl Future<Output = Result<Self, InjectError>> + Send + '_;
}
