use std::{any::TypeId, collections::HashSet};

use crate::{
    declaration::{component::Component, provider::Provider},
    errors::{UnplacedProvider, UnsatisfiableDependencyError},
};

/// A batch of providers whose imports are all supplied by earlier layers
///
/// Providers within one layer never import each other, so they can be
/// constructed concurrently.
#[derive(Debug, Clone)]
pub struct Layer {
    index: usize,
    providers: Vec<Provider>,
}

impl Layer {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn into_providers(self) -> Vec<Provider> {
        self.providers
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(Provider::name).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.names().join(", "))
    }
}

/// Orders providers into layers so every provider's imports are supplied by earlier layers
///
/// Layer 0 holds all providers without imports, layer `i` all remaining providers whose
/// imports are supplied by layers `0..i`. Within a layer the declaration order is kept,
/// so resolving the same input twice yields the same layers.
///
/// Returns every provider that can never be placed, because it is part of a cycle,
/// imports a component nobody supplies, or waits on such a provider.
pub fn resolve_layers(providers: Vec<Provider>) -> Result<Vec<Layer>, UnsatisfiableDependencyError> {
    let supplied: HashSet<TypeId> = providers
        .iter()
        .map(|provider| provider.component().id())
        .collect();

    let mut placed: HashSet<TypeId> = HashSet::new();
    let mut layers: Vec<Layer> = Vec::new();
    let mut remaining = providers;

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<Provider>, Vec<Provider>) =
            remaining.into_iter().partition(|provider| {
                provider
                    .imports()
                    .iter()
                    .all(|import| placed.contains(&import.id()))
            });
        remaining = blocked;

        if ready.is_empty() {
            break;
        }

        // Only mark as placed after partitioning, imports inside the same layer are not satisfied
        placed.extend(ready.iter().map(|provider| provider.component().id()));

        let layer = Layer {
            index: layers.len(),
            providers: ready,
        };
        tracing::debug!("Resolved layer {}: {}", layer.index, layer);
        layers.push(layer);
    }

    if !remaining.is_empty() {
        let unplaced = remaining
            .iter()
            .map(|provider| {
                let (missing, blocked_by): (Vec<Component>, Vec<Component>) = provider
                    .imports()
                    .iter()
                    .filter(|import| !placed.contains(&import.id()))
                    .partition(|import| !supplied.contains(&import.id()));

                UnplacedProvider {
                    provider: provider.name(),
                    missing,
                    blocked_by,
                }
            })
            .collect();

        return Err(UnsatisfiableDependencyError { providers: unplaced });
    }

    Ok(layers)
}
