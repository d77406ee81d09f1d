//! Strongest-first layering of containers.

use smallvec::SmallVec;
use std::collections::HashSet;
use std::sync::Arc;

use super::{ContainerDataSource, ContainerHandle, DataSource};
use crate::util::Token;

/// Lazily layers several containers, strongest first.
///
/// `get` returns the strongest non-null child. When that child is a
/// container, the same-named containers of the weaker inputs are layered
/// beneath it, so nested keys merge instead of masking.
pub struct OverlayContainerDataSource {
    inputs: SmallVec<[ContainerHandle; 4]>,
}

impl OverlayContainerDataSource {
    /// Layer `inputs`, strongest first.
    pub fn new(inputs: impl IntoIterator<Item = ContainerHandle>) -> ContainerHandle {
        Arc::new(Self {
            inputs: inputs.into_iter().collect(),
        })
    }

    /// Overlay two optional containers, skipping the wrapper when one side
    /// is missing.
    pub fn overlay_nonempty(
        stronger: Option<ContainerHandle>,
        weaker: Option<ContainerHandle>,
    ) -> Option<ContainerHandle> {
        match (stronger, weaker) {
            (Some(s), Some(w)) => Some(Self::new([s, w])),
            (Some(s), None) => Some(s),
            (None, w) => w,
        }
    }
}

impl ContainerDataSource for OverlayContainerDataSource {
    fn names(&self) -> Vec<Token> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for input in &self.inputs {
            for name in input.names() {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn get(&self, name: &Token) -> Option<DataSource> {
        let mut containers: SmallVec<[ContainerHandle; 4]> = SmallVec::new();
        for input in &self.inputs {
            match input.get(name) {
                Some(DataSource::Container(c)) => containers.push(c),
                Some(other) if containers.is_empty() => return Some(other),
                _ => {}
            }
        }
        match containers.len() {
            0 => None,
            1 => containers.pop().map(DataSource::Container),
            _ => Some(DataSource::Container(Arc::new(Self { inputs: containers }))),
        }
    }
}
