//! Dependency-respecting emission order for variables and plugins
//!
//! Both specializations share one emission rule: walk item names in
//! ascending order and, for each item not yet emitted, emit its pending
//! transitive dependencies (deepest first) and then the item itself.

mod discovery;
mod plugins;
mod vars;

pub use discovery::{parse_settings, DiscoveryError, PluginRequirements};
pub use plugins::{plugin_sources, PluginGraph, PluginGraphError};
pub use vars::{variable_references, VarGraph};

use crate::graph::{DependencyGraph, GraphError, GraphResult};
use std::collections::{BTreeMap, HashSet};

/// Named values plus the graph that orders them
#[derive(Debug, Clone)]
pub(crate) struct OrderedItems<V> {
    graph: DependencyGraph,
    values: BTreeMap<String, V>,
}

impl<V: Clone> OrderedItems<V> {
    pub(crate) fn new() -> Self {
        Self {
            graph: DependencyGraph::new(),
            values: BTreeMap::new(),
        }
    }

    /// Store `value` under `name` and record its dependencies
    ///
    /// Nothing is kept if the graph rejects the item.
    pub(crate) fn insert<I>(&mut self, name: &str, value: V, dependencies: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = String>,
    {
        if self.values.contains_key(name) {
            return Err(GraphError::duplicate(name));
        }
        self.graph.add(name, dependencies)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub(crate) fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub(crate) fn get(&self, name: &str) -> Option<&V> {
        self.values.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Every item exactly once, dependencies before dependents
    pub(crate) fn ordered_pairs(&self) -> GraphResult<Vec<(String, V)>> {
        let mut ordered = Vec::with_capacity(self.values.len());
        let mut seen: HashSet<String> = HashSet::with_capacity(self.values.len());

        for name in self.values.keys() {
            if seen.contains(name) {
                continue;
            }
            let mut pending = self.graph.dependencies_of(name)?;
            pending.push(name.clone());
            for item in pending {
                if seen.contains(&item) {
                    continue;
                }
                let value = self
                    .values
                    .get(&item)
                    .cloned()
                    .ok_or_else(|| GraphError::unknown(item.as_str()))?;
                seen.insert(item.clone());
                ordered.push((item, value));
            }
        }

        Ok(ordered)
    }
}
