//! Plugin ordering from declared `plugin_requires` statements

use super::discovery::{DiscoveryError, PluginRequirements};
use super::OrderedItems;
use crate::graph::{DependencyGraph, GraphError, GraphResult};
use crate::value::ScalarValue;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors raised while building a plugin graph from a checkout directory
#[derive(Debug, Error)]
pub enum PluginGraphError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Plugin locations as given, with falsy ones (`false`, `''`, null) as `None`
pub fn plugin_sources(plugins: &IndexMap<String, ScalarValue>) -> IndexMap<String, Option<String>> {
    plugins
        .iter()
        .map(|(name, source)| (name.clone(), source.is_truthy().then(|| source.to_string())))
        .collect()
}

/// Plugins ordered so required plugins are enabled first
#[derive(Debug, Clone)]
pub struct PluginGraph {
    items: OrderedItems<Option<String>>,
}

impl PluginGraph {
    /// Discover requirements under `base_dir` and build the graph
    ///
    /// Without a `base_dir` no plugin has requirements and the order is
    /// purely alphabetical.
    pub fn discover<'a, I>(base_dir: Option<&Path>, plugins: I) -> Result<Self, PluginGraphError>
    where
        I: IntoIterator<Item = (&'a String, &'a Option<String>)>,
    {
        let requirements = match base_dir {
            Some(dir) => PluginRequirements::discover(dir)?,
            None => PluginRequirements::new(),
        };
        Ok(Self::new(&requirements, plugins)?)
    }

    /// Build the graph from `(name, source)` pairs and known requirements
    ///
    /// Requirements naming plugins that are not being enabled are ignored.
    pub fn new<'a, I>(requirements: &PluginRequirements, plugins: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a Option<String>)>,
    {
        let plugins: Vec<(&String, &Option<String>)> = plugins.into_iter().collect();
        let requested: HashSet<&str> = plugins.iter().map(|(name, _)| name.as_str()).collect();

        let mut items = OrderedItems::new();
        for (name, source) in plugins {
            let dependencies: BTreeSet<String> = requirements
                .requirements_of(name)
                .into_iter()
                .flatten()
                .filter(|required| *required != name && requested.contains(required.as_str()))
                .cloned()
                .collect();
            items.insert(name, source.clone(), dependencies)?;
        }

        Ok(Self { items })
    }

    /// `(name, source)` pairs with required plugins first
    pub fn ordered_plugins(&self) -> GraphResult<Vec<(String, Option<String>)>> {
        self.items.ordered_pairs()
    }

    pub fn graph(&self) -> &DependencyGraph {
        self.items.graph()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() == 0
    }
}
