//! Shell variable ordering: `$NAME` / `${NAME}` references become edges

use super::OrderedItems;
use crate::graph::{DependencyGraph, GraphResult};
use crate::value::ScalarValue;
use regex_lite::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use tracing::debug;

static VAR_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{?(\w+)").expect("variable reference pattern"));

/// Names referenced by a shell value, in order of appearance
pub fn variable_references(value: &str) -> Vec<&str> {
    VAR_REFERENCE
        .captures_iter(value)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Variables ordered so every value follows the variables it expands
#[derive(Debug, Clone)]
pub struct VarGraph {
    items: OrderedItems<String>,
}

impl VarGraph {
    /// Build the graph from `(name, value)` pairs
    ///
    /// Values are stringified before scanning. References to the variable
    /// itself or to names outside the input are ignored.
    pub fn new<'a, I>(vars: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a ScalarValue)>,
    {
        let vars: Vec<(&String, String)> = vars
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        let known: HashSet<&str> = vars.iter().map(|(name, _)| name.as_str()).collect();

        let mut items = OrderedItems::new();
        for (name, value) in &vars {
            let dependencies: BTreeSet<String> = variable_references(value)
                .into_iter()
                .filter(|reference| *reference != name.as_str() && known.contains(reference))
                .map(str::to_string)
                .collect();
            if !dependencies.is_empty() {
                debug!(variable = %name, ?dependencies, "variable references");
            }
            items.insert(name, value.clone(), dependencies)?;
        }

        Ok(Self { items })
    }

    /// `(name, value)` pairs with referenced variables first
    pub fn ordered_vars(&self) -> GraphResult<Vec<(String, String)>> {
        self.items.ordered_pairs()
    }

    pub fn graph(&self) -> &DependencyGraph {
        self.items.graph()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() == 0
    }
}
