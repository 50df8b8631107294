//! DependencyGraph: acyclic `name -> depends-on` relation
//!
//! Items are added one at a time together with the names they depend on.
//! Every insertion is checked against the items already present, so the
//! graph never holds a cycle: an insertion that would close one is rejected
//! and rolled back, leaving the rest of the graph untouched.
//!
//! Dependencies naming items that were never added are kept but impose no
//! ordering: closure queries step over them.

use super::error::{GraphError, GraphResult};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use tracing::debug;

/// How a closure query treats a name that is not in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Unknown names contribute no ancestors
    Soft,
    /// Unknown names are an error
    Strict,
}

/// Directed acyclic graph of named items
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// dependent name -> names it depends on
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` depending on each of `dependencies`
    ///
    /// Fails with [`GraphError::DuplicateItem`] if `name` is already present
    /// and with [`GraphError::CycleDetected`] if any dependency already
    /// (transitively) depends on `name`. On failure the graph is exactly as
    /// it was before the call.
    pub fn add<I, S>(&mut self, name: impl Into<String>, dependencies: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.dependencies.contains_key(&name) {
            return Err(GraphError::duplicate(name));
        }
        self.dependencies.insert(name.clone(), BTreeSet::new());

        for dependency in dependencies {
            let dependency = dependency.into();
            let mut ancestors = self.ancestors(&dependency, Lookup::Soft)?;
            ancestors.insert(dependency.clone());
            if ancestors.contains(&name) {
                self.dependencies.remove(&name);
                return Err(GraphError::cycle(name));
            }
            if let Some(edges) = self.dependencies.get_mut(&name) {
                edges.insert(dependency);
            }
        }

        debug!(
            item = %name,
            dependencies = ?self.dependencies.get(&name),
            "added graph item"
        );
        Ok(())
    }

    /// Everything that must be emitted before `name`
    ///
    /// The result is in post-order: each entry appears after all of its own
    /// dependencies, and every name appears once no matter how many paths
    /// reach it. Direct dependencies are visited in ascending name order.
    pub fn dependencies_of(&self, name: &str) -> GraphResult<Vec<String>> {
        let direct = self
            .dependencies
            .get(name)
            .ok_or_else(|| GraphError::unknown(name))?;

        let mut ordered = Vec::new();
        let mut entered: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, bool)> = Vec::new();
        self.push_known(&mut stack, direct, &entered);

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                ordered.push(current.to_string());
                continue;
            }
            if !entered.insert(current) {
                continue;
            }
            stack.push((current, true));
            if let Some(children) = self.dependencies.get(current) {
                self.push_known(&mut stack, children, &entered);
            }
        }

        Ok(ordered)
    }

    /// Transitive closure of what `name` depends on, as a set
    pub fn ancestors(&self, name: &str, lookup: Lookup) -> GraphResult<BTreeSet<String>> {
        let mut all = BTreeSet::new();
        let mut pending: VecDeque<&str> = VecDeque::from([name]);

        while let Some(current) = pending.pop_front() {
            let Some(parents) = self.dependencies.get(current) else {
                match lookup {
                    Lookup::Soft => continue,
                    Lookup::Strict => return Err(GraphError::unknown(name)),
                }
            };
            for parent in parents {
                if all.insert(parent.clone()) {
                    pending.push_back(parent.as_str());
                }
            }
        }

        Ok(all)
    }

    /// Direct dependencies of `name`
    pub fn direct_dependencies(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(name)
    }

    /// Check if an item exists
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Item names in ascending order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Queue not-yet-entered known names so the smallest is popped first
    fn push_known<'a>(
        &'a self,
        stack: &mut Vec<(&'a str, bool)>,
        names: &'a BTreeSet<String>,
        entered: &HashSet<&str>,
    ) {
        for child in names.iter().rev() {
            if self.contains(child) && !entered.contains(child.as_str()) {
                stack.push((child.as_str(), false));
            }
        }
    }
}
