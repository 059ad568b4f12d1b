use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

/// Package name to the packages it directly depends on, as listed in a dependency report.
///
/// Keys are kept sorted so that seeded random selection over them is reproducible; each
/// dependency list keeps the order it had in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the dependency list of `package`.
    pub fn insert(&mut self, package: impl Into<String>, dependencies: Vec<String>) {
        self.edges.insert(package.into(), dependencies);
    }

    pub fn dependencies(&self, package: &str) -> Option<&[String]> {
        self.edges.get(package).map(Vec::as_slice)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.edges.contains_key(package)
    }

    /// True if `from` lists `to` among its direct dependencies.
    pub fn depends_on(&self, from: &str, to: &str) -> bool {
        self.dependencies(from)
            .is_some_and(|deps| deps.iter().any(|d| d == to))
    }

    /// True if `a` and `b` list each other.
    pub fn has_mutual_cycle(&self, a: &str, b: &str) -> bool {
        a != b && self.depends_on(a, b) && self.depends_on(b, a)
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.edges.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for DependencyGraph
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut graph = DependencyGraph::new();
        for (package, deps) in iter {
            graph.insert(package, deps.into_iter().map(Into::into).collect());
        }
        graph
    }
}
