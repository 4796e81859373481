//! Inheritance graph.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: interface names (registered or merely referenced as a parent)
//! - Edges: child → parent
//!
//! Parents may be referenced before they are registered. Cycles in malformed
//! input are tolerated: walks stop at the first repeated node.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    graph: DiGraph<String, ()>,
    nodes: FxHashMap<String, NodeIndex>,
}

impl InheritanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Record `name`, with an edge to `parent` when it has one.
    pub fn add(&mut self, name: &str, parent: Option<&str>) {
        let child = self.node(name);
        if let Some(parent) = parent {
            let parent = self.node(parent);
            self.graph.update_edge(child, parent, ());
        }
    }

    /// Direct parent of `name`.
    pub fn parent(&self, name: &str) -> Option<&str> {
        let idx = *self.nodes.get(name)?;
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .map(|p| self.graph[p].as_str())
    }

    /// Ancestors of `name`, nearest first. `name` itself is not included.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let Some(&start) = self.nodes.get(name) else {
            return out;
        };
        let mut seen = FxHashSet::default();
        seen.insert(start);
        let mut current = start;
        while let Some(parent) = self
            .graph
            .neighbors_directed(current, Direction::Outgoing)
            .next()
        {
            if !seen.insert(parent) {
                break;
            }
            out.push(self.graph[parent].as_str());
            current = parent;
        }
        out
    }

    /// True when `name` is `ancestor` or derives from it.
    pub fn inherits(&self, name: &str, ancestor: &str) -> bool {
        name == ancestor || self.ancestors(name).contains(&ancestor)
    }

    /// Names that derive directly from `name`.
    pub fn children(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(name) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|c| self.graph[c].as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom_graph() -> InheritanceGraph {
        let mut g = InheritanceGraph::new();
        g.add("EventTarget", None);
        g.add("Node", Some("EventTarget"));
        g.add("Element", Some("Node"));
        g.add("HTMLElement", Some("Element"));
        g
    }

    #[test]
    fn ancestors_nearest_first() {
        let g = dom_graph();
        assert_eq!(g.ancestors("HTMLElement"), vec!["Element", "Node", "EventTarget"]);
        assert!(g.ancestors("EventTarget").is_empty());
        assert!(g.ancestors("Unknown").is_empty());
    }

    #[test]
    fn inherits_includes_self() {
        let g = dom_graph();
        assert!(g.inherits("HTMLElement", "Node"));
        assert!(g.inherits("Node", "Node"));
        assert!(!g.inherits("Node", "Element"));
        assert!(g.inherits("Unknown", "Unknown"));
    }

    #[test]
    fn parents_may_be_forward_references() {
        let mut g = InheritanceGraph::new();
        g.add("Child", Some("Parent"));
        assert_eq!(g.parent("Child"), Some("Parent"));
        g.add("Parent", Some("Root"));
        assert!(g.inherits("Child", "Root"));
        assert_eq!(g.children("Parent"), vec!["Child"]);
    }

    #[test]
    fn cycles_terminate() {
        let mut g = InheritanceGraph::new();
        g.add("A", Some("B"));
        g.add("B", Some("A"));
        assert_eq!(g.ancestors("A"), vec!["B"]);
        assert!(!g.inherits("A", "C"));
    }
}
