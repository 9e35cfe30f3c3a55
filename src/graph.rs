use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap};

/// Undirected simple graph keyed by node label.
///
/// Node indices follow first appearance, edge indices follow insertion, so
/// iterating `labels()` or `edges()` reproduces the order the graph was built in.
#[derive(Debug, Clone, Default)]
pub struct AdjGraph {
    graph: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl AdjGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `label`, inserting the node if it is new.
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(label.to_string());
        self.index.insert(label.to_string(), idx);
        idx
    }

    /// Adds the undirected edge `a-b`. Returns false if it was already present.
    pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
        let na = self.add_node(a);
        let nb = self.add_node(b);
        if self.graph.find_edge(na, nb).is_some() {
            return false;
        }
        self.graph.add_edge(na, nb, ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&na), Some(&nb)) => self.graph.contains_edge(na, nb),
            _ => false,
        }
    }

    /// Node labels in first-appearance order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_indices().map(move |n| self.graph[n].as_str())
    }

    /// Edges as label pairs in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
            )
        })
    }

    /// Edges as node positions in insertion order.
    pub(crate) fn edge_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
    }

    /// Neighbours of `label` in the order their edges were added.
    pub fn neighbors(&self, label: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(label) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|e| {
                let other = if e.source() == node { e.target() } else { e.source() };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.dedup_by_key(|(id, _)| *id);
        edges
            .into_iter()
            .map(|(_, other)| self.graph[other].as_str())
            .collect()
    }

    pub fn self_loop_count(&self) -> usize {
        self.graph
            .edge_references()
            .filter(|e| e.source() == e.target())
            .count()
    }

    pub fn node_set(&self) -> BTreeSet<String> {
        self.labels().map(str::to_string).collect()
    }

    /// Order-independent edge set, each pair stored smaller label first.
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.edges()
            .map(|(a, b)| {
                if a <= b {
                    (a.to_string(), b.to_string())
                } else {
                    (b.to_string(), a.to_string())
                }
            })
            .collect()
    }
}
