//! The GeneWalk network of genes and GO terms
//!
//! The [`Graph`] is a multigraph over gene and GO nodes. Edges are
//! associations between two nodes, e.g. a curated statement between
//! two genes or a GO annotation of a gene. Parallel edges are allowed,
//! but the connectivity of a node only counts its distinct neighbors.

use core::fmt::Debug;
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::parser;
use crate::GeneWalkError;
use crate::GeneWalkResult;

mod group;
mod node;

pub use group::{NodeGroup, NodeIds};
pub use node::{Node, NodeId, GO_ATTRIBUTE, HGNC_ATTRIBUTE, NAME_ATTRIBUTE};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Graph` holds all nodes, their attributes and their neighbors
///
/// # Examples
///
/// ```
/// use genewalk::{Graph, Node};
///
/// let mut graph = Graph::default();
/// let kras = graph.add_node(Node::gene("KRAS", "HGNC:6407")).unwrap();
/// let braf = graph.add_node(Node::gene("BRAF", "HGNC:1097")).unwrap();
/// let go = graph.add_node(Node::go_term("GO:0005515", "protein binding")).unwrap();
///
/// graph.add_edge(kras, braf).unwrap();
/// graph.add_edge(kras, go).unwrap();
/// graph.add_edge(kras, go).unwrap();
///
/// assert_eq!(graph.len(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// // parallel edges count only once
/// assert_eq!(graph.connectivity(kras), Some(2));
/// assert_eq!(graph.go_neighbors(kras).unwrap().len(), 1);
/// ```
///
/// # Layout
///
/// ```mermaid
/// erDiagram
///     GRAPH ||--|{ NODE : contains
///     NODE }|--o{ NODE : neighbor_of
///     NODE {
///         str label
///         str HGNC
///         str GO
///         str name
///     }
/// ```
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
    neighbors: Vec<NodeGroup>,
    index: HashMap<String, NodeId>,
    go_terms: NodeGroup,
    edges: usize,
}

impl Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph with {} nodes and {} edges",
            self.nodes.len(),
            self.edges
        )
    }
}

impl Graph {
    /// Loads the graph from a node file and an edge file
    ///
    /// The node file is tab-separated with the columns
    /// `label`, `HGNC`, `GO` and `name`. Empty cells are missing attributes.
    ///
    /// The edge file is tab-separated with the columns `source`, `target`
    /// and an optional relation. Nodes that are only present in the
    /// edge file are added without attributes.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::CannotOpenFile`]: one of the files can't be opened
    /// - [`GeneWalkError::InvalidInput`]: a line does not have enough columns
    ///
    /// # Examples
    ///
    /// ```
    /// use genewalk::Graph;
    ///
    /// let graph = Graph::from_files(
    ///     "tests/data/GeneWalk_MG_nodes.tsv",
    ///     "tests/data/GeneWalk_MG_edges.tsv"
    /// ).unwrap();
    ///
    /// let kras = graph.node_by_label("KRAS").unwrap();
    /// assert_eq!(graph.node(kras).unwrap().hgnc(), Some("HGNC:6407"));
    /// ```
    pub fn from_files<N: AsRef<Path>, E: AsRef<Path>>(
        nodes: N,
        edges: E,
    ) -> GeneWalkResult<Self> {
        let mut graph = Graph::default();
        parser::graph::parse_nodes(nodes, &mut graph)?;
        parser::graph::parse_edges(edges, &mut graph)?;
        debug!("Loaded {:?}", graph);
        Ok(graph)
    }

    /// Returns the number of nodes in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph does not contain any node
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of edges, including parallel edges
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Adds a node to the graph and returns its [`NodeId`]
    ///
    /// If a node with the same label exists already, the attributes
    /// of `node` are merged into the existing node.
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::InvalidInput`] if the graph can't hold more nodes
    pub fn add_node(&mut self, node: Node) -> GeneWalkResult<NodeId> {
        let id = if let Some(id) = self.index.get(node.label()) {
            let id = *id;
            self.nodes[id.as_usize()].merge(node);
            id
        } else {
            let id = NodeId::try_from(self.nodes.len())?;
            self.index.insert(node.label().to_string(), id);
            self.nodes.push(node);
            self.neighbors.push(NodeGroup::new());
            id
        };
        if self.nodes[id.as_usize()].is_go_term() {
            self.go_terms.insert(id);
        }
        Ok(id)
    }

    /// Connects two nodes with an undirected edge
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::DoesNotExist`] if one of the nodes is not part of the graph
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> GeneWalkResult<()> {
        if a.as_usize() >= self.nodes.len() || b.as_usize() >= self.nodes.len() {
            return Err(GeneWalkError::DoesNotExist);
        }
        self.neighbors[a.as_usize()].insert(b);
        self.neighbors[b.as_usize()].insert(a);
        self.edges += 1;
        Ok(())
    }

    /// Connects two nodes by their label
    ///
    /// Missing nodes are added without any attributes
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::InvalidInput`] if the graph can't hold more nodes
    pub fn add_edge_by_label(&mut self, a: &str, b: &str) -> GeneWalkResult<()> {
        let a = match self.node_by_label(a) {
            Some(id) => id,
            None => self.add_node(Node::new(a))?,
        };
        let b = match self.node_by_label(b) {
            Some(id) => id,
            None => self.add_node(Node::new(b))?,
        };
        self.add_edge(a, b)
    }

    /// Returns the [`Node`] with the given id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_usize())
    }

    /// Returns the [`NodeId`] of the node with the given label
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    /// Returns the distinct neighbors of a node
    pub fn neighbors(&self, id: NodeId) -> Option<&NodeGroup> {
        self.neighbors.get(id.as_usize())
    }

    /// Returns the number of distinct neighbors of a node
    pub fn connectivity(&self, id: NodeId) -> Option<usize> {
        self.neighbors(id).map(NodeGroup::len)
    }

    /// Returns all nodes that carry a `GO` attribute
    pub fn go_terms(&self) -> &NodeGroup {
        &self.go_terms
    }

    /// Returns the neighbors of a node that are GO terms
    ///
    /// Gene - gene edges are excluded
    pub fn go_neighbors(&self, id: NodeId) -> Option<NodeGroup> {
        self.neighbors(id).map(|neighbors| neighbors & &self.go_terms)
    }

    /// Iterates all nodes in insertion order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.nodes.iter().enumerate(),
        }
    }
}

/// An iterator of all nodes of the [`Graph`] with their [`NodeId`]
pub struct Iter<'a> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeId, &'a Node);
    fn next(&mut self) -> Option<Self::Item> {
        // `add_node` guarantees that every index fits into `u32`
        self.inner
            .next()
            .map(|(idx, node)| (NodeId::from(idx as u32), node))
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = (NodeId, &'a Node);
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
