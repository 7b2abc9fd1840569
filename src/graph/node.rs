use core::fmt::Debug;
use std::fmt::Display;

use crate::GeneWalkError;
use crate::GeneWalkResult;

/// Attribute key of the HGNC identifier of gene nodes
pub const HGNC_ATTRIBUTE: &str = "HGNC";
/// Attribute key of the GO identifier of GO nodes
pub const GO_ATTRIBUTE: &str = "GO";
/// Attribute key of the description of GO nodes
pub const NAME_ATTRIBUTE: &str = "name";

/// The position of a [`Node`] inside the [`Graph`](crate::Graph)
///
/// Ids are assigned in insertion order and are only meaningful
/// within the graph that created them.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId {
    inner: u32,
}

impl NodeId {
    /// Returns the integer representation of the id
    pub fn as_u32(&self) -> u32 {
        self.inner
    }

    /// Returns the id as `usize` to index into node storage
    pub fn as_usize(&self) -> usize {
        self.inner as usize
    }
}

impl From<u32> for NodeId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl TryFrom<usize> for NodeId {
    type Error = GeneWalkError;
    fn try_from(n: usize) -> GeneWalkResult<Self> {
        Ok(Self {
            inner: u32::try_from(n)
                .map_err(|_| GeneWalkError::InvalidInput(format!("too many nodes: {n}")))?,
        })
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.inner)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// A single node of the [`Graph`](crate::Graph)
///
/// The `label` is the key of the node in the graph and the embedding space.
/// For gene nodes it is the HUGO gene symbol, for GO nodes the GO identifier.
///
/// All attributes are optional. A node with an `HGNC` attribute is a gene,
/// a node with a `GO` attribute belongs to the GO universe.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Node {
    label: String,
    hgnc: Option<String>,
    go: Option<String>,
    name: Option<String>,
}

impl Node {
    /// Constructs a new node without any attributes
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    /// Constructs a new gene node
    pub fn gene(symbol: &str, hgnc_id: &str) -> Self {
        Self::new(symbol).with_hgnc(hgnc_id)
    }

    /// Constructs a new GO node
    pub fn go_term(go_id: &str, description: &str) -> Self {
        Self::new(go_id).with_go(go_id).with_name(description)
    }

    /// Sets the `HGNC` attribute
    #[must_use]
    pub fn with_hgnc(mut self, hgnc_id: &str) -> Self {
        self.hgnc = Some(hgnc_id.to_string());
        self
    }

    /// Sets the `GO` attribute
    #[must_use]
    pub fn with_go(mut self, go_id: &str) -> Self {
        self.go = Some(go_id.to_string());
        self
    }

    /// Sets the `name` attribute
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// The label of the node in the graph and embedding space
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The HGNC identifier, if the node is a gene
    pub fn hgnc(&self) -> Option<&str> {
        self.hgnc.as_deref()
    }

    /// The GO identifier, if the node is a GO term
    pub fn go(&self) -> Option<&str> {
        self.go.as_deref()
    }

    /// The human readable description
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns `true` if the node belongs to the GO universe
    pub fn is_go_term(&self) -> bool {
        self.go.is_some()
    }

    /// Returns the HGNC identifier
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::MissingAttribute`] if the node is not a gene
    pub fn try_hgnc(&self) -> GeneWalkResult<&str> {
        self.hgnc()
            .ok_or_else(|| GeneWalkError::MissingAttribute(self.label.clone(), HGNC_ATTRIBUTE))
    }

    /// Returns the description of the node
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::MissingAttribute`] if the node has no `name`
    pub fn try_name(&self) -> GeneWalkResult<&str> {
        self.name()
            .ok_or_else(|| GeneWalkError::MissingAttribute(self.label.clone(), NAME_ATTRIBUTE))
    }

    /// Copies all attributes that are present in `other`
    pub(crate) fn merge(&mut self, other: Node) {
        if other.hgnc.is_some() {
            self.hgnc = other.hgnc;
        }
        if other.go.is_some() {
            self.go = other.go;
        }
        if other.name.is_some() {
            self.name = other.name;
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
