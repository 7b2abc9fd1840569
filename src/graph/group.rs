use std::ops::BitAnd;

use smallvec::SmallVec;

use crate::graph::NodeId;
use crate::DEFAULT_NUM_NEIGHBORS;

type Group = SmallVec<[NodeId; DEFAULT_NUM_NEIGHBORS]>;

/// A sorted set of [`NodeId`]s
///
/// Each node can occur only once in the group.
///
/// The group is used for the neighbors of a node and for the
/// GO universe of the [`Graph`](crate::Graph).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    ids: Group,
}

impl NodeGroup {
    /// Constructs a new, empty [`NodeGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`NodeGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Group::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`NodeId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`NodeId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`NodeId`] to the group
    ///
    /// Returns whether the `NodeId` was newly inserted. That is:
    ///
    /// - If the group did not previously contain this `NodeId`, true is returned.
    /// - If the group already contained this `NodeId`, false is returned.
    ///
    pub fn insert<I: Into<NodeId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Appends a [`NodeId`] without checking order or uniqueness
    ///
    /// Only use it with ids that are larger than every id in the group
    fn insert_unchecked(&mut self, id: NodeId) {
        self.ids.push(id);
    }

    /// Returns `true` if the group contains the [`NodeId`]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`NodeId`]s inside the group
    pub fn iter(&self) -> NodeIds<'_> {
        NodeIds::new(self.ids.iter())
    }
}

impl FromIterator<NodeId> for NodeGroup {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        let mut group = NodeGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl<'a> IntoIterator for &'a NodeGroup {
    type Item = NodeId;

    type IntoIter = NodeIds<'a>;

    fn into_iter(self) -> NodeIds<'a> {
        NodeIds::new(self.ids.iter())
    }
}

/// An iterator over [`NodeId`]s
pub struct NodeIds<'a> {
    inner: std::slice::Iter<'a, NodeId>,
}

impl<'a> NodeIds<'a> {
    fn new(inner: std::slice::Iter<'a, NodeId>) -> Self {
        Self { inner }
    }
}

impl Iterator for NodeIds<'_> {
    type Item = NodeId;
    fn next(&mut self) -> Option<NodeId> {
        self.inner.next().copied()
    }
}

impl BitAnd for &NodeGroup {
    type Output = NodeGroup;

    fn bitand(self, rhs: &NodeGroup) -> NodeGroup {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };

        let mut group = NodeGroup::with_capacity(small.len());
        // iterating the sorted `small` keeps the result sorted
        for id in small {
            if large.contains(&id) {
                group.insert_unchecked(id);
            }
        }
        group
    }
}
