use smallvec::SmallVec;

use crate::*;

/// Identifies a node in a [QuadTree].  Ids are only meaningful for the tree that handed them out, and are reused
/// once a node is discarded by a shake.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, derive_more::Display)]
#[display(fmt = "node#{}", _0)]
pub struct NodeId(pub(crate) usize);

pub(crate) struct Node {
    pub(crate) bounds: Aabb,
    pub(crate) depth: u32,
    /// Either no children, or all four quadrants: `[top-left, top-right, bottom-right, bottom-left]`.
    pub(crate) children: Option<[NodeId; 4]>,
    /// Only ever non-empty on leaves.
    pub(crate) items: SmallVec<[ItemHandle; 8]>,
}

impl Node {
    pub(crate) fn new(bounds: Aabb, depth: u32) -> Node {
        Node {
            bounds,
            depth,
            children: None,
            items: Default::default(),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// A read-only view of one node of a [QuadTree].
#[derive(Copy, Clone)]
pub struct NodeRef<'a> {
    pub(crate) id: NodeId,
    pub(crate) node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn bounds(&self) -> Aabb {
        self.node.bounds
    }

    pub fn depth(&self) -> u32 {
        self.node.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.node.children
    }

    /// Items held directly by this node.  Always empty for branches.
    pub fn items(&self) -> &'a [ItemHandle] {
        &self.node.items[..]
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("bounds", &self.node.bounds)
            .field("depth", &self.node.depth)
            .field("children", &self.node.children)
            .field("items", &self.node.items.len())
            .finish()
    }
}
