//! A quadtree over a fixed rectangular region, for finding things which might overlap a given box.
//!
//! Leaves split into four equal quadrants once they fill up, and [QuadTree::shake] merges under-populated subtrees
//! back together.  Items are inserted into every leaf their bounds overlap, so one item may live in several leaves at
//! once; [TrackedItem]s remember where they are so that removal never has to search the tree.
use std::cell::Cell;
use std::collections::VecDeque;

use log::*;
use slab::Slab;

use crate::errors::*;
use crate::*;

mod node;
mod tracked_item;

pub use node::*;
pub use tracked_item::ItemHandle;
pub(crate) use tracked_item::*;

/// Tuning for a [QuadTree].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct QuadTreeConfig {
    /// Nodes are never split into children at or beyond this depth.  The root is at depth 0.
    pub max_depth: u32,
    /// A leaf holding this many items splits before taking another.
    pub max_objects_per_node: usize,
}

impl QuadTreeConfig {
    pub const DEFAULT_MAX_DEPTH: u32 = 7;
    pub const DEFAULT_MAX_OBJECTS_PER_NODE: usize = 25;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroMaxDepth);
        }

        if self.max_objects_per_node == 0 {
            return Err(ConfigError::ZeroMaxObjects);
        }

        Ok(())
    }
}

impl Default for QuadTreeConfig {
    fn default() -> QuadTreeConfig {
        QuadTreeConfig {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_objects_per_node: Self::DEFAULT_MAX_OBJECTS_PER_NODE,
        }
    }
}

pub struct QuadTree<T> {
    config: QuadTreeConfig,
    root: NodeId,
    nodes: Slab<Node>,
    items: Slab<TrackedItem<T>>,
    /// Bumped at the start of every deduplicating traversal.
    generation: Cell<u64>,
}

impl<T> QuadTree<T> {
    pub fn new(bounds: Aabb, config: QuadTreeConfig) -> Result<QuadTree<T>, ConfigError> {
        config.validate()?;

        let mut nodes = Slab::new();
        let root = NodeId(nodes.insert(Node::new(bounds, 0)));
        Ok(QuadTree {
            config,
            root,
            nodes,
            items: Slab::new(),
            generation: Cell::new(0),
        })
    }

    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// The region covered by this tree.
    pub fn bounds(&self) -> Aabb {
        self.node_internal(self.root).bounds
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.get(id.0).map(|node| NodeRef { id, node })
    }

    /// Number of items tracked by the tree, including ones which have moved outside the region.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The depth of the deepest node currently allocated.
    pub fn max_node_depth(&self) -> u32 {
        self.nodes.iter().map(|(_, n)| n.depth).max().unwrap_or(0)
    }

    pub fn get(&self, handle: ItemHandle) -> Option<&T> {
        self.items.get(handle.0).map(|i| &i.value)
    }

    pub fn get_bounds(&self, handle: ItemHandle) -> Option<Aabb> {
        self.items.get(handle.0).map(|i| i.bounds)
    }

    /// The leaves this item currently lives in.
    pub fn item_parents(&self, handle: ItemHandle) -> Option<&[NodeId]> {
        self.items.get(handle.0).map(|i| &i.parents[..])
    }

    fn node_internal(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.0)
            .expect("Node ids held by the tree should always be live")
    }

    fn next_generation(&self) -> u64 {
        let g = self.generation.get() + 1;
        self.generation.set(g);
        g
    }

    /// Track `value` and insert it into every leaf which `bounds` overlaps.
    ///
    /// Bounds which don't overlap the tree's region at all are silently dropped, returning `None`.
    pub fn insert(&mut self, value: T, bounds: Aabb) -> Option<ItemHandle> {
        if !self.bounds().intersects(&bounds) {
            return None;
        }

        let handle = ItemHandle(self.items.insert(TrackedItem::new(value, bounds)));
        self.insert_into(self.root, handle);
        Some(handle)
    }

    fn insert_into(&mut self, node: NodeId, handle: ItemHandle) {
        let bounds = self.items[handle.0].bounds;
        let n = self.node_internal(node);
        if !n.bounds.intersects(&bounds) {
            return;
        }

        if n.is_leaf() && n.items.len() >= self.config.max_objects_per_node {
            self.split_node(node);
        }

        match self.nodes[node.0].children {
            None => {
                self.nodes[node.0].items.push(handle);
                self.items[handle.0].parents.push(node);
            }
            Some(children) => {
                for c in children {
                    self.insert_into(c, handle);
                }
            }
        }
    }

    /// Split a leaf into four quadrants, moving its items down into them.
    ///
    /// Does nothing to branches, or to leaves whose children would reach `max_depth`.
    pub fn split(&mut self, node: NodeId) -> Result<(), QuadTreeError> {
        if !self.nodes.contains(node.0) {
            return Err(QuadTreeError::UnknownNode(node));
        }

        self.split_node(node);
        Ok(())
    }

    fn split_node(&mut self, node: NodeId) {
        let (quadrants, depth) = {
            let n = self.node_internal(node);
            if !n.is_leaf() || n.depth + 1 >= self.config.max_depth {
                return;
            }
            (n.bounds.quadrants(), n.depth + 1)
        };

        let children = quadrants.map(|bounds| NodeId(self.nodes.insert(Node::new(bounds, depth))));
        let moving = std::mem::take(&mut self.nodes[node.0].items);
        self.nodes[node.0].children = Some(children);

        for h in moving.iter() {
            self.items[h.0].detach_from(node);
        }

        for h in moving.iter() {
            for c in children {
                self.insert_into(c, *h);
            }
        }

        trace!(
            "Split {} at depth {}, redistributing {} items",
            node,
            depth - 1,
            moving.len()
        );
    }

    /// Remove an item from one leaf.
    ///
    /// This is the leaf-level half of removal, and fails on branches.  Most callers want [Self::remove], which goes
    /// through every leaf the item is in.
    pub fn remove_from_node(
        &mut self,
        node: NodeId,
        handle: ItemHandle,
    ) -> Result<(), QuadTreeError> {
        let n = self
            .nodes
            .get_mut(node.0)
            .ok_or(QuadTreeError::UnknownNode(node))?;
        if !n.is_leaf() {
            return Err(QuadTreeError::RemoveFromBranch(node));
        }

        let item = self
            .items
            .get_mut(handle.0)
            .ok_or(QuadTreeError::UnknownItem(handle))?;
        n.items.retain(|h| *h != handle);
        item.detach_from(node);
        Ok(())
    }

    /// Stop tracking an item, removing it from every leaf it is in.
    pub fn remove(&mut self, handle: ItemHandle) -> Result<T, QuadTreeError> {
        let parents = self
            .items
            .get(handle.0)
            .ok_or(QuadTreeError::UnknownItem(handle))?
            .parents
            .clone();

        for p in parents {
            self.remove_from_node(p, handle)?;
        }

        Ok(self.items.remove(handle.0).value)
    }

    /// Move an item to new bounds.
    ///
    /// Returns whether the item is still inside the tree's region.  Items which leave the region stay tracked (and
    /// keep their handle) but are invisible to queries until they come back.
    pub fn update(&mut self, handle: ItemHandle, bounds: Aabb) -> Result<bool, QuadTreeError> {
        let parents = self
            .items
            .get(handle.0)
            .ok_or(QuadTreeError::UnknownItem(handle))?
            .parents
            .clone();

        for p in parents {
            self.remove_from_node(p, handle)?;
        }

        self.items[handle.0].bounds = bounds;
        self.insert_into(self.root, handle);
        Ok(!self.items[handle.0].parents.is_empty())
    }

    /// Visit every leaf under `start`, breadth first, calling `visit` with each item the first time it is seen.
    ///
    /// Subtrees whose bounds fail `descend` are skipped.
    fn visit_unique(
        &self,
        start: NodeId,
        mut descend: impl FnMut(&Aabb) -> bool,
        mut visit: impl FnMut(ItemHandle, &TrackedItem<T>),
    ) {
        let generation = self.next_generation();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            let n = self.node_internal(id);
            if !descend(&n.bounds) {
                continue;
            }

            match n.children {
                Some(children) => queue.extend(children),
                None => {
                    for h in n.items.iter() {
                        let item = &self.items[h.0];
                        if item.mark_seen(generation) {
                            visit(*h, item);
                        }
                    }
                }
            }
        }
    }

    fn count_unique(&self, start: NodeId) -> usize {
        let mut count = 0;
        self.visit_unique(start, |_| true, |_, _| count += 1);
        count
    }

    /// Number of distinct items reachable from the root.
    pub fn num_targets(&self) -> usize {
        self.count_unique(self.root)
    }

    /// Number of distinct items in the subtree under `node`.
    pub fn num_targets_in(&self, node: NodeId) -> Result<usize, QuadTreeError> {
        if !self.nodes.contains(node.0) {
            return Err(QuadTreeError::UnknownNode(node));
        }

        Ok(self.count_unique(node))
    }

    /// Every item whose bounds overlap `area`, each exactly once.
    pub fn query(&self, area: &Aabb) -> Vec<&T> {
        self.query_handles(area)
            .into_iter()
            .map(|h| &self.items[h.0].value)
            .collect()
    }

    /// Like [Self::query], but returning handles.
    pub fn query_handles(&self, area: &Aabb) -> Vec<ItemHandle> {
        let mut found = vec![];
        // Mark only items which pass the exact test, so that a miss in one leaf can't hide a hit elsewhere.
        let generation = self.next_generation();
        let mut queue = VecDeque::new();
        queue.push_back(self.root);

        while let Some(id) = queue.pop_front() {
            let n = self.node_internal(id);
            if !n.bounds.intersects(area) {
                continue;
            }

            match n.children {
                Some(children) => queue.extend(children),
                None => {
                    for h in n.items.iter() {
                        let item = &self.items[h.0];
                        if item.bounds.intersects(area) && item.mark_seen(generation) {
                            found.push(*h);
                        }
                    }
                }
            }
        }

        found
    }

    /// Collapse `node`'s subtree if it has become sparse.
    ///
    /// Empty subtrees are dropped, and subtrees holding fewer than `max_objects_per_node` distinct items are merged
    /// into `node`, which becomes a leaf.  Leaves and well-populated branches are left alone.
    pub fn shake_node(&mut self, node: NodeId) -> Result<(), QuadTreeError> {
        if !self.nodes.contains(node.0) {
            return Err(QuadTreeError::UnknownNode(node));
        }

        self.shake_node_internal(node);
        Ok(())
    }

    fn shake_node_internal(&mut self, node: NodeId) {
        if self.node_internal(node).is_leaf() {
            return;
        }

        let mut gathered = vec![];
        self.visit_unique(node, |_| true, |h, _| gathered.push(h));

        if gathered.len() >= self.config.max_objects_per_node {
            return;
        }

        self.discard_children(node);
        for h in gathered.iter() {
            self.nodes[node.0].items.push(*h);
            self.items[h.0].parents.push(node);
        }

        trace!("Collapsed {} into a leaf holding {} items", node, gathered.len());
    }

    /// Free every descendant of `node`, unhooking their items, and make `node` a leaf.
    fn discard_children(&mut self, node: NodeId) {
        let mut stack = match self.nodes[node.0].children.take() {
            Some(c) => c.to_vec(),
            None => return,
        };

        while let Some(id) = stack.pop() {
            let n = self.nodes.remove(id.0);
            if let Some(c) = n.children {
                stack.extend(c);
            }
            for h in n.items {
                self.items[h.0].detach_from(id);
            }
        }
    }

    /// Compact the whole tree: shake the root, then every node which survives as a branch.
    pub fn shake(&mut self) {
        let before = self.nodes.len();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            self.shake_node_internal(id);
            if let Some(c) = self.nodes[id.0].children {
                stack.extend(c);
            }
        }

        debug!(
            "Shook quadtree: {} nodes -> {} nodes, {} items",
            before,
            self.nodes.len(),
            self.items.len()
        );
    }
}
