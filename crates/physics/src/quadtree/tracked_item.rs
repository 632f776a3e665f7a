use std::cell::Cell;

use smallvec::SmallVec;

use crate::*;

/// Identifies an item tracked by a [QuadTree].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, derive_more::Display)]
#[display(fmt = "item#{}", _0)]
pub struct ItemHandle(pub(crate) usize);

/// Wraps a stored value with the leaves it currently lives in.
///
/// An item whose bounds straddle a quadrant boundary is in more than one leaf, so every traversal which reports items
/// has to deduplicate.  Each traversal takes a fresh generation from the tree and stamps items as it emits them; an
/// item already stamped with the current generation is skipped.
pub(crate) struct TrackedItem<T> {
    pub(crate) value: T,
    pub(crate) bounds: Aabb,
    pub(crate) parents: SmallVec<[NodeId; 4]>,
    last_seen: Cell<u64>,
}

impl<T> TrackedItem<T> {
    pub(crate) fn new(value: T, bounds: Aabb) -> TrackedItem<T> {
        TrackedItem {
            value,
            bounds,
            parents: Default::default(),
            // Generations handed out by the tree start at 1.
            last_seen: Cell::new(0),
        }
    }

    /// Returns true the first time this is called for a given generation.
    pub(crate) fn mark_seen(&self, generation: u64) -> bool {
        if self.last_seen.get() == generation {
            return false;
        }

        self.last_seen.set(generation);
        true
    }

    pub(crate) fn detach_from(&mut self, node: NodeId) {
        self.parents.retain(|p| *p != node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_once_per_generation() {
        let b = Aabb::from_points(V2::new(0.0, 0.0), V2::new(1.0, 1.0)).unwrap();
        let item = TrackedItem::new((), b);
        assert!(item.mark_seen(1));
        assert!(!item.mark_seen(1));
        assert!(item.mark_seen(2));
        assert!(!item.mark_seen(2));
    }

    #[test]
    fn detaching_only_removes_one_parent() {
        let b = Aabb::from_points(V2::new(0.0, 0.0), V2::new(1.0, 1.0)).unwrap();
        let mut item = TrackedItem::new((), b);
        item.parents.extend([NodeId(1), NodeId(2), NodeId(3)]);
        item.detach_from(NodeId(2));
        assert_eq!(&item.parents[..], &[NodeId(1), NodeId(3)]);
    }
}
