use std::collections::HashMap;

use crate::errors::*;
use crate::*;

/// A broad phase which indexes actors in a [QuadTree].
pub struct QuadTreeBroadPhase {
    tree: QuadTree<ActorId>,
    handles: HashMap<ActorId, ItemHandle>,
}

impl QuadTreeBroadPhase {
    pub fn new(region: Aabb, config: QuadTreeConfig) -> Result<QuadTreeBroadPhase, ConfigError> {
        Ok(QuadTreeBroadPhase {
            tree: QuadTree::new(region, config)?,
            handles: Default::default(),
        })
    }

    pub fn tree(&self) -> &QuadTree<ActorId> {
        &self.tree
    }

    pub fn contains_actor(&self, actor: ActorId) -> bool {
        self.handles.contains_key(&actor)
    }
}

impl BroadPhase for QuadTreeBroadPhase {
    fn insert_actor(&mut self, actor: ActorId, bounds: Aabb) -> Result<()> {
        if self.handles.contains_key(&actor) {
            return self.update_actor(actor, bounds);
        }

        // Actors outside the region aren't indexed until they move into it.
        if let Some(h) = self.tree.insert(actor, bounds) {
            self.handles.insert(actor, h);
        }
        Ok(())
    }

    fn remove_actor(&mut self, actor: ActorId) -> Result<()> {
        if let Some(h) = self.handles.remove(&actor) {
            self.tree.remove(h)?;
        }
        Ok(())
    }

    fn update_actor(&mut self, actor: ActorId, bounds: Aabb) -> Result<()> {
        match self.handles.get(&actor) {
            Some(h) => {
                self.tree.update(*h, bounds)?;
            }
            None => {
                if let Some(h) = self.tree.insert(actor, bounds) {
                    self.handles.insert(actor, h);
                }
            }
        }
        Ok(())
    }

    fn candidates(&self, area: &Aabb, out: &mut Vec<Candidate>) {
        out.extend(
            self.tree
                .query(area)
                .into_iter()
                .map(|a| Candidate::Actor(*a)),
        );
    }

    fn maintain(&mut self) {
        self.tree.shake();
    }
}
