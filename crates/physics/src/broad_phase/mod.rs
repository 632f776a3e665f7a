//! Broad phases find things which might be touching an actor.
//!
//! A world has exactly one broad phase: either a [QuadTreeBroadPhase] indexing the actors themselves, or a [TileGrid]
//! of static level geometry.
mod quadtree;

pub use quadtree::*;

use crate::*;

/// Something a broad phase says might overlap the queried area.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Candidate {
    Actor(ActorId),
    Tile {
        coord: TileCoord,
        bounds: Aabb,
        flags: TileFlags,
    },
}

#[enum_dispatch::enum_dispatch(BroadPhaseKind)]
pub trait BroadPhase {
    /// Start tracking an actor.  Re-inserting a tracked actor moves it.
    fn insert_actor(&mut self, actor: ActorId, bounds: Aabb) -> Result<()>;

    /// Stop tracking an actor.  Unknown actors are ignored.
    fn remove_actor(&mut self, actor: ActorId) -> Result<()>;

    /// Tell the broad phase that an actor has moved.
    fn update_actor(&mut self, actor: ActorId, bounds: Aabb) -> Result<()>;

    /// Append everything which may overlap `area` to `out`.
    ///
    /// Actor candidates include the actor whose bounds were queried, if it is tracked.
    fn candidates(&self, area: &Aabb, out: &mut Vec<Candidate>);

    /// Periodic housekeeping, run by the world every few steps.
    fn maintain(&mut self) {}
}

#[enum_dispatch::enum_dispatch]
pub enum BroadPhaseKind {
    QuadTree(QuadTreeBroadPhase),
    TileGrid(TileGrid),
}

impl BroadPhase for TileGrid {
    // Tiles don't collide with each other, so the grid never indexes actors.
    fn insert_actor(&mut self, _actor: ActorId, _bounds: Aabb) -> Result<()> {
        Ok(())
    }

    fn remove_actor(&mut self, _actor: ActorId) -> Result<()> {
        Ok(())
    }

    fn update_actor(&mut self, _actor: ActorId, _bounds: Aabb) -> Result<()> {
        Ok(())
    }

    fn candidates(&self, area: &Aabb, out: &mut Vec<Candidate>) {
        let start = out.len();
        out.extend(
            self.tiles_overlapping(area)
                .map(|(coord, bounds, flags)| Candidate::Tile {
                    coord,
                    bounds,
                    flags,
                }),
        );
        // Row-major, so events come out in the same order from run to run.
        out[start..].sort_unstable_by_key(|c| match c {
            Candidate::Tile { coord, .. } => (coord.y, coord.x),
            Candidate::Actor(_) => (i32::MIN, i32::MIN),
        });
    }
}
