//! 2D collision detection and a small world to drive it.
//!
//! The broad phase is either a [QuadTree] of actors or a [TileGrid] of static tiles.  Candidates from the broad phase
//! are resolved either by axis-aligned push-out, or by a separating axis test when both sides supply a convex
//! [Shape].

mod aabb;
mod actor;
mod broad_phase;
mod errors;
mod narrow_phase;
mod quadtree;
mod shape;
mod tile_grid;
mod v2;
mod world;

pub use aabb::*;
pub use actor::*;
pub use broad_phase::*;
pub use errors::*;
pub use narrow_phase::*;
pub use quadtree::*;
pub use shape::*;
pub use tile_grid::*;
pub use v2::*;
pub use world::*;
