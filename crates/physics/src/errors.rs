use crate::{ActorId, ColliderId};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AabbError {
    #[error("Attempted to create an AABB which would have an invalid width or height")]
    AabbInvalidDims,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("max_depth must be at least 1")]
    ZeroMaxDepth,

    #[error("max_objects_per_node must be at least 1")]
    ZeroMaxObjects,

    #[error("Tile dimensions must be finite and positive, got {width}x{height}")]
    InvalidTileSize { width: f64, height: f64 },

    #[error("Gravity must be finite, got ({}, {})", .0.x, .0.y)]
    InvalidGravity(crate::V2),

    #[error("shake_interval must be at least 1 step")]
    ZeroShakeInterval,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShapeError {
    #[error("Convex polygons need at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Polygon vertices are collinear or have zero area")]
    DegeneratePolygon,

    #[error("Polygon is not convex")]
    NotConvex,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QuadTreeError {
    /// Items may live in more than one leaf, so removal has to go through the item's own parent list.
    #[error("Remove called on branch node {0}; only leaves hold items")]
    RemoveFromBranch(crate::NodeId),

    #[error("Item handle {0} does not refer to an item in this tree")]
    UnknownItem(crate::ItemHandle),

    #[error("Node {0} does not exist in this tree")]
    UnknownNode(crate::NodeId),
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NarrowPhaseError {
    #[error("A collision pair needs two distinct colliders, got {0} twice")]
    IdenticalColliders(ColliderId),
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorldError {
    #[error("This world already has a broad phase attached")]
    BroadPhaseAlreadyAttached,

    #[error("Actor {0} is not in this world")]
    UnknownActor(ActorId),

    #[error("Time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f64),

    #[error("Integrating {0} gave a non-finite position or velocity")]
    NonFinitePosition(ActorId),
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("AAbb error: {0}")]
    Aabb(#[from] AabbError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Quadtree error: {0}")]
    QuadTree(#[from] QuadTreeError),

    #[error("Narrow phase error: {0}")]
    NarrowPhase(#[from] NarrowPhaseError),

    #[error("World error: {0}")]
    World(#[from] WorldError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
