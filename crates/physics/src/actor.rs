//! Actors: the things a [crate::World] moves around.
use crate::errors::*;
use crate::*;

/// Identifies an actor within its world.
///
/// Ids are only unique among live actors.  Once an actor is despawned its id may be handed out again.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, derive_more::Display,
)]
#[display(fmt = "actor#{}", _0)]
pub struct ActorId(pub(crate) usize);

/// What an actor hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Collidee {
    Actor(ActorId),
    Tile { coord: TileCoord, flags: TileFlags },
}

/// Delivered to [Actor::on_collision] once per overlapping pair per step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    pub actor: ActorId,
    pub other: Collidee,

    /// How far the actor is into the other thing.  Subtracting this from the actor's position separates them.
    pub penetration: V2,
}

/// Anything which can live in a world.
///
/// The world only integrates positions and never interprets them: an actor's position is whatever point its bounds
/// and shape are laid out from.  For a box [Body] that is the top-left corner; for a polygonal one it is the origin of
/// the polygon's body space, which needn't be a corner or even inside the polygon.  The world's y axis grows
/// downward.
pub trait Actor {
    fn get_position(&self) -> V2;

    fn set_position(&mut self, position: V2);

    fn get_velocity(&self) -> V2;

    fn set_velocity(&mut self, velocity: V2);

    /// Bounds at the current position.
    fn get_bounds(&self) -> Aabb;

    /// A world-space convex shape.  When both sides of a pair have one, the pair is resolved with the separating axis
    /// test instead of box push-out.
    fn collision_shape(&self) -> Option<Shape> {
        None
    }

    /// Inactive actors are neither integrated nor tested, but others still collide with them.
    fn is_active(&self) -> bool {
        true
    }

    fn on_collision(&mut self, event: &CollisionEvent);
}

/// A simple rigid body which pushes itself out of whatever it hits.
#[derive(Debug, Clone)]
pub struct Body {
    position: V2,
    velocity: V2,
    /// Bounds relative to `position`.
    local_bounds: Aabb,
    /// Polygon relative to `position`.
    local_shape: Option<ConvexPolygon>,
    active: bool,
    collisions: Vec<CollisionEvent>,
}

impl Body {
    /// A box with its top-left corner at `position`.
    pub fn new(position: V2, size: V2) -> Result<Body, AabbError> {
        Ok(Body {
            position,
            velocity: V2::ZERO,
            local_bounds: Aabb::from_position_size(V2::ZERO, size)?,
            local_shape: None,
            active: true,
            collisions: vec![],
        })
    }

    /// A polygonal body.  `polygon` is in body space and is offset by `position`.
    pub fn from_polygon(position: V2, polygon: ConvexPolygon) -> Body {
        Body {
            position,
            velocity: V2::ZERO,
            local_bounds: polygon.bounding_box(),
            local_shape: Some(polygon),
            active: true,
            collisions: vec![],
        }
    }

    pub fn with_velocity(mut self, velocity: V2) -> Body {
        self.velocity = velocity;
        self
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Collisions seen since the last call.
    pub fn take_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.collisions)
    }
}

impl Actor for Body {
    fn get_position(&self) -> V2 {
        self.position
    }

    fn set_position(&mut self, position: V2) {
        self.position = position;
    }

    fn get_velocity(&self) -> V2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: V2) {
        self.velocity = velocity;
    }

    fn get_bounds(&self) -> Aabb {
        self.local_bounds.translate(self.position)
    }

    fn collision_shape(&self) -> Option<Shape> {
        self.local_shape
            .as_ref()
            .map(|p| Shape::Polygon(p.translate(self.position)))
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn on_collision(&mut self, event: &CollisionEvent) {
        self.position -= event.penetration;

        // Stop moving into whatever we hit, but keep sliding along it.
        let normal = event.penetration.normalize();
        if normal.is_finite() {
            let into = self.velocity.dot(&normal);
            if into > 0.0 {
                self.velocity -= normal * into;
            }
        }

        self.collisions.push(*event);
    }
}
