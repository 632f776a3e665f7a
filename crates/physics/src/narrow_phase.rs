//! Exact overlap tests between pairs of convex shapes.
//!
//! This is a separating axis test restricted to the face normals of the two shapes.  For each face of the reference
//! shape we find the vertex of the other shape which reaches deepest through that face.  A positive distance means
//! the face's normal separates the shapes; otherwise the face whose distance is closest to zero is the reference
//! shape's best guess at the axis of least penetration.  Running this once from each side and taking the shallower
//! result gives the minimum translation vector.
//!
//! Shapes which exactly touch are not colliding: a distance of zero separates.
use smallvec::SmallVec;

use crate::errors::*;
use crate::*;

/// Identifies one side of a collision, so that results can be routed back to whatever owns the shape.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ColliderId {
    Actor(ActorId),
    Tile(TileCoord),
    /// For shapes owned by something other than a [World].
    User(u64),
}

impl std::fmt::Display for ColliderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColliderId::Actor(a) => write!(f, "{}", a),
            ColliderId::Tile(t) => write!(f, "tile({}, {})", t.x, t.y),
            ColliderId::User(u) => write!(f, "user#{}", u),
        }
    }
}

/// A shape in world space, with an identity.
#[derive(Debug)]
pub struct Collider<'a, S = Shape> {
    pub id: ColliderId,
    pub shape: &'a S,
}

impl<'a, S> Collider<'a, S> {
    pub fn new(id: ColliderId, shape: &'a S) -> Collider<'a, S> {
        Collider { id, shape }
    }
}

impl<S> Clone for Collider<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Collider<'_, S> {}

/// Two distinct colliders.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CollisionPair {
    a: ColliderId,
    b: ColliderId,
}

impl CollisionPair {
    pub fn new(a: ColliderId, b: ColliderId) -> Result<CollisionPair, NarrowPhaseError> {
        if a == b {
            return Err(NarrowPhaseError::IdenticalColliders(a));
        }

        Ok(CollisionPair { a, b })
    }

    pub fn get_a(&self) -> ColliderId {
        self.a
    }

    pub fn get_b(&self) -> ColliderId {
        self.b
    }

    #[must_use = "This returns a new pair"]
    pub fn swapped(&self) -> CollisionPair {
        CollisionPair {
            a: self.b,
            b: self.a,
        }
    }
}

/// The result of a successful narrow phase test.
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pair: CollisionPair,
    /// Unit vector pointing from `a` toward `b`.
    axis: V2,
    /// How far `a` must move against `axis` (or `b` along it) to separate the shapes.  Always positive.
    depth: f64,
    /// The vertices of `b` which reach deepest into `a`.
    points: SmallVec<[V2; 2]>,
}

impl Contact {
    pub fn new(
        a: ColliderId,
        b: ColliderId,
        axis: V2,
        depth: f64,
        points: impl IntoIterator<Item = V2>,
    ) -> Result<Contact, NarrowPhaseError> {
        Ok(Contact {
            pair: CollisionPair::new(a, b)?,
            axis,
            depth,
            points: points.into_iter().take(2).collect(),
        })
    }

    pub fn get_pair(&self) -> CollisionPair {
        self.pair
    }

    pub fn get_axis(&self) -> V2 {
        self.axis
    }

    pub fn get_depth(&self) -> f64 {
        self.depth
    }

    pub fn get_points(&self) -> &[V2] {
        &self.points[..]
    }

    /// The minimum translation vector: `axis * depth`.
    pub fn mtv(&self) -> V2 {
        self.axis * self.depth
    }
}

/// Find the face of `reference` with the largest signed distance to `incident`.
///
/// Returns `None` as soon as any face separates the shapes.
fn least_penetrating_face<R, I>(reference: &R, incident: &I) -> Option<(f64, V2)>
where
    R: ConvexShape + ?Sized,
    I: ConvexShape + ?Sized,
{
    let mut best: Option<(f64, V2)> = None;

    for i in 0..reference.vertex_count() {
        let normal = reference.face_normal(i);
        let deepest = incident.support(-normal);
        let distance = normal.dot(&(deepest - reference.vertex(i)));

        if distance >= 0.0 {
            return None;
        }

        if best.map_or(true, |(d, _)| distance > d) {
            best = Some((distance, normal));
        }
    }

    best
}

/// The one or two vertices of `shape` reaching farthest against `axis`.
fn deepest_points<S: ConvexShape + ?Sized>(shape: &S, axis: V2) -> SmallVec<[V2; 2]> {
    let mut points = SmallVec::<[V2; 2]>::new();
    let mut best = f64::INFINITY;

    for i in 0..shape.vertex_count() {
        let v = shape.vertex(i);
        let d = v.dot(&axis);
        if d < best {
            best = d;
            points.clear();
            points.push(v);
        } else if d == best && points.len() < 2 {
            points.push(v);
        }
    }

    points
}

/// Axis (pointing from `a` toward `b`) and depth of the shallowest penetration, if the shapes overlap.
fn separating_axis_test<A, B>(a: &A, b: &B) -> Option<(V2, f64)>
where
    A: ConvexShape + ?Sized,
    B: ConvexShape + ?Sized,
{
    let (dist_a, axis_a) = least_penetrating_face(a, b)?;
    let (dist_b, axis_b) = least_penetrating_face(b, a)?;

    // Both distances are negative; the one closer to zero is the true minimum.  Ties go to b, flipped to point from
    // a toward b.
    if dist_a > dist_b {
        Some((axis_a, -dist_a))
    } else {
        Some((-axis_b, -dist_b))
    }
}

/// Test two colliders for overlap.
///
/// Returns `Ok(None)` if they don't overlap, and an error if both colliders have the same id.  Swapping the arguments
/// gives exactly the negated axis and the same depth.
pub fn resolve<A, B>(a: &Collider<A>, b: &Collider<B>) -> Result<Option<Contact>, NarrowPhaseError>
where
    A: ConvexShape,
    B: ConvexShape,
{
    let pair = CollisionPair::new(a.id, b.id)?;

    // Faces can tie on depth, and the winner of a tie depends on which shape is the reference.  Always testing from
    // the lower id makes the answer independent of argument order.
    let found = if a.id < b.id {
        separating_axis_test(a.shape, b.shape)
    } else {
        separating_axis_test(b.shape, a.shape).map(|(axis, depth)| (-axis, depth))
    };

    Ok(found.map(|(axis, depth)| Contact {
        pair,
        axis,
        depth,
        points: deepest_points(b.shape, axis),
    }))
}
