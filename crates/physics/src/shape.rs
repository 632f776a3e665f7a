//! Convex shapes for the narrow phase.
//!
//! A shape is one of the concrete shape types behind an enum for collision detection.  Everything the separating
//! axis test needs is exposed through [ConvexShape].
use smallvec::SmallVec;

use crate::errors::*;
use crate::*;

/// A convex polygonal shape in world space.
///
/// Faces are numbered by their first vertex: face `i` runs from vertex `i` to vertex `i + 1` (wrapping), and its
/// normal points out of the shape.
pub trait ConvexShape {
    fn vertex_count(&self) -> usize;

    fn vertex(&self, index: usize) -> V2;

    /// Outward unit normal of face `index`.
    fn face_normal(&self, index: usize) -> V2;

    /// The vertex farthest along `direction`.
    fn support(&self, direction: V2) -> V2 {
        let mut best = self.vertex(0);
        let mut best_dist = best.dot(&direction);
        for i in 1..self.vertex_count() {
            let v = self.vertex(i);
            let d = v.dot(&direction);
            if d > best_dist {
                best = v;
                best_dist = d;
            }
        }
        best
    }

    fn bounding_box(&self) -> Aabb {
        let first = self.vertex(0);
        let (mut lo, mut hi) = (first, first);
        for i in 1..self.vertex_count() {
            let v = self.vertex(i);
            lo = V2::new(lo.x.min(v.x), lo.y.min(v.y));
            hi = V2::new(hi.x.max(v.x), hi.y.max(v.y));
        }
        Aabb::from_points(lo, hi).expect("Convex shapes always have a non-zero area")
    }
}

impl ConvexShape for Aabb {
    fn vertex_count(&self) -> usize {
        4
    }

    fn vertex(&self, index: usize) -> V2 {
        self.corners()[index]
    }

    fn face_normal(&self, index: usize) -> V2 {
        // Corners wind counter-clockwise (y up), starting at the minimum corner.
        const NORMALS: [V2; 4] = [
            V2 { x: 0.0, y: -1.0 },
            V2 { x: 1.0, y: 0.0 },
            V2 { x: 0.0, y: 1.0 },
            V2 { x: -1.0, y: 0.0 },
        ];
        NORMALS[index]
    }

    fn support(&self, direction: V2) -> V2 {
        let p1 = self.get_p1();
        let p2 = self.get_p2();
        V2::new(
            if direction.x > 0.0 { p2.x } else { p1.x },
            if direction.y > 0.0 { p2.y } else { p1.y },
        )
    }

    fn bounding_box(&self) -> Aabb {
        *self
    }
}

/// A convex polygon, stored counter-clockwise with precomputed face normals.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    vertices: SmallVec<[V2; 8]>,
    normals: SmallVec<[V2; 8]>,
}

impl ConvexPolygon {
    /// Build a polygon from vertices in either winding order.
    ///
    /// Fails if there are fewer than 3 vertices, the area is zero, or the polygon isn't convex.
    pub fn new(vertices: impl IntoIterator<Item = V2>) -> Result<ConvexPolygon, ShapeError> {
        let mut vertices: SmallVec<[V2; 8]> = vertices.into_iter().collect();
        let n = vertices.len();
        if n < 3 {
            return Err(ShapeError::TooFewVertices(n));
        }

        let twice_area: f64 = (0..n)
            .map(|i| vertices[i].cross(&vertices[(i + 1) % n]))
            .sum();
        if twice_area == 0.0 || !twice_area.is_finite() {
            return Err(ShapeError::DegeneratePolygon);
        }
        if twice_area < 0.0 {
            vertices.reverse();
        }

        // Every turn must be to the left once the winding is counter-clockwise.
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let c = vertices[(i + 2) % n];
            if (b - a).cross(&(c - b)) < 0.0 {
                return Err(ShapeError::NotConvex);
            }
        }

        let normals = (0..n)
            .map(|i| {
                let edge = vertices[(i + 1) % n] - vertices[i];
                V2::new(edge.y, -edge.x).normalize()
            })
            .collect::<SmallVec<[V2; 8]>>();
        if normals.iter().any(|n| !n.is_finite()) {
            // Repeated vertices give zero-length edges.
            return Err(ShapeError::DegeneratePolygon);
        }

        Ok(ConvexPolygon { vertices, normals })
    }

    /// A box centered on `center`.
    pub fn rectangle(center: V2, half_extents: V2) -> Result<ConvexPolygon, ShapeError> {
        let (hx, hy) = (half_extents.x, half_extents.y);
        ConvexPolygon::new([
            center + V2::new(-hx, -hy),
            center + V2::new(hx, -hy),
            center + V2::new(hx, hy),
            center + V2::new(-hx, hy),
        ])
    }

    pub fn vertices(&self) -> &[V2] {
        &self.vertices[..]
    }

    #[must_use = "This doesn't mutate the polygon in-place"]
    pub fn translate(&self, offset: V2) -> ConvexPolygon {
        ConvexPolygon {
            vertices: self.vertices.iter().map(|v| *v + offset).collect(),
            normals: self.normals.clone(),
        }
    }
}

impl ConvexShape for ConvexPolygon {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, index: usize) -> V2 {
        self.vertices[index]
    }

    fn face_normal(&self, index: usize) -> V2 {
        self.normals[index]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Aabb(Aabb),
    Polygon(ConvexPolygon),
}

impl Shape {
    pub fn get_bounding_box(&self) -> Aabb {
        ConvexShape::bounding_box(self)
    }

    #[must_use = "This doesn't mutate the shape in-place"]
    pub fn translate(&self, offset: V2) -> Shape {
        match self {
            Shape::Aabb(ref a) => Shape::Aabb(a.translate(offset)),
            Shape::Polygon(ref p) => Shape::Polygon(p.translate(offset)),
        }
    }
}

impl ConvexShape for Shape {
    fn vertex_count(&self) -> usize {
        match self {
            Shape::Aabb(ref a) => a.vertex_count(),
            Shape::Polygon(ref p) => p.vertex_count(),
        }
    }

    fn vertex(&self, index: usize) -> V2 {
        match self {
            Shape::Aabb(ref a) => a.vertex(index),
            Shape::Polygon(ref p) => p.vertex(index),
        }
    }

    fn face_normal(&self, index: usize) -> V2 {
        match self {
            Shape::Aabb(ref a) => a.face_normal(index),
            Shape::Polygon(ref p) => p.face_normal(index),
        }
    }

    fn support(&self, direction: V2) -> V2 {
        match self {
            Shape::Aabb(ref a) => a.support(direction),
            Shape::Polygon(ref p) => p.support(direction),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Aabb(ref a) => *a,
            Shape::Polygon(ref p) => p.bounding_box(),
        }
    }
}

impl From<Aabb> for Shape {
    fn from(other: Aabb) -> Shape {
        Shape::Aabb(other)
    }
}

impl From<ConvexPolygon> for Shape {
    fn from(other: ConvexPolygon) -> Shape {
        Shape::Polygon(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn winding_is_normalised() {
        let cw = ConvexPolygon::new([
            V2::new(0.0, 0.0),
            V2::new(0.0, 1.0),
            V2::new(1.0, 1.0),
            V2::new(1.0, 0.0),
        ])
        .unwrap();

        // The centroid is on the inside of every face.
        let centroid = V2::new(0.5, 0.5);
        for i in 0..cw.vertex_count() {
            let to_center = centroid - cw.vertex(i);
            assert!(cw.face_normal(i).dot(&to_center) < 0.0);
            assert_relative_eq!(cw.face_normal(i).length(), 1.0);
        }
    }

    #[test]
    fn bad_polygons_are_rejected() {
        assert!(matches!(
            ConvexPolygon::new([V2::new(0.0, 0.0), V2::new(1.0, 0.0)]),
            Err(ShapeError::TooFewVertices(2))
        ));
        assert!(matches!(
            ConvexPolygon::new([V2::new(0.0, 0.0), V2::new(1.0, 0.0), V2::new(2.0, 0.0)]),
            Err(ShapeError::DegeneratePolygon)
        ));
        // An arrowhead.
        assert!(matches!(
            ConvexPolygon::new([
                V2::new(0.0, 0.0),
                V2::new(2.0, 1.0),
                V2::new(0.0, 2.0),
                V2::new(1.0, 1.0),
            ]),
            Err(ShapeError::NotConvex)
        ));
    }

    #[test]
    fn aabb_matches_its_polygon() {
        let aabb = Aabb::from_points(V2::new(-1.0, -2.0), V2::new(3.0, 4.0)).unwrap();
        let poly = ConvexPolygon::new(aabb.corners()).unwrap();

        for i in 0..4 {
            assert_eq!(aabb.vertex(i), poly.vertex(i));
            assert_relative_eq!(aabb.face_normal(i).x, poly.face_normal(i).x);
            assert_relative_eq!(aabb.face_normal(i).y, poly.face_normal(i).y);
        }

        for dir in [V2::new(1.0, 1.0), V2::new(-1.0, 0.5), V2::new(0.3, -2.0)] {
            assert_eq!(aabb.support(dir), poly.support(dir));
        }
        assert_eq!(poly.bounding_box(), aabb);
    }

    #[test]
    fn triangle_support() {
        let tri = Shape::from(
            ConvexPolygon::new([V2::new(0.0, 0.0), V2::new(4.0, 0.0), V2::new(0.0, 3.0)]).unwrap(),
        );
        assert_eq!(tri.support(V2::new(1.0, 0.0)), V2::new(4.0, 0.0));
        assert_eq!(tri.support(V2::new(0.0, 1.0)), V2::new(0.0, 3.0));
        assert_eq!(tri.support(V2::new(-1.0, -1.0)), V2::new(0.0, 0.0));

        let moved = tri.translate(V2::new(1.0, 1.0));
        assert_eq!(
            moved.get_bounding_box(),
            Aabb::from_points(V2::new(1.0, 1.0), V2::new(5.0, 4.0)).unwrap()
        );
    }
}
