//! An axis-aligned bounding box.
use crate::errors::*;
use crate::*;

/// An axis-aligned bounding box is specified by its minimum corner and a width/height vector.
///
/// With y growing downward the minimum corner is the top-left one, which is how quadrants are named throughout the
/// crate.  Boxes can never be a single point or line.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Aabb {
    p1: V2,
    /// width-height
    wh: V2,
}

fn valid_dims(wh: &V2) -> bool {
    wh.x > 0.0 && wh.y > 0.0 && wh.is_finite()
}

impl Aabb {
    pub fn from_points(p1: V2, p2: V2) -> Result<Aabb, AabbError> {
        if !(p1.x < p2.x && p1.y < p2.y) || !p1.is_finite() {
            return Err(AabbError::AabbInvalidDims);
        }

        let wh = p2 - p1;
        if !valid_dims(&wh) {
            return Err(AabbError::AabbInvalidDims);
        }
        Ok(Aabb { p1, wh })
    }

    pub fn from_position_size(position: V2, size: V2) -> Result<Aabb, AabbError> {
        if !valid_dims(&size) || !position.is_finite() {
            return Err(AabbError::AabbInvalidDims);
        }

        Ok(Aabb { p1: position, wh: size })
    }

    pub fn from_center_half_extents(center: V2, half_extents: V2) -> Result<Aabb, AabbError> {
        Aabb::from_position_size(center - half_extents, half_extents * 2.0)
    }

    pub fn get_p1(&self) -> V2 {
        self.p1
    }

    pub fn get_p2(&self) -> V2 {
        self.p1 + self.wh
    }

    pub fn get_size(&self) -> V2 {
        self.wh
    }

    pub fn get_width(&self) -> f64 {
        self.wh.x
    }

    pub fn get_height(&self) -> f64 {
        self.wh.y
    }

    pub fn get_half_width(&self) -> f64 {
        self.get_width() / 2.0
    }

    pub fn get_half_height(&self) -> f64 {
        self.get_height() / 2.0
    }

    pub fn get_center(&self) -> V2 {
        V2 {
            x: self.p1.x + self.get_half_width(),
            y: self.p1.y + self.get_half_height(),
        }
    }

    /// Do the boxes overlap with a non-zero area?  Boxes which only share an edge do not.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let a2 = self.get_p2();
        let b2 = other.get_p2();
        self.p1.x < b2.x && other.p1.x < a2.x && self.p1.y < b2.y && other.p1.y < a2.y
    }

    /// Is `other` entirely inside this box?  Shared edges count as inside.
    pub fn contains(&self, other: &Aabb) -> bool {
        let a2 = self.get_p2();
        let b2 = other.get_p2();
        other.p1.x >= self.p1.x && other.p1.y >= self.p1.y && b2.x <= a2.x && b2.y <= a2.y
    }

    /// Half-open containment: the minimum edges are inside, the maximum edges are not.
    pub fn contains_point(&self, point: &V2) -> bool {
        let p2 = self.get_p2();
        point.x >= self.p1.x && point.x < p2.x && point.y >= self.p1.y && point.y < p2.y
    }

    /// The rectangle shared by both boxes, if they [intersect](Self::intersects).
    pub fn overlap(&self, other: &Aabb) -> Option<Aabb> {
        if !self.intersects(other) {
            return None;
        }

        let a2 = self.get_p2();
        let b2 = other.get_p2();
        let p1 = V2::new(self.p1.x.max(other.p1.x), self.p1.y.max(other.p1.y));
        let p2 = V2::new(a2.x.min(b2.x), a2.y.min(b2.y));
        // Strict intersection guarantees a positive size, but floating point may still round it away.
        Aabb::from_points(p1, p2).ok()
    }

    /// Split this box about its center, returning `[top-left, top-right, bottom-right, bottom-left]`.
    pub fn quadrants(&self) -> [Aabb; 4] {
        let half = self.wh * 0.5;
        let c = self.p1 + half;
        let quad = |p1: V2| Aabb { p1, wh: half };
        [
            quad(self.p1),
            quad(V2::new(c.x, self.p1.y)),
            quad(c),
            quad(V2::new(self.p1.x, c.y)),
        ]
    }

    /// The four corners in counter-clockwise order when y grows upward, starting from the minimum corner.
    pub fn corners(&self) -> [V2; 4] {
        let p2 = self.get_p2();
        [
            self.p1,
            V2::new(p2.x, self.p1.y),
            p2,
            V2::new(self.p1.x, p2.y),
        ]
    }

    #[must_use = "This doesn't mutate the Aabb in-place"]
    pub fn translate(&self, offset: V2) -> Aabb {
        Aabb {
            p1: self.p1 + offset,
            wh: self.wh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn b(x: f64, y: f64, w: f64, h: f64) -> Aabb {
        Aabb::from_position_size(V2::new(x, y), V2::new(w, h)).unwrap()
    }

    #[test]
    fn test_basic() -> crate::Result<()> {
        let b = Aabb::from_points(V2::new(1.0, 1.0), V2::new(3.0, 5.0))?;
        assert_relative_eq!(b.get_width(), 2.0);
        assert_relative_eq!(b.get_height(), 4.0);
        assert_relative_eq!(b.get_half_width(), 1.0);
        assert_relative_eq!(b.get_half_height(), 2.0);
        assert_eq!(b.get_center(), V2::new(2.0, 3.0));
        Ok(())
    }

    #[test]
    fn degenerate_boxes_are_rejected() {
        assert!(Aabb::from_points(V2::new(1.0, 1.0), V2::new(1.0, 5.0)).is_err());
        assert!(Aabb::from_points(V2::new(3.0, 1.0), V2::new(1.0, 5.0)).is_err());
        assert!(Aabb::from_position_size(V2::new(0.0, 0.0), V2::new(0.0, 1.0)).is_err());
        assert!(Aabb::from_position_size(V2::new(0.0, 0.0), V2::new(f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = b(0.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&b(1.0, 0.0, 1.0, 1.0)));
        assert!(a.intersects(&b(0.999, 0.999, 1.0, 1.0)));
        assert!(a.overlap(&b(1.0, 0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn point_containment_is_half_open() {
        let a = b(0.0, 0.0, 2.0, 1.0);
        assert!(a.contains_point(&V2::new(0.0, 0.0)));
        assert!(a.contains_point(&V2::new(1.999, 0.5)));
        assert!(!a.contains_point(&V2::new(2.0, 0.5)));
        assert!(!a.contains_point(&V2::new(1.0, 1.0)));
        assert!(!a.contains_point(&V2::new(-0.001, 0.5)));
    }

    #[test]
    fn from_center() {
        let a = Aabb::from_center_half_extents(V2::new(1.0, -2.0), V2::new(0.5, 3.0)).unwrap();
        assert_eq!(a, b(0.5, -5.0, 1.0, 6.0));
        assert_eq!(a.get_center(), V2::new(1.0, -2.0));
        assert!(Aabb::from_center_half_extents(V2::ZERO, V2::new(-1.0, 1.0)).is_err());
    }

    #[test]
    fn overlap_rectangle() {
        let o = b(0.0, 0.0, 4.0, 4.0).overlap(&b(3.0, 1.0, 4.0, 1.0)).unwrap();
        assert_eq!(o, b(3.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn quadrants_cover_the_box() {
        let parent = b(-10.0, -15.0, 20.0, 30.0);
        let [tl, tr, br, bl] = parent.quadrants();
        assert_eq!(tl, b(-10.0, -15.0, 10.0, 15.0));
        assert_eq!(tr, b(0.0, -15.0, 10.0, 15.0));
        assert_eq!(br, b(0.0, 0.0, 10.0, 15.0));
        assert_eq!(bl, b(-10.0, 0.0, 10.0, 15.0));
        for q in parent.quadrants() {
            assert!(parent.contains(&q));
        }
    }

    proptest! {
        #[test]
        fn intersection_is_symmetric(
            x1 in -100.0..100.0f64, y1 in -100.0..100.0f64, w1 in 0.1..50.0f64, h1 in 0.1..50.0f64,
            x2 in -100.0..100.0f64, y2 in -100.0..100.0f64, w2 in 0.1..50.0f64, h2 in 0.1..50.0f64,
        ) {
            let a = b(x1, y1, w1, h1);
            let c = b(x2, y2, w2, h2);
            prop_assert_eq!(a.intersects(&c), c.intersects(&a));
            prop_assert_eq!(a.overlap(&c).is_some(), a.intersects(&c));
        }
    }
}
