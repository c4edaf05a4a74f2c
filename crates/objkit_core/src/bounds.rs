//! Axis-aligned bounding boxes for parsed geometry.

use glam::Vec3;

/// Axis-aligned bounding box defined by its min and max corners.
///
/// The empty box has `min = +inf` and `max = -inf`, so it is the identity
/// for [`Bounds::union`] and for point accumulation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// Create an empty box (contains nothing).
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut acc, p| {
            acc.min = acc.min.min(p);
            acc.max = acc.max.max(p);
            acc
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Center point. Meaningless for an empty box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis size, zero for an empty box.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Diagonal length.
    pub fn size(&self) -> f32 {
        self.extent().length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds() {
        let bounds = Bounds::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.size(), 0.0);
        assert!(Bounds::from_points(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_from_points() {
        let bounds = Bounds::from_points([
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::ZERO,
        ]);

        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(bounds.center(), Vec3::new(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let a = Bounds::from_points([Vec3::ZERO, Vec3::ONE]);
        assert_eq!(a.union(&Bounds::empty()), a);

        let b = Bounds::from_points([Vec3::splat(3.0), Vec3::splat(2.0)]);
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::splat(3.0));
    }
}
