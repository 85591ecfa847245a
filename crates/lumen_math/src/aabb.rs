use crate::{Interval, MathError, MathResult, Ray, Vec3};

/// Minimum thickness of every box axis.
///
/// Planar primitives (quads) would otherwise produce zero-volume boxes.
pub const MIN_THICKNESS: f32 = 0.0001;

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Boxes built through the constructors always have `min <= max` on every
/// axis and are padded to [`MIN_THICKNESS`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(
            Interval::new(a.x, b.x),
            Interval::new(a.y, b.y),
            Interval::new(a.z, b.z),
        )
    }

    /// Like [`Aabb::from_points`], but rejects corners that cannot be
    /// ordered (any NaN component).
    pub fn try_from_points(a: Vec3, b: Vec3) -> MathResult<Self> {
        if a.is_nan() || b.is_nan() {
            return Err(MathError::InvalidBounds {
                min: a.to_array(),
                max: b.to_array(),
            });
        }
        Ok(Self::from_points(a, b))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn merge(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::merge(&box0.x, &box1.x),
            y: Interval::merge(&box0.y, &box1.y),
            z: Interval::merge(&box0.z, &box1.z),
        }
    }

    /// Union of every box in `boxes`. An empty collection is an error.
    pub fn merge_many<'a, I>(boxes: I) -> MathResult<Self>
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        let mut iter = boxes.into_iter();
        let first = *iter.next().ok_or(MathError::EmptyMerge)?;
        Ok(iter.fold(first, |acc, b| Aabb::merge(&acc, b)))
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True if `p` lies inside or on the box.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. A zero direction component divides to ±infinity and
    /// simply fails to tighten that axis; `0/0` yields NaN, which
    /// `f32::max`/`f32::min` discard in favour of the running bound.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let orig = r.origin[axis];

            let mut t0 = (slab.min - orig) * adinv;
            let mut t1 = (slab.max - orig) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        for interval in [&mut self.x, &mut self.y, &mut self.z] {
            if interval.size() < MIN_THICKNESS {
                *interval = interval.expand(MIN_THICKNESS);
            }
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// X wins only when strictly longest; otherwise Y beats Z only when
    /// strictly longer.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Contains nothing; the identity for [`Aabb::merge`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_box(rng: &mut StdRng) -> Aabb {
        let a = Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        let b = Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        Aabb::from_points(a, b)
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_try_from_points_rejects_nan() {
        let result = Aabb::try_from_points(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE);
        assert!(matches!(result, Err(MathError::InvalidBounds { .. })));

        assert!(Aabb::try_from_points(Vec3::ZERO, Vec3::ONE).is_ok());
    }

    #[test]
    fn test_aabb_pads_planar_box() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(aabb.z.size() > 0.0);
        assert!(aabb.z.contains(1.0));
        assert_eq!(aabb.x.size(), 1.0);
    }

    #[test]
    fn test_every_axis_has_minimum_thickness() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let p = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            // Degenerate in every axis
            let aabb = Aabb::from_points(p, p);
            for axis in 0..3 {
                let interval = aabb.axis_interval(axis);
                assert!(interval.max >= interval.min);
                // Allow for f32 rounding of the symmetric expansion
                assert!(interval.size() >= MIN_THICKNESS * 0.99);
            }
        }
    }

    #[test]
    fn test_aabb_merge() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let merged = Aabb::merge(&box1, &box2);

        assert_eq!(merged.min(), Vec3::ZERO);
        assert_eq!(merged.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_merge_is_smallest_enclosing_box() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            let m = Aabb::merge(&a, &b);

            for corner in [a.min(), a.max(), b.min(), b.max()] {
                assert!(m.contains_point(corner));
            }
            // Every face of the union touches one of the inputs
            assert_eq!(m.min(), a.min().min(b.min()));
            assert_eq!(m.max(), a.max().max(b.max()));
        }
    }

    #[test]
    fn test_merge_commutative_and_associative() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..200 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            let c = random_box(&mut rng);

            assert_eq!(Aabb::merge(&a, &b), Aabb::merge(&b, &a));
            assert_eq!(
                Aabb::merge(&Aabb::merge(&a, &b), &c),
                Aabb::merge(&a, &Aabb::merge(&b, &c))
            );
        }
    }

    #[test]
    fn test_merge_many() {
        let boxes = [
            Aabb::from_points(Vec3::ZERO, Vec3::ONE),
            Aabb::from_points(Vec3::splat(-2.0), Vec3::splat(-1.0)),
            Aabb::from_points(Vec3::splat(4.0), Vec3::splat(5.0)),
        ];
        let merged = Aabb::merge_many(&boxes).unwrap();
        assert_eq!(merged.min(), Vec3::splat(-2.0));
        assert_eq!(merged.max(), Vec3::splat(5.0));

        let none: [Aabb; 0] = [];
        assert_eq!(Aabb::merge_many(&none), Err(MathError::EmptyMerge));
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Box beyond the interval
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_hit_zero_direction_components() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Grazing along the x axis with no y/z motion, through the center
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, f32::INFINITY)));

        // Origin lying exactly on the y = 1 slab plane: 0/0 = NaN must not leak
        let ray = Ray::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let grazing = aabb.hit(&ray, Interval::new(0.0, f32::INFINITY));
        assert!(grazing);

        // Parallel to the y slabs but outside them
        let ray = Ray::new(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_aabb_longest_axis() {
        let aabb_x = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(aabb_x.longest_axis(), 0);

        let aabb_y = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb_y.longest_axis(), 1);

        let aabb_z = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(aabb_z.longest_axis(), 2);
    }

    #[test]
    fn test_aabb_longest_axis_ties() {
        // x ties y: x is not strictly longest, y not longer than z -> z
        let cube = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        assert_eq!(cube.longest_axis(), 2);

        // x ties y, both beat z -> y
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(4.0, 4.0, 1.0));
        assert_eq!(flat.longest_axis(), 1);
    }
}
