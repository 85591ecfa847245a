//! Planar parallelogram primitive, and boxes assembled from six of them.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use lumen_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// Rays this close to parallel with the plane are treated as misses.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A parallelogram spanned by two edges from a corner point.
pub struct Quad {
    /// Corner the edges start from
    q: Vec3,
    /// First edge
    u: Vec3,
    /// Second edge
    v: Vec3,
    /// Unit plane normal (zero for degenerate quads)
    normal: Vec3,
    /// Plane offset: normal . p = d
    d: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    /// Create a quad from corner `q` and edges `u`, `v`.
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        // A zero normal makes every ray "parallel", so degenerate quads never hit
        let normal = u.cross(v).normalize_or_zero();
        let d = normal.dot(q);

        // Box of both diagonals covers all four corners
        let bbox = Aabb::merge(
            &Aabb::from_points(q, q + u + v),
            &Aabb::from_points(q + u, q + v),
        );

        Self {
            q,
            u,
            v,
            normal,
            d,
            material,
            bbox,
        }
    }

    /// Six faces of an axis-aligned box centred at `center`, sharing one material.
    pub fn cube(
        center: Vec3,
        width: f32,
        height: f32,
        depth: f32,
        material: Arc<dyn Material>,
    ) -> [Quad; 6] {
        let half = Vec3::new(width, height, depth) / 2.0;
        let min = center - half;
        let max = center + half;

        let dx = Vec3::new(width, 0.0, 0.0);
        let dy = Vec3::new(0.0, height, 0.0);
        let dz = Vec3::new(0.0, 0.0, depth);

        [
            // Front (-z) and back (+z)
            Quad::new(min, dx, dy, material.clone()),
            Quad::new(Vec3::new(min.x, min.y, max.z), dx, dy, material.clone()),
            // Bottom (-y) and top (+y)
            Quad::new(min, dx, dz, material.clone()),
            Quad::new(Vec3::new(min.x, max.y, min.z), dx, dz, material.clone()),
            // Left (-x) and right (+x)
            Quad::new(min, dy, dz, material.clone()),
            Quad::new(Vec3::new(max.x, min.y, min.z), dy, dz, material),
        ]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Express `p` (on the plane) in the (u, v) edge basis.
    ///
    /// Solves the 2x2 Gram system, so edges need not be orthogonal.
    fn planar_coordinates(&self, p: Vec3) -> Option<(f32, f32)> {
        let w = p - self.q;

        let uu = self.u.dot(self.u);
        let uv = self.u.dot(self.v);
        let vv = self.v.dot(self.v);
        let wu = w.dot(self.u);
        let wv = w.dot(self.v);

        let denom = uv * uv - uu * vv;
        if denom == 0.0 {
            return None;
        }

        let alpha = (uv * wv - vv * wu) / denom;
        let beta = (uv * wu - uu * wv) / denom;
        Some((alpha, beta))
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = self.normal.dot(ray.direction());

        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let (alpha, beta) = self.planar_coordinates(ray.at(t))?;
        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.normal,
            (alpha, beta),
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
