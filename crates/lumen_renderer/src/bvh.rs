//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree built once over the scene's primitives. Each node splits
//! its slice at the median along the longest axis of its bounds; there is
//! no surface area heuristic, which keeps builds fast and deterministic.

use crate::{HitRecord, Hittable, HittableList, RenderError, RenderResult};
use lumen_math::{Aabb, Interval, Ray, Vec3Ext};
use std::cmp::Ordering;
use std::sync::Arc;

/// Internal BVH node with two children.
///
/// A slice of one primitive stores it as both children, so every node has
/// the same shape and traversal needs no leaf special case.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
    depth: usize,
    primitives: usize,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// Fails with [`RenderError::EmptyScene`] when there is nothing to bound.
    pub fn new(mut objects: Vec<Arc<dyn Hittable>>) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let node = Self::build(&mut objects)?;
        log::debug!(
            "Built BVH over {} primitives (depth {})",
            node.primitives,
            node.depth
        );
        Ok(node)
    }

    /// Build a BVH over the members of a list.
    pub fn from_list(list: HittableList) -> RenderResult<Self> {
        Self::new(list.into_objects())
    }

    /// Recursive construction over a slice of the scene.
    fn build(objects: &mut [Arc<dyn Hittable>]) -> RenderResult<Self> {
        let boxes: Vec<Aabb> = objects.iter().map(|o| o.bounding_box()).collect();
        let bbox = Aabb::merge_many(&boxes)?;
        let axis = bbox.longest_axis();

        let (left, right, depth): (Arc<dyn Hittable>, Arc<dyn Hittable>, usize) =
            match objects.len() {
                1 => (objects[0].clone(), objects[0].clone(), 1),
                2 => (objects[0].clone(), objects[1].clone(), 1),
                n => {
                    // Stable sort keeps construction deterministic for equal keys
                    objects.sort_by(|a, b| box_compare(a.as_ref(), b.as_ref(), axis));

                    let (lo, hi) = objects.split_at_mut(n / 2);
                    let left = Self::build(lo)?;
                    let right = Self::build(hi)?;
                    let depth = 1 + left.depth.max(right.depth);
                    (Arc::new(left), Arc::new(right), depth)
                }
            };

        Ok(Self {
            left,
            right,
            bbox,
            depth,
            primitives: objects.len(),
        })
    }

    /// Number of node levels from this node down to the deepest leaf.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of primitives under this node.
    pub fn primitive_count(&self) -> usize {
        self.primitives
    }
}

/// Order two hittables by the min corner of their boxes along `axis`.
fn box_compare(a: &dyn Hittable, b: &dyn Hittable, axis: usize) -> Ordering {
    let a_min = a.bounding_box().min().axis(axis);
    let b_min = b.bounding_box().min().axis(axis);
    a_min.total_cmp(&b_min)
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t);

        // Only check right up to closest hit
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.right.hit(ray, Interval::new(ray_t.min, right_max));

        hit_right.or(hit_left)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
