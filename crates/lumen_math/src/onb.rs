use crate::{Vec3, Vec3Ext};

/// Orthonormal basis built around a normal, for local-space sampling.
///
/// `w` is the normal; `u` and `v` span the tangent plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Build a frame with `w` along `n`.
    ///
    /// A zero-length `n` yields the canonical frame.
    pub fn from_w(n: Vec3) -> Self {
        let w = n.unit_or(Vec3::Z);

        // Any helper axis not parallel to w
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);

        Self { u, v, w }
    }

    /// Local coordinates (a, b, c) to world space.
    #[inline]
    pub fn local(&self, a: f32, b: f32, c: f32) -> Vec3 {
        a * self.u + b * self.v + c * self.w
    }

    /// Local vector to world space.
    #[inline]
    pub fn local_vec(&self, a: Vec3) -> Vec3 {
        self.local(a.x, a.y, a.z)
    }

    /// World vector to local coordinates.
    #[inline]
    pub fn to_local(&self, d: Vec3) -> Vec3 {
        Vec3::new(d.dot(self.u), d.dot(self.v), d.dot(self.w))
    }
}
