// Ray-tracing helpers on top of glam::Vec3.

use glam::Vec3;

/// Below this squared length a vector is treated as zero.
const NEAR_ZERO_SQUARED: f32 = 1e-16;

/// Extension trait for Vec3 with the operations scattering code needs.
pub trait Vec3Ext {
    /// True if every component is close to zero.
    fn near_zero(&self) -> bool;

    /// Normalize, substituting `fallback` when the length is ~0.
    fn unit_or(&self, fallback: Vec3) -> Vec3;

    /// Mirror-reflect `self` about the (unit) normal `n`.
    fn reflected(&self, n: Vec3) -> Vec3;

    /// Refract the unit vector `self` through a surface with unit normal `n`.
    ///
    /// `eta_ratio` is the ratio of indices of refraction (incident over
    /// transmitted). Callers check total internal reflection beforehand.
    fn refracted(&self, n: Vec3, eta_ratio: f32) -> Vec3;

    /// Component along axis `n` (0=X, 1=Y, 2=Z).
    fn axis(&self, n: usize) -> f32;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn near_zero(&self) -> bool {
        const S: f32 = 1e-8;
        self.x.abs() < S && self.y.abs() < S && self.z.abs() < S
    }

    #[inline]
    fn unit_or(&self, fallback: Vec3) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq > NEAR_ZERO_SQUARED && len_sq.is_finite() {
            *self / len_sq.sqrt()
        } else {
            fallback
        }
    }

    #[inline]
    fn reflected(&self, n: Vec3) -> Vec3 {
        *self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refracted(&self, n: Vec3, eta_ratio: f32) -> Vec3 {
        let cos_theta = (-*self).dot(n).min(1.0);
        let r_out_perp = eta_ratio * (*self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }

    #[inline]
    fn axis(&self, n: usize) -> f32 {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}
