//! Cook-Torrance microfacet material.
//!
//! GGX normal distribution, Smith-Schlick geometry and Schlick Fresnel,
//! with F0 blended from a 0.04 dielectric baseline to the albedo by the
//! metallic factor. Scattering picks one lobe per event:
//!
//! - specular: sample a GGX microfacet normal and reflect the view ray
//!   about it; D cancels against the sampling pdf
//! - diffuse: cosine-weighted hemisphere sample, weighted by
//!   `(1 - F(v.h)) * (1 - metallic) * albedo`, the diffuse term of
//!   [`CookTorrance::brdf`] over the cosine pdf
//!
//! Each lobe's weight is divided by the probability of picking it, which is
//! estimated from the Fresnel term at the view angle.

use crate::hittable::HitRecord;
use crate::material::{Material, ScatterResult};
use lumen_math::random::{gen_f32, random_cosine_direction};
use lumen_math::{Color, Onb, Ray, Vec3, Vec3Ext};
use rand::RngCore;
use std::f32::consts::PI;

/// Guards every BRDF denominator.
const EPSILON: f32 = 1e-5;

/// Smallest GGX alpha; a perfect mirror would make D a delta.
const MIN_ALPHA: f32 = 1e-3;

/// Reflectance at normal incidence of common dielectrics.
const DIELECTRIC_F0: f32 = 0.04;

/// Physically based microfacet material.
#[derive(Debug, Clone)]
pub struct CookTorrance {
    albedo: Color,
    /// 0 = smooth, 1 = rough
    roughness: f32,
    /// 0 = dielectric, 1 = metal
    metallic: f32,
}

impl CookTorrance {
    pub fn new(albedo: Color, roughness: f32, metallic: f32) -> Self {
        Self {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
            metallic: metallic.clamp(0.0, 1.0),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn metallic(&self) -> f32 {
        self.metallic
    }

    fn alpha(&self) -> f32 {
        (self.roughness * self.roughness).max(MIN_ALPHA)
    }

    fn fresnel_0(&self) -> Color {
        Color::splat(DIELECTRIC_F0).lerp(self.albedo, self.metallic)
    }

    /// Full BRDF value for unit normal `n`, view `v` and light `l`,
    /// both pointing away from the surface.
    pub fn brdf(&self, n: Vec3, v: Vec3, l: Vec3) -> Color {
        let n_dot_v = n.dot(v);
        let n_dot_l = n.dot(l);
        if n_dot_v <= 0.0 || n_dot_l <= 0.0 {
            return Color::ZERO;
        }

        let h = (v + l).unit_or(n);
        let f = fresnel_schlick(v.dot(h).max(0.0), self.fresnel_0());
        let g = geometry_smith(n_dot_v, n_dot_l, self.roughness);
        let d = ggx_distribution(n.dot(h).max(0.0), self.alpha());

        let specular = f * (g * d / (4.0 * n_dot_v * n_dot_l + EPSILON));
        self.diffuse_weight(f) / PI + specular
    }

    /// Diffuse albedo left after Fresnel reflection at the half vector.
    fn diffuse_weight(&self, f_half: Color) -> Color {
        (Color::ONE - f_half) * (1.0 - self.metallic) * self.albedo
    }

    /// Probability of sampling the specular lobe, from the view Fresnel.
    fn specular_probability(&self, f_view: Color) -> f32 {
        let specular = mean(f_view);
        let diffuse = mean(self.diffuse_weight(f_view));
        let total = specular + diffuse;

        if total > EPSILON {
            specular / total
        } else {
            1.0
        }
    }

    fn scatter_specular(
        &self,
        onb: &Onb,
        v: Vec3,
        n_dot_v: f32,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Vec3)> {
        let h = onb.local_vec(sample_ggx_half_vector(self.alpha(), rng));
        let l = (-v).reflected(h);

        let n_dot_l = onb.w.dot(l);
        if n_dot_l <= 0.0 {
            return None;
        }

        let v_dot_h = v.dot(h).max(EPSILON);
        let n_dot_h = onb.w.dot(h).max(EPSILON);

        let f = fresnel_schlick(v_dot_h, self.fresnel_0());
        let g = geometry_smith(n_dot_v, n_dot_l, self.roughness);

        // f * g * d / (4 nv nl) * nl over the half-vector pdf d nh / (4 vh)
        let weight = f * (g * v_dot_h / (n_dot_v * n_dot_h + EPSILON));
        Some((weight, l))
    }

    fn scatter_diffuse(&self, onb: &Onb, v: Vec3, rng: &mut dyn RngCore) -> (Color, Vec3) {
        let l = onb.local_vec(random_cosine_direction(rng));
        let h = (v + l).unit_or(onb.w);
        let f = fresnel_schlick(v.dot(h).max(0.0), self.fresnel_0());
        // Lambert over a cosine pdf: the 1/pi and cosine cancel
        (self.diffuse_weight(f), l)
    }
}

impl Material for CookTorrance {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> ScatterResult {
        let onb = Onb::from_w(rec.normal);
        let v = -ray_in.direction().unit_or(-onb.w);
        let n_dot_v = onb.w.dot(v).max(EPSILON);

        let f_view = fresnel_schlick(n_dot_v, self.fresnel_0());
        let p_specular = self.specular_probability(f_view);

        let sample = if gen_f32(rng) < p_specular {
            self.scatter_specular(&onb, v, n_dot_v, rng)
                .map(|(w, l)| (w / p_specular, l))
        } else {
            let (w, l) = self.scatter_diffuse(&onb, v, rng);
            Some((w / (1.0 - p_specular), l))
        };

        let Some((attenuation, direction)) = sample else {
            return ScatterResult::absorbed(Color::ZERO);
        };

        if !attenuation.is_finite() || !direction.is_finite() {
            log::warn!(
                "Non-finite Cook-Torrance sample ({:?}, {:?}), terminating path",
                attenuation,
                direction
            );
            return ScatterResult::absorbed(Color::ZERO);
        }

        ScatterResult::scattered(attenuation, Ray::new(rec.p, direction.unit_or(onb.w)))
    }
}

#[inline]
fn mean(c: Color) -> f32 {
    (c.x + c.y + c.z) / 3.0
}

/// Schlick Fresnel approximation.
#[inline]
fn fresnel_schlick(cos_theta: f32, f0: Color) -> Color {
    let x = (1.0 - cos_theta).clamp(0.0, 1.0);
    f0 + (Color::ONE - f0) * x.powi(5)
}

/// Smith geometry term with the Schlick-GGX approximation.
#[inline]
fn geometry_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    let k = (roughness + 1.0) * (roughness + 1.0) / 8.0;
    let g1 = |x: f32| x / (x * (1.0 - k) + k);
    g1(n_dot_v.max(0.0)) * g1(n_dot_l.max(0.0))
}

/// GGX/Trowbridge-Reitz distribution.
#[inline]
fn ggx_distribution(n_dot_h: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom + EPSILON)
}

/// GGX half vector around +Z, distributed as `D(h) * cos(theta_h)`.
fn sample_ggx_half_vector(alpha: f32, rng: &mut dyn RngCore) -> Vec3 {
    let u1 = gen_f32(rng);
    let u2 = gen_f32(rng);

    let theta = (alpha * (u1 / (1.0 - u1).max(EPSILON)).sqrt()).atan();
    let phi = 2.0 * PI * u2;

    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}
