//! Material trait for surface scattering.

use crate::hittable::HitRecord;
use crate::texture::Texture;
use lumen_math::random::{gen_f32, random_unit_vector};
use lumen_math::{Color, Ray, Vec3, Vec3Ext};
use rand::RngCore;

/// Outcome of a scatter event.
///
/// `scattered: None` ends the path at this vertex; only emission counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Option<Ray>,
}

impl ScatterResult {
    pub fn scattered(attenuation: Color, ray: Ray) -> Self {
        Self {
            attenuation,
            scattered: Some(ray),
        }
    }

    pub fn absorbed(attenuation: Color) -> Self {
        Self {
            attenuation,
            scattered: None,
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray at the intersection `rec`.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> ScatterResult;

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    texture: Texture,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Texture::solid(albedo))
    }

    /// Albedo looked up from a texture at each hit.
    pub fn from_texture(texture: impl Into<Texture>) -> Self {
        Self {
            texture: texture.into(),
        }
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> ScatterResult {
        // Normal plus a point on the unit sphere gives a cosine-like lobe;
        // the sum cancels to zero only when the sample is opposite the normal
        let direction = (rec.normal + random_unit_vector(rng)).unit_or(rec.normal);

        ScatterResult::scattered(
            self.texture.value(rec.u, rec.v, rec.p),
            Ray::new(rec.p, direction),
        )
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> ScatterResult {
        let unit_in = ray_in.direction().unit_or(-rec.normal);
        let reflected = unit_in.reflected(rec.normal);
        let direction = (reflected + self.fuzz * random_unit_vector(rng)).unit_or(reflected);

        ScatterResult::scattered(self.albedo, Ray::new(rec.p, direction))
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f32, ratio: f32) -> f32 {
        // Matched indices: no interface, nothing reflects
        if (ratio - 1.0).abs() < 1e-6 {
            return 0.0;
        }
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> ScatterResult {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().unit_or(-rec.normal);
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                unit_direction.reflected(rec.normal)
            } else {
                unit_direction.refracted(rec.normal, refraction_ratio)
            };

        ScatterResult::scattered(
            Color::ONE,
            Ray::new(rec.p, direction.unit_or(unit_direction)),
        )
    }
}

/// Diffuse light emitter.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord<'_>,
        _rng: &mut dyn RngCore,
    ) -> ScatterResult {
        // Lights don't scatter rays
        ScatterResult::absorbed(self.emit)
    }

    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.emit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::ImageTexture;
    use image::{DynamicImage, Rgb, RgbImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_at<'a>(ray: &Ray, t: f32, outward: Vec3, mat: &'a dyn Material) -> HitRecord<'a> {
        HitRecord::new(ray, t, outward, (0.3, 0.6), mat)
    }

    #[test]
    fn test_lambertian_scatter() {
        let mut rng = StdRng::seed_from_u64(1);
        let mat = Lambertian::new(Color::new(0.8, 0.3, 0.1));
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = hit_at(&ray, 2.0, Vec3::Y, &mat);

        for _ in 0..500 {
            let result = mat.scatter(&ray, &rec, &mut rng);
            assert_eq!(result.attenuation, Color::new(0.8, 0.3, 0.1));

            let scattered = result.scattered.unwrap();
            assert_eq!(scattered.origin(), rec.p);
            assert!((scattered.direction().length() - 1.0).abs() < 1e-4);
            assert!(scattered.direction().dot(rec.normal) >= 0.0);
        }
    }

    #[test]
    fn test_lambertian_texture_attenuation() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([0, 255, 0]));
        let tex = ImageTexture::from_image(&DynamicImage::ImageRgb8(img));
        let mat = Lambertian::from_texture(tex);

        let mut rng = StdRng::seed_from_u64(2);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = hit_at(&ray, 1.0, Vec3::Z, &mat);

        let result = mat.scatter(&ray, &rec, &mut rng);
        assert!((result.attenuation - Color::new(0.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_lambertian_pending_texture_uses_sentinel() {
        let (tex, _loader) = ImageTexture::pending();
        let mat = Lambertian::from_texture(tex);

        let mut rng = StdRng::seed_from_u64(3);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = hit_at(&ray, 1.0, Vec3::Z, &mat);

        let result = mat.scatter(&ray, &rec, &mut rng);
        assert_eq!(result.attenuation, crate::texture::LOADING_COLOR);
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let mut rng = StdRng::seed_from_u64(4);
        let mat = Metal::new(Color::splat(0.9), 0.0);

        // 45 degree incidence onto the XZ plane, unnormalized direction
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(2.0, -2.0, 0.0));
        let rec = hit_at(&ray, 0.5, Vec3::Y, &mat);

        let result = mat.scatter(&ray, &rec, &mut rng);
        let scattered = result.scattered.unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((scattered.direction() - expected).length() < 1e-5);
        assert_eq!(result.attenuation, Color::splat(0.9));
    }

    #[test]
    fn test_metal_fuzz_is_clamped_and_always_scatters() {
        let mut rng = StdRng::seed_from_u64(5);
        let mat = Metal::new(Color::ONE, 7.0);
        assert_eq!(mat.fuzz, 1.0);

        // Grazing incidence: fuzz can push the ray below the surface, the
        // path still continues
        let ray = Ray::new(Vec3::new(-1.0, 0.05, 0.0), Vec3::new(1.0, -0.05, 0.0));
        let rec = hit_at(&ray, 1.0, Vec3::Y, &mat);

        let mut below = 0;
        for _ in 0..500 {
            let result = mat.scatter(&ray, &rec, &mut rng);
            let out = result.scattered.expect("metal always scatters");
            assert_eq!(out.origin(), rec.p);
            assert!((out.direction().length() - 1.0).abs() < 1e-4);
            assert_eq!(result.attenuation, Color::ONE);
            if out.direction().dot(Vec3::Y) <= 0.0 {
                below += 1;
            }
        }
        assert!(below > 0);
    }

    #[test]
    fn test_dielectric_index_one_passes_straight_through() {
        let mut rng = StdRng::seed_from_u64(6);
        let mat = Dielectric::new(1.0);

        for dir in [
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.3, -1.0, 0.2),
            Vec3::new(1.0, -0.2, 0.0),
        ] {
            let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), dir);
            let rec = hit_at(&ray, 1.0, Vec3::Y, &mat);
            for _ in 0..50 {
                let result = mat.scatter(&ray, &rec, &mut rng);
                assert_eq!(result.attenuation, Color::ONE);

                let out = result.scattered.unwrap().direction();
                assert!(
                    (out - dir.normalize()).length() < 1e-4,
                    "{out:?} not colinear with {dir:?}"
                );
            }
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mut rng = StdRng::seed_from_u64(7);
        let mat = Dielectric::new(1.5);

        // Leaving glass at a grazing angle: back face, ratio 1.5
        let dir = Vec3::new(1.0, 0.2, 0.0);
        let ray = Ray::new(Vec3::ZERO, dir);
        let rec = hit_at(&ray, 1.0, Vec3::Y, &mat);
        assert!(!rec.front_face);

        for _ in 0..50 {
            let out = mat.scatter(&ray, &rec, &mut rng).scattered.unwrap().direction();
            let expected = dir.normalize().reflected(rec.normal);
            assert!((out - expected).length() < 1e-5);
        }
    }

    #[test]
    fn test_dielectric_refracts_and_reflects() {
        let mut rng = StdRng::seed_from_u64(8);
        let mat = Dielectric::new(1.5);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let rec = hit_at(&ray, 1.0, Vec3::Y, &mat);

        let (mut refracted, mut reflected) = (0, 0);
        for _ in 0..2000 {
            let out = mat.scatter(&ray, &rec, &mut rng).scattered.unwrap().direction();
            assert!((out.length() - 1.0).abs() < 1e-4);
            if out.y < 0.0 {
                refracted += 1;
                // Bent towards the normal entering a denser medium
                assert!(out.x < std::f32::consts::FRAC_1_SQRT_2);
            } else {
                reflected += 1;
            }
        }
        // Schlick gives about 5% reflection at 45 degrees
        assert!(reflected > 20 && reflected < 250, "reflected {reflected}");
        assert!(refracted > reflected);
    }

    #[test]
    fn test_diffuse_light() {
        let mut rng = StdRng::seed_from_u64(9);
        let mat = DiffuseLight::new(Color::new(4.0, 4.0, 4.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = hit_at(&ray, 1.0, Vec3::Z, &mat);

        let result = mat.scatter(&ray, &rec, &mut rng);
        assert!(result.scattered.is_none());
        assert_eq!(mat.emitted(0.1, 0.9, Vec3::splat(3.0)), Color::splat(4.0));
        assert_eq!(Lambertian::new(Color::ONE).emitted(0.0, 0.0, Vec3::ZERO), Color::ZERO);
    }
}
