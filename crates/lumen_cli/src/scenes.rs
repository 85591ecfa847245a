//! Built-in demo scenes.

use crate::cli::SceneKind;
use anyhow::Result;
use lumen_math::random::{gen_f32, random_vec_range};
use lumen_renderer::{
    Background, BvhNode, CameraConfig, Color, CookTorrance, Dielectric, DiffuseLight, Hittable,
    ImageTexture, Lambertian, Material, Metal, Quad, Sphere, Texture, Vec3,
};
use rand::{Rng, RngCore};
use std::path::Path;
use std::sync::Arc;

/// A ready-to-render world with the camera and background it was composed for.
pub struct Scene {
    pub world: BvhNode,
    pub camera: CameraConfig,
    pub background: Background,
}

pub fn build(kind: SceneKind, texture: Option<&Path>, rng: &mut dyn RngCore) -> Result<Scene> {
    if texture.is_some() && kind != SceneKind::Materials {
        log::warn!("--texture is only used by the materials scene");
    }

    let scene = match kind {
        SceneKind::Spheres => spheres(rng)?,
        SceneKind::Cornell => cornell()?,
        SceneKind::Materials => materials(texture)?,
    };

    log::info!(
        "Built {:?} scene: {} primitives, BVH depth {}",
        kind,
        scene.world.primitive_count(),
        scene.world.depth()
    );
    Ok(scene)
}

/// Three large spheres surrounded by a field of small random ones.
fn spheres(rng: &mut dyn RngCore) -> Result<Scene> {
    let mut objects: Vec<Arc<dyn Hittable>> = Vec::new();

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    objects.push(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        ground,
    )));

    for a in -8..8 {
        for b in -8..8 {
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose = gen_f32(rng);
            let material: Arc<dyn Material> = if choose < 0.75 {
                let albedo = random_vec_range(rng, 0.0, 1.0) * random_vec_range(rng, 0.0, 1.0);
                Arc::new(Lambertian::new(albedo))
            } else if choose < 0.92 {
                let albedo = random_vec_range(rng, 0.5, 1.0);
                Arc::new(Metal::new(albedo, rng.gen_range(0.0..0.5)))
            } else {
                Arc::new(Dielectric::new(1.5))
            };
            objects.push(Arc::new(Sphere::new(center, 0.2, material)));
        }
    }

    objects.push(Arc::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.push(Arc::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    objects.push(Arc::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    let camera = CameraConfig::default()
        .with_size(600, 338)
        .with_quality(32, 12)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO)
        .with_vertical_fov(20.0)
        .with_lens(0.6, Some(10.0));

    Ok(Scene {
        world: BvhNode::new(objects)?,
        camera,
        background: Background::SkyGradient,
    })
}

/// The classic box: red and green side walls, a ceiling light, two blocks
/// and a glass ball. Lit only by the light quad.
fn cornell() -> Result<Scene> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(15.0)));

    let size = 555.0;
    let mut objects: Vec<Arc<dyn Hittable>> = vec![
        Arc::new(Quad::new(
            Vec3::new(size, 0.0, 0.0),
            Vec3::new(0.0, size, 0.0),
            Vec3::new(0.0, 0.0, size),
            green,
        )),
        Arc::new(Quad::new(
            Vec3::ZERO,
            Vec3::new(0.0, size, 0.0),
            Vec3::new(0.0, 0.0, size),
            red,
        )),
        Arc::new(Quad::new(
            Vec3::new(343.0, 554.0, 332.0),
            Vec3::new(-130.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -105.0),
            light,
        )),
        // Floor, ceiling, back wall
        Arc::new(Quad::new(
            Vec3::ZERO,
            Vec3::new(size, 0.0, 0.0),
            Vec3::new(0.0, 0.0, size),
            white.clone(),
        )),
        Arc::new(Quad::new(
            Vec3::splat(size),
            Vec3::new(-size, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -size),
            white.clone(),
        )),
        Arc::new(Quad::new(
            Vec3::new(0.0, 0.0, size),
            Vec3::new(size, 0.0, 0.0),
            Vec3::new(0.0, size, 0.0),
            white.clone(),
        )),
    ];

    for face in Quad::cube(Vec3::new(370.0, 165.0, 380.0), 165.0, 330.0, 165.0, white.clone()) {
        objects.push(Arc::new(face));
    }
    for face in Quad::cube(Vec3::new(185.0, 82.5, 170.0), 165.0, 165.0, 165.0, white) {
        objects.push(Arc::new(face));
    }
    objects.push(Arc::new(Sphere::new(
        Vec3::new(185.0, 225.0, 170.0),
        60.0,
        Arc::new(Dielectric::new(1.5)),
    )));

    let camera = CameraConfig::default()
        .with_size(400, 400)
        .with_quality(64, 16)
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0))
        .with_vertical_fov(40.0);

    Ok(Scene {
        world: BvhNode::new(objects)?,
        camera,
        background: Background::Solid { color: Color::ZERO },
    })
}

/// A grid of Cook-Torrance spheres, roughness increasing left to right and
/// metallic increasing front to back, over a textured floor.
fn materials(texture: Option<&Path>) -> Result<Scene> {
    let floor_texture = match texture {
        Some(path) => {
            anyhow::ensure!(path.is_file(), "texture {} not found", path.display());
            Texture::from(ImageTexture::load_in_background(path)?)
        }
        None => Texture::solid(Color::new(0.35, 0.35, 0.4)),
    };

    let mut objects: Vec<Arc<dyn Hittable>> = vec![Arc::new(Quad::new(
        Vec3::new(-6.0, 0.0, -6.0),
        Vec3::new(12.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 12.0),
        Arc::new(Lambertian::from_texture(floor_texture)),
    ))];

    let albedos = [
        Color::new(0.9, 0.3, 0.2),
        Color::new(0.95, 0.75, 0.3),
        Color::new(0.8, 0.8, 0.85),
    ];
    let columns = 5;
    for (row, albedo) in albedos.iter().enumerate() {
        let metallic = row as f32 / (albedos.len() - 1) as f32;
        for column in 0..columns {
            let roughness = (column as f32 + 0.5) / columns as f32;
            let center = Vec3::new(
                (column as f32 - 2.0) * 1.1,
                0.5,
                -(row as f32) * 1.2,
            );
            objects.push(Arc::new(Sphere::new(
                center,
                0.5,
                Arc::new(CookTorrance::new(*albedo, roughness, metallic)),
            )));
        }
    }

    objects.push(Arc::new(Quad::new(
        Vec3::new(-3.0, 4.0, -3.0),
        Vec3::new(6.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        Arc::new(DiffuseLight::new(Color::splat(2.0))),
    )));

    let camera = CameraConfig::default()
        .with_size(640, 360)
        .with_quality(32, 10)
        .with_position(Vec3::new(0.0, 3.0, 5.5), Vec3::new(0.0, 0.4, -1.2))
        .with_vertical_fov(45.0);

    Ok(Scene {
        world: BvhNode::new(objects)?,
        camera,
        background: Background::SkyGradient,
    })
}
