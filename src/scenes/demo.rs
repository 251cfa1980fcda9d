use glam::Vec3;

use super::common::{box_triangles, generate_color, quad};
use crate::scene::Scene;

/// Ground plane with a grid of coloured pillars around the origin
pub fn create_demo_scene() -> Scene {
    let ground_color = [0.25, 0.55, 0.25];
    let ground = quad(
        Vec3::new(-50.0, -1.0, -50.0),
        Vec3::new(-50.0, -1.0, 50.0),
        Vec3::new(50.0, -1.0, 50.0),
        Vec3::new(50.0, -1.0, -50.0),
        ground_color,
    );

    let mut scene = Scene::empty("demo").with_triangles(ground.to_vec());

    // 7x7 ring of pillars, leaving the spawn point clear
    let pillars = (-3i32..=3)
        .flat_map(|x| (-3i32..=3).map(move |z| (x, z)))
        .filter(|&(x, z)| x != 0 || z != 0)
        .enumerate();

    for (seed, (x, z)) in pillars {
        let center = Vec3::new(x as f32 * 6.0, 0.0, z as f32 * 6.0);
        let height = 1.0 + ((x * 3 + z * 5).rem_euclid(7)) as f32;
        let half = Vec3::new(0.75, 0.0, 0.75);
        let color = generate_color(seed as u32, 0.6, 0.9);
        scene.push_triangles(box_triangles(
            center - half - Vec3::Y,
            center + half + Vec3::Y * (height - 1.0),
            color,
        ));
    }

    log::debug!(
        "demo scene created: {} meshes, {} triangles",
        scene.meshes().len(),
        scene.triangle_count()
    );
    scene
}
