use glam::Vec3;

use super::common::quad;
use crate::scene::{Scene, Triangle};

/// A square pyramid on a small ground slab, straight ahead of the spawn point
pub fn create_pyramid_scene() -> Scene {
    let apex = Vec3::new(0.0, 5.0, -12.0);

    let base_size = 4.0;
    let base_y = 0.0;
    let p0 = Vec3::new(-base_size, base_y, -12.0 + base_size);
    let p1 = Vec3::new(base_size, base_y, -12.0 + base_size);
    let p2 = Vec3::new(base_size, base_y, -12.0 - base_size);
    let p3 = Vec3::new(-base_size, base_y, -12.0 - base_size);

    let sides = vec![
        Triangle::new(p0, p1, apex, [0.9, 0.2, 0.2]),
        Triangle::new(p1, p2, apex, [0.2, 0.9, 0.2]),
        Triangle::new(p2, p3, apex, [0.2, 0.2, 0.9]),
        Triangle::new(p3, p0, apex, [0.9, 0.9, 0.2]),
    ];

    let ground = quad(
        Vec3::new(-10.0, -0.01, -2.0),
        Vec3::new(10.0, -0.01, -2.0),
        Vec3::new(10.0, -0.01, -22.0),
        Vec3::new(-10.0, -0.01, -22.0),
        [0.3, 0.3, 0.3],
    );

    Scene::empty("pyramid")
        .with_triangles(ground.to_vec())
        .with_triangles(sides)
}
