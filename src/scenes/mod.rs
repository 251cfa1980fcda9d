mod common;
mod demo;
mod pyramid;

pub use common::{box_triangles, quad};
pub use demo::create_demo_scene;
pub use pyramid::create_pyramid_scene;

use crate::scene::Scene;

/// Scene names that resolve without touching the filesystem
pub const BUILTIN_SCENES: [&str; 3] = ["empty", "demo", "pyramid"];

/// Build a built-in scene by name
pub fn builtin(name: &str) -> Option<Scene> {
    match name {
        "empty" => Some(Scene::empty("empty")),
        "demo" => Some(create_demo_scene()),
        "pyramid" => Some(create_pyramid_scene()),
        _ => None,
    }
}
