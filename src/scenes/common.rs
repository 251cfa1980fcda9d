use glam::Vec3;

use crate::scene::Triangle;

/// Golden-ratio hue walk so neighbouring seeds get distinct colours
pub fn generate_hue(color_seed: u32) -> f32 {
    (color_seed as f32 * 0.618033988749895) % 1.0
}

pub fn generate_color(color_seed: u32, saturation: f32, value: f32) -> [f32; 3] {
    hsv_to_rgb(generate_hue(color_seed), saturation, value)
}

/// HSV in [0, 1] to linear RGB
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [f32; 3] {
    let chroma = value * saturation;
    let sector = (hue.rem_euclid(1.0) * 6.0).min(5.999);
    let secondary = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let floor = value - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, secondary, 0.0),
        1 => (secondary, chroma, 0.0),
        2 => (0.0, chroma, secondary),
        3 => (0.0, secondary, chroma),
        4 => (secondary, 0.0, chroma),
        _ => (chroma, 0.0, secondary),
    };
    [r + floor, g + floor, b + floor]
}

/// Two triangles spanning the quad a-b-c-d (counter-clockwise)
pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, color: [f32; 3]) -> [Triangle; 2] {
    [Triangle::new(a, b, c, color), Triangle::new(a, c, d, color)]
}

/// Twelve triangles of an axis-aligned box
pub fn box_triangles(min: Vec3, max: Vec3, color: [f32; 3]) -> Vec<Triangle> {
    let corner = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };

    let faces = [
        // -Z, +Z
        [corner(false, false, false), corner(false, true, false), corner(true, true, false), corner(true, false, false)],
        [corner(false, false, true), corner(true, false, true), corner(true, true, true), corner(false, true, true)],
        // -X, +X
        [corner(false, false, false), corner(false, false, true), corner(false, true, true), corner(false, true, false)],
        [corner(true, false, false), corner(true, true, false), corner(true, true, true), corner(true, false, true)],
        // -Y, +Y
        [corner(false, false, false), corner(true, false, false), corner(true, false, true), corner(false, false, true)],
        [corner(false, true, false), corner(false, true, true), corner(true, true, true), corner(true, true, false)],
    ];

    faces
        .iter()
        .flat_map(|[a, b, c, d]| quad(*a, *b, *c, *d, color))
        .collect()
}
