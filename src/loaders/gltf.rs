use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use log::{debug, info, warn};
use std::path::Path;

use crate::scene::{Scene, Triangle};

/// Neutral grey for primitives without a material
const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Loads a glTF or GLB file as a triangle scene, one mesh per primitive
pub fn load_gltf_scene(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    debug!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("gltf");
    let mut scene = Scene::empty(name);

    let roots = document.default_scene().or_else(|| document.scenes().next());
    match roots {
        Some(root) => {
            for node in root.nodes() {
                process_node(&node, &buffers, &Mat4::IDENTITY, &mut scene)?;
            }
        }
        None => warn!("glTF file {:?} has no scenes", path),
    }

    if scene.is_empty() {
        warn!("No triangle geometry found in {:?}", path);
    }
    info!(
        "Loaded '{}': {} meshes, {} triangles",
        scene.name(),
        scene.meshes().len(),
        scene.triangle_count()
    );
    Ok(scene)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    scene: &mut Scene,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, scene)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, scene)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    scene: &mut Scene,
) -> Result<()> {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping {:?} primitive in mesh {:?}", primitive.mode(), mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
        let vertices: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|pos| transform.transform_point3(Vec3::from_array(pos)))
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };

        let color = match primitive.material().index() {
            Some(_) => {
                let [r, g, b, _] = primitive.material().pbr_metallic_roughness().base_color_factor();
                [r, g, b]
            }
            None => DEFAULT_COLOR,
        };

        let vertex = |i: u32| {
            vertices
                .get(i as usize)
                .copied()
                .with_context(|| format!("Index {i} out of range for {} vertices", vertices.len()))
        };

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for corner in indices.chunks_exact(3) {
            triangles.push(Triangle::new(
                vertex(corner[0])?,
                vertex(corner[1])?,
                vertex(corner[2])?,
                color,
            ));
        }
        scene.push_triangles(triangles);
    }

    Ok(())
}
