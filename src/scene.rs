use glam::Vec3;

use crate::math::AABB;

/// One flat-shaded triangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// Linear RGB in [0, 1]
    pub color: [f32; 3],
}

impl Triangle {
    pub const fn new(v0: Vec3, v1: Vec3, v2: Vec3, color: [f32; 3]) -> Self {
        Self { v0, v1, v2, color }
    }
}

/// Triangles sharing one bounding box
#[derive(Debug, Clone)]
pub struct Mesh {
    pub bounds: AABB,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// `None` when `triangles` is empty
    pub fn new(triangles: Vec<Triangle>) -> Option<Self> {
        let bounds = AABB::from_points(triangles.iter().flat_map(|t| [t.v0, t.v1, t.v2]))?;
        Some(Self { bounds, triangles })
    }
}

/// Drawable scene graph handed to the renderer. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Scene {
    name: String,
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Add a mesh built from `triangles`; empty input is dropped
    pub fn push_triangles(&mut self, triangles: Vec<Triangle>) {
        if let Some(mesh) = Mesh::new(triangles) {
            self.meshes.push(mesh);
        }
    }

    pub fn with_triangles(mut self, triangles: Vec<Triangle>) -> Self {
        self.push_triangles(triangles);
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangles.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn bounds(&self) -> Option<AABB> {
        self.meshes
            .iter()
            .map(|m| m.bounds)
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(offset: f32) -> Triangle {
        Triangle::new(
            Vec3::new(offset, 0.0, 0.0),
            Vec3::new(offset + 1.0, 0.0, 0.0),
            Vec3::new(offset, 1.0, 0.0),
            [1.0, 1.0, 1.0],
        )
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::empty("empty");
        assert!(scene.is_empty());
        assert_eq!(scene.triangle_count(), 0);
        assert!(scene.bounds().is_none());
    }

    #[test]
    fn test_empty_mesh_is_dropped() {
        let scene = Scene::empty("s").with_triangles(Vec::new());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_bounds_cover_all_meshes() {
        let scene = Scene::empty("s")
            .with_triangles(vec![tri(0.0)])
            .with_triangles(vec![tri(5.0), tri(-3.0)]);
        assert_eq!(scene.triangle_count(), 3);
        let bounds = scene.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(6.0, 1.0, 0.0));
    }
}
