use glam::Vec3;
use std::sync::{Mutex, MutexGuard};

use super::display_context::{Region, Viewport};
use super::triangle_intersection::closest_hit;
use crate::camera::CameraTransform;
use crate::error::RenderError;
use crate::frame::Bitmap;
use crate::scene::Scene;
use crate::traits::{FrameSource, Renderer};

/// Projection and shading parameters for the CPU ray caster
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Direction towards the single white light
    pub light_dir: Vec3,
    pub ambient: f32,
    pub background: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 5000.0,
            light_dir: Vec3::new(5000.0, 50000.0, 50000.0).normalize(),
            ambient: 0.25,
            background: [20, 24, 32, 255],
        }
    }
}

/// CPU ray-casting renderer that owns its framebuffer
///
/// Acts as both [`Renderer`] and [`FrameSource`]. The framebuffer is stored
/// bottom row first, the way a GL readback delivers it.
pub struct SoftwareContext {
    viewport: Viewport,
    settings: RenderSettings,
    framebuffer: Mutex<Vec<[u8; 4]>>,
}

impl SoftwareContext {
    pub fn new(viewport: Viewport, settings: RenderSettings) -> Self {
        Self {
            viewport,
            settings,
            framebuffer: Mutex::new(vec![settings.background; viewport.pixel_count()]),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn framebuffer(&self) -> Result<MutexGuard<'_, Vec<[u8; 4]>>, RenderError> {
        self.framebuffer.lock().map_err(|_| RenderError::ContextPoisoned)
    }

    /// Color seen along one primary ray
    fn trace(&self, scene: &Scene, origin: Vec3, dir: Vec3) -> [u8; 4] {
        let s = &self.settings;
        let mut best_t = s.far;
        let mut best: Option<([f32; 3], Vec3)> = None;

        for mesh in scene.meshes() {
            let entry = if mesh.bounds.contains(origin) {
                0.0
            } else {
                match mesh.bounds.hit_distance(origin, dir) {
                    Some(t) => t,
                    None => continue,
                }
            };
            if entry > best_t {
                continue;
            }

            if let Some((idx, hit)) = closest_hit(origin, dir, &mesh.triangles, best_t) {
                if hit.t < s.near {
                    continue;
                }
                best_t = hit.t;
                best = Some((mesh.triangles[idx].color, hit.facing_normal(dir)));
            }
        }

        match best {
            Some((color, normal)) => {
                let diffuse = normal.dot(s.light_dir).max(0.0);
                let intensity = (s.ambient + (1.0 - s.ambient) * diffuse).min(1.0);
                [
                    to_channel(color[0] * intensity),
                    to_channel(color[1] * intensity),
                    to_channel(color[2] * intensity),
                    255,
                ]
            }
            None => s.background,
        }
    }
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Renderer for SoftwareContext {
    fn render(&self, scene: &Scene, camera: &CameraTransform) -> Result<(), RenderError> {
        let Viewport { width, height } = self.viewport;
        let tan_half = (self.settings.fov_y_degrees.to_radians() * 0.5).tan();
        let aspect = self.viewport.aspect_ratio();
        let (forward, right, up) = (camera.forward(), camera.right(), camera.up());

        // Trace without holding the lock so readers are only blocked for the copy
        let pixels: Vec<[u8; 4]> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let ndc_x = ((x as f32 + 0.5) / width as f32) * 2.0 - 1.0;
                let ndc_y = ((y as f32 + 0.5) / height as f32) * 2.0 - 1.0;
                let dir = (forward + right * (ndc_x * tan_half * aspect) + up * (ndc_y * tan_half))
                    .normalize();
                self.trace(scene, camera.position, dir)
            })
            .collect();

        *self.framebuffer()? = pixels;
        Ok(())
    }
}

impl FrameSource for SoftwareContext {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn read_pixels(&self, region: Region) -> Result<Bitmap, RenderError> {
        if !region.fits_within(self.viewport) {
            return Err(RenderError::RegionOutOfBounds {
                region,
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        let framebuffer = self.framebuffer()?;
        let stride = self.viewport.width as usize;
        let mut pixels = Vec::with_capacity(region.width as usize * region.height as usize * 4);
        for row in region.y..region.y + region.height {
            let start = row as usize * stride + region.x as usize;
            let texels = &framebuffer[start..start + region.width as usize];
            pixels.extend_from_slice(bytemuck::cast_slice(texels));
        }

        Ok(Bitmap::new(region.width, region.height, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::quad;

    fn context() -> SoftwareContext {
        SoftwareContext::new(Viewport::new(32, 16), RenderSettings::default())
    }

    /// Wall in front of the camera covering only the upper half of the view
    fn upper_wall() -> Scene {
        let tris = quad(
            Vec3::new(-50.0, 0.5, -5.0),
            Vec3::new(50.0, 0.5, -5.0),
            Vec3::new(50.0, 50.0, -5.0),
            Vec3::new(-50.0, 50.0, -5.0),
            [1.0, 1.0, 1.0],
        );
        Scene::empty("wall").with_triangles(tris.to_vec())
    }

    #[test]
    fn test_empty_scene_is_background() {
        let ctx = context();
        ctx.render(&Scene::empty("empty"), &CameraTransform::default()).unwrap();
        let bitmap = ctx.read_pixels(ctx.viewport().full_region()).unwrap();

        assert_eq!(bitmap.pixels().len(), ctx.viewport().buffer_size());
        for px in bitmap.pixels().chunks_exact(4) {
            assert_eq!(px, &ctx.settings().background);
        }
    }

    #[test]
    fn test_rows_are_bottom_to_top() {
        let ctx = context();
        ctx.render(&upper_wall(), &CameraTransform::default()).unwrap();
        let bitmap = ctx.read_pixels(ctx.viewport().full_region()).unwrap();

        let background = ctx.settings().background;
        assert_eq!(bitmap.pixel(16, 0), Some(background));
        assert_ne!(bitmap.pixel(16, 15), Some(background));
    }

    #[test]
    fn test_camera_motion_changes_the_image() {
        let ctx = context();
        let scene = upper_wall();

        ctx.render(&scene, &CameraTransform::default()).unwrap();
        let before = ctx.read_pixels(ctx.viewport().full_region()).unwrap();

        let looking_away = CameraTransform {
            yaw: std::f32::consts::PI,
            ..CameraTransform::default()
        };
        ctx.render(&scene, &looking_away).unwrap();
        let after = ctx.read_pixels(ctx.viewport().full_region()).unwrap();

        assert_ne!(before, after);
        assert!(after
            .pixels()
            .chunks_exact(4)
            .all(|px| px == ctx.settings().background));
    }

    #[test]
    fn test_sub_region_readback() {
        let ctx = context();
        ctx.render(&upper_wall(), &CameraTransform::default()).unwrap();
        let region = Region { x: 4, y: 10, width: 8, height: 2 };
        let bitmap = ctx.read_pixels(region).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (8, 2));
        assert_eq!(bitmap.pixels().len(), 8 * 2 * 4);
    }

    #[test]
    fn test_out_of_bounds_region_is_rejected() {
        let ctx = context();
        let region = Region { x: 30, y: 0, width: 8, height: 1 };
        assert!(matches!(
            ctx.read_pixels(region),
            Err(RenderError::RegionOutOfBounds { .. })
        ));
    }
}
