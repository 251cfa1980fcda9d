use std::sync::{Arc, Mutex};

use super::display_context::Viewport;
use super::software_context::{RenderSettings, SoftwareContext};
use crate::camera::CameraTransform;
use crate::error::RenderError;
use crate::frame::Bitmap;
use crate::scene::Scene;
use crate::traits::{FrameSource, Renderer};

/// One render target: a renderer paired with the frame source reading it back
///
/// Render and readback happen under a single lock, so every session holding
/// the same device is serialised while distinct devices run in parallel.
pub struct RenderDevice {
    renderer: Arc<dyn Renderer>,
    source: Arc<dyn FrameSource>,
    exclusive: Mutex<()>,
}

impl RenderDevice {
    pub fn new(renderer: Arc<dyn Renderer>, source: Arc<dyn FrameSource>) -> Self {
        Self {
            renderer,
            source,
            exclusive: Mutex::new(()),
        }
    }

    /// Device backed by a fresh CPU render context
    pub fn software(viewport: Viewport, settings: RenderSettings) -> Self {
        let context = Arc::new(SoftwareContext::new(viewport, settings));
        Self::new(context.clone(), context)
    }

    pub fn viewport(&self) -> Viewport {
        self.source.viewport()
    }

    /// Draw `scene` from `camera` and read back the full viewport
    pub fn capture(&self, scene: &Scene, camera: &CameraTransform) -> Result<Bitmap, RenderError> {
        let _guard = self.exclusive.lock().map_err(|_| RenderError::ContextPoisoned)?;
        self.renderer.render(scene, camera)?;
        self.source.read_pixels(self.viewport().full_region())
    }
}

/// How sessions obtain their render device
#[derive(Clone)]
pub enum DeviceProvider {
    /// Every session shares one context
    Shared(Arc<RenderDevice>),
    /// Each session gets its own context
    Dedicated(Arc<dyn Fn() -> RenderDevice + Send + Sync>),
}

impl DeviceProvider {
    pub fn acquire(&self) -> Arc<RenderDevice> {
        match self {
            DeviceProvider::Shared(device) => device.clone(),
            DeviceProvider::Dedicated(make) => Arc::new(make()),
        }
    }

    pub fn software(viewport: Viewport, settings: RenderSettings, shared: bool) -> Self {
        if shared {
            DeviceProvider::Shared(Arc::new(RenderDevice::software(viewport, settings)))
        } else {
            DeviceProvider::Dedicated(Arc::new(move || RenderDevice::software(viewport, settings)))
        }
    }
}

impl std::fmt::Debug for DeviceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceProvider::Shared(_) => f.write_str("DeviceProvider::Shared"),
            DeviceProvider::Dedicated(_) => f.write_str("DeviceProvider::Dedicated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::display_context::Region;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Renderer that records how many renders overlap
    struct OverlapProbe {
        viewport: Viewport,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl Renderer for OverlapProbe {
        fn render(&self, _scene: &Scene, _camera: &CameraTransform) -> Result<(), RenderError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl FrameSource for OverlapProbe {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn read_pixels(&self, region: Region) -> Result<Bitmap, RenderError> {
            Ok(Bitmap::new(region.width, region.height, vec![0; region.width as usize * region.height as usize * 4]))
        }
    }

    #[test]
    fn test_shared_device_serialises_sessions() {
        let probe = Arc::new(OverlapProbe {
            viewport: Viewport::new(2, 2),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        });
        let device = Arc::new(RenderDevice::new(probe.clone(), probe.clone()));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let device = device.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        device.capture(&Scene::empty("empty"), &CameraTransform::default()).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(probe.max_active.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capture_reads_full_viewport() {
        let device = RenderDevice::software(Viewport::new(8, 4), RenderSettings::default());
        let bitmap = device.capture(&Scene::empty("empty"), &CameraTransform::default()).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (8, 4));
        assert_eq!(bitmap.pixels().len(), 8 * 4 * 4);
    }

    #[test]
    fn test_provider_sharing() {
        let shared = DeviceProvider::software(Viewport::new(4, 4), RenderSettings::default(), true);
        assert!(Arc::ptr_eq(&shared.acquire(), &shared.acquire()));

        let dedicated = DeviceProvider::software(Viewport::new(4, 4), RenderSettings::default(), false);
        assert!(!Arc::ptr_eq(&dedicated.acquire(), &dedicated.acquire()));
    }
}
