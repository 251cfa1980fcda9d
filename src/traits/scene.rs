use crate::error::SceneLoadError;
use crate::scene::Scene;

/// Resolves a client-supplied scene reference into a drawable scene
pub trait SceneLoader: Send + Sync {
    fn load(&self, reference: &str) -> Result<Scene, SceneLoadError>;
}
