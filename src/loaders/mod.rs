pub mod gltf;

pub use self::gltf::load_gltf_scene;

use log::debug;
use std::path::{Component, Path, PathBuf};

use crate::error::SceneLoadError;
use crate::scene::Scene;
use crate::scenes;
use crate::traits::SceneLoader;

/// Resolves scene references against the built-in scenes, then against
/// files under an asset root directory
#[derive(Debug, Clone)]
pub struct AssetSceneLoader {
    root: PathBuf,
}

impl AssetSceneLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a reference to a path under the root, rejecting anything that
    /// could climb out of it. A leading `/` is read as root-relative.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, SceneLoadError> {
        let relative = Path::new(reference.trim_start_matches('/'));
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(SceneLoadError::OutsideAssetRoot(reference.to_string()));
                }
            }
        }
        Ok(path)
    }
}

impl SceneLoader for AssetSceneLoader {
    fn load(&self, reference: &str) -> Result<Scene, SceneLoadError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(SceneLoadError::EmptyReference);
        }

        if let Some(scene) = scenes::builtin(reference) {
            debug!("Resolved built-in scene '{reference}'");
            return Ok(scene);
        }

        let path = self.resolve(reference)?;
        if !path.is_file() {
            return Err(SceneLoadError::NotFound(path));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("gltf" | "glb") => Ok(load_gltf_scene(&path)?),
            _ => Err(SceneLoadError::UnsupportedFormat(path)),
        }
    }
}
