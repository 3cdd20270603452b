//! Rig files: a skeleton, its animation and the meshes it skins, as JSON

use anyhow::{Context, Result};
use ossa_anim::{Animation, Animator, AnimatorConfig, Mesh, Skeleton};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct RigFile {
    pub skeleton: Skeleton,
    pub animation: Animation,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
}

impl RigFile {
    /// Load a rig from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading rig: {}", path.display());

        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let rig: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse rig from {}", path.display()))?;

        rig.skeleton
            .validate()
            .with_context(|| format!("Invalid skeleton in {}", path.display()))?;
        rig.animation
            .validate()
            .with_context(|| format!("Invalid animation in {}", path.display()))?;

        Ok(rig)
    }

    /// Build an animator with every mesh attached
    pub fn into_animator(self, config: AnimatorConfig) -> Result<Animator> {
        let animator = Animator::new(self.skeleton, self.animation, config)
            .context("Skeleton and animation do not match")?
            .with_meshes(self.meshes)
            .context("Failed to attach meshes")?;
        Ok(animator)
    }
}
