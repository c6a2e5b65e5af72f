//! Tongue wobble - optional, off unless the profile enables it

use headroom_core::TongueConfig;

use crate::{SceneGraph, Vec3};

#[derive(Debug, Clone)]
pub struct TongueWobble {
    config: TongueConfig,
    node: String,
    rest: Option<Vec3>,
}

impl TongueWobble {
    pub fn new(config: TongueConfig, node: impl Into<String>) -> Self {
        Self {
            config,
            node: node.into(),
            rest: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Ease the tongue toward its wobble target. No-op when disabled or when
    /// the scene has no tongue node.
    pub fn update(
        &mut self,
        elapsed: f32,
        envelope: f32,
        lerp: f32,
        scene: &mut dyn SceneGraph,
    ) -> Option<f32> {
        if !self.config.enabled {
            return None;
        }
        let node = scene.node_mut(&self.node)?;
        let rest = *self.rest.get_or_insert(node.position);

        let wobble = (elapsed * self.config.speed).sin() * envelope * self.config.amplitude;
        let target = rest.y + wobble;
        node.position.y += (target - node.position.y) * lerp;
        Some(node.position.y)
    }

    /// Forget the captured rest position (scene swapped)
    pub fn forget_rest(&mut self) {
        self.rest = None;
    }
}
