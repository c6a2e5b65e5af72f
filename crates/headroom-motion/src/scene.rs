//! Scene nodes - the only view of the 3D scene the motion code gets
//!
//! Asset loading and graph traversal belong to the host. The host exposes
//! named transforms through `SceneGraph`; everything here is a plain value.

use std::collections::HashMap;

/// 3D vector (scene units or radians, depending on use)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }
}

/// Local transform of a scene node (Euler rotation in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub rotation: Vec3,
    pub position: Vec3,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl NodeTransform {
    pub fn identity() -> Self {
        Self {
            rotation: Vec3::ZERO,
            position: Vec3::ZERO,
            scale: Vec3::splat(1.0),
        }
    }

    pub fn with_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::splat(scale),
            ..Self::identity()
        }
    }
}

/// Access to named scene transforms
pub trait SceneGraph {
    /// Get a node by name, if the loaded asset has it
    fn node(&self, name: &str) -> Option<&NodeTransform>;

    /// Get a mutable node by name, if the loaded asset has it
    fn node_mut(&mut self, name: &str) -> Option<&mut NodeTransform>;
}

/// In-memory scene: a flat name → transform map
#[derive(Debug, Clone, Default)]
pub struct NodeMap {
    nodes: HashMap<String, NodeTransform>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a node
    pub fn insert(&mut self, name: impl Into<String>, transform: NodeTransform) {
        self.nodes.insert(name.into(), transform);
    }

    pub fn with_node(mut self, name: impl Into<String>, transform: NodeTransform) -> Self {
        self.insert(name, transform);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<NodeTransform> {
        self.nodes.remove(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SceneGraph for NodeMap {
    fn node(&self, name: &str) -> Option<&NodeTransform> {
        self.nodes.get(name)
    }

    fn node_mut(&mut self, name: &str) -> Option<&mut NodeTransform> {
        self.nodes.get_mut(name)
    }
}

/// A scene with no nodes (before the asset has loaded)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScene;

impl SceneGraph for EmptyScene {
    fn node(&self, _name: &str) -> Option<&NodeTransform> {
        None
    }

    fn node_mut(&mut self, _name: &str) -> Option<&mut NodeTransform> {
        None
    }
}
