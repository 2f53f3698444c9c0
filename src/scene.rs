use std::collections::BTreeMap;

use anyhow::{Result, bail};
use glam::{Mat4, Quat, Vec3};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(u32);

/// Meshes the scene knows how to build, addressed by asset path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Box,
    Environment,
}

impl ModelKind {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "models/box" => Some(ModelKind::Box),
            "models/environment" => Some(ModelKind::Environment),
            _ => None,
        }
    }

    /// Local-space size and centre of the model's bounding box.
    pub fn local_bounds(self) -> (Vec3, Vec3) {
        match self {
            ModelKind::Box => (Vec3::ONE, Vec3::ZERO),
            ModelKind::Environment => (Vec3::new(400.0, 400.0, 4.0), Vec3::new(0.0, 0.0, -2.0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub scale: Vec3,
    pub heading: f32,
    pub color: [f32; 3],
}

impl Placement {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            scale: Vec3::ONE,
            heading: 0.0,
            color: [0.8, 0.8, 0.8],
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_z(self.heading.to_radians()),
            self.position,
        )
    }
}

pub trait Scene {
    /// Loads a model and attaches it. Unknown paths are errors.
    fn load_model(&mut self, path: &str, placement: Placement) -> Result<ModelHandle>;

    fn set_placement(&mut self, handle: ModelHandle, placement: Placement);

    /// Detaches and frees a model. The handle must not be used afterwards.
    fn release(&mut self, handle: ModelHandle);
}

/// One ambient term plus one directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: [f32; 3],
    pub sun_color: [f32; 3],
    /// Heading/pitch in degrees; the light shines along its forward (+Y) axis.
    pub sun_heading: f32,
    pub sun_pitch: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: [0.5, 0.5, 0.5],
            sun_color: [1.0, 1.0, 1.0],
            sun_heading: 0.0,
            sun_pitch: -60.0,
        }
    }
}

impl Lighting {
    /// Unit vector the light travels along.
    pub fn sun_direction(&self) -> Vec3 {
        let (sh, ch) = self.sun_heading.to_radians().sin_cos();
        let (sp, cp) = self.sun_pitch.to_radians().sin_cos();
        Vec3::new(-sh * cp, ch * cp, sp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneNode {
    pub kind: ModelKind,
    pub placement: Placement,
}

#[derive(Debug, Default)]
pub struct SceneRegistry {
    nodes: BTreeMap<ModelHandle, SceneNode>,
    next_id: u32,
    pub lighting: Lighting,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, handle: ModelHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }
}

impl Scene for SceneRegistry {
    fn load_model(&mut self, path: &str, placement: Placement) -> Result<ModelHandle> {
        let Some(kind) = ModelKind::from_path(path) else {
            bail!("unknown model {path:?}");
        };

        let handle = ModelHandle(self.next_id);
        self.next_id += 1;
        self.nodes.insert(handle, SceneNode { kind, placement });
        debug!("attached {path} as {handle:?}");
        Ok(handle)
    }

    fn set_placement(&mut self, handle: ModelHandle, placement: Placement) {
        match self.nodes.get_mut(&handle) {
            Some(node) => node.placement = placement,
            None => warn!("placement for released model {handle:?}"),
        }
    }

    fn release(&mut self, handle: ModelHandle) {
        if self.nodes.remove(&handle).is_none() {
            warn!("release of unknown model {handle:?}");
        }
    }
}
