// src/camera.rs

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::math::{self, UP};

/// Ground-plane movement axes derived from the camera heading alone, so
/// looking up or down never changes walking speed or direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub yaw: f32,
    /// Degrees above the ground plane, kept strictly inside (-90, 90).
    pub pitch: f32,
    pub distance: f32,
    /// Last normalised pointer position, for turning positions into deltas.
    pub last_pointer: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub eye: Vec3,
    pub focus: Vec3,
    pub rotation: Quat,
}

impl CameraTransform {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.focus, UP)
    }
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    state: CameraState,
    config: CameraConfig,
    transform: CameraTransform,
}

impl CameraRig {
    pub fn new(config: &CameraConfig) -> Self {
        let mut rig = Self {
            state: CameraState {
                yaw: config.yaw,
                pitch: config.pitch.clamp(-config.pitch_limit, config.pitch_limit),
                distance: config.distance.clamp(config.min_distance, config.max_distance),
                last_pointer: Vec2::ZERO,
            },
            config: config.clone(),
            transform: CameraTransform {
                eye: Vec3::ZERO,
                focus: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
        };
        rig.compute_transform(Vec3::ZERO);
        rig
    }

    #[cfg(test)]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn yaw(&self) -> f32 {
        self.state.yaw
    }

    /// Last transform produced by [`compute_transform`](Self::compute_transform).
    pub fn transform(&self) -> &CameraTransform {
        &self.transform
    }

    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32) {
        let limit = self.config.pitch_limit;
        self.state.yaw -= dx * self.config.sensitivity;
        self.state.pitch = (self.state.pitch - dy * self.config.sensitivity).clamp(-limit, limit);
    }

    /// Turns an absolute pointer position into a delta against the last one seen.
    pub fn apply_pointer_position(&mut self, pointer: Vec2) {
        let delta = pointer - self.state.last_pointer;
        if delta != Vec2::ZERO {
            self.apply_pointer_delta(delta.x, delta.y);
            self.state.last_pointer = pointer;
        }
    }

    /// Records where the pointer is without turning, e.g. after a menu had it.
    pub fn sync_pointer(&mut self, pointer: Vec2) {
        self.state.last_pointer = pointer;
    }

    /// Positive steps zoom in.
    pub fn apply_zoom_delta(&mut self, steps: f32) {
        let d = self.state.distance - steps * self.config.zoom_speed;
        self.state.distance = d.clamp(self.config.min_distance, self.config.max_distance);
    }

    pub fn compute_transform(&mut self, target: Vec3) -> CameraTransform {
        let focus = target + UP * self.config.head_height;
        let eye = focus + math::spherical_offset(self.state.yaw, self.state.pitch, self.state.distance);
        let rotation = math::look_rotation(focus - eye);

        self.transform = CameraTransform { eye, focus, rotation };
        self.transform
    }

    pub fn horizontal_basis(&self) -> HorizontalBasis {
        let (forward, right) = math::heading_basis(self.state.yaw);
        HorizontalBasis { forward, right }
    }
}

/// Perspective lens for turning a camera transform into clip space.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 45.0_f32.to_radians(),
            z_near: 0.1,
            z_far: 500.0,
        }
    }
}

impl Projection {
    pub fn view_proj(&self, transform: &CameraTransform, width: u32, height: u32) -> Mat4 {
        let aspect = (width.max(1) as f32) / (height.max(1) as f32);
        let proj = Mat4::perspective_rh(self.fov_y, aspect, self.z_near, self.z_far);
        proj * transform.view()
    }
}
