use glam::Vec3;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::camera::HorizontalBasis;
use crate::collision::StaticGeometry;
use crate::config::PlayerConfig;
use crate::input::{Axis, AxisValue, MovementIntent};

/// What the player lands on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GroundMode {
    /// Hard floor at a fixed height; level blocks only push sideways.
    Plane { level: f32 },
    /// Block tops under the player's footprint, floored at z = 0.
    Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    /// Heading in degrees. Mirrors the camera yaw, not the travel direction.
    pub yaw: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub jumping: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    state: PlayerState,
    intent: MovementIntent,
    config: PlayerConfig,
}

impl PlayerController {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            state: PlayerState {
                position: Vec3::from_array(config.spawn),
                yaw: 0.0,
                vertical_velocity: 0.0,
                grounded: false,
                jumping: false,
            },
            intent: MovementIntent::default(),
            config: config.clone(),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::from_array(self.config.half_extents)
    }

    #[cfg(test)]
    pub fn intent(&self) -> MovementIntent {
        self.intent
    }

    pub fn apply_intent(&mut self, axis: Axis, value: AxisValue) {
        self.intent.set(axis, value);
    }

    pub fn set_intent(&mut self, intent: MovementIntent) {
        for axis in [Axis::Forward, Axis::Side] {
            self.apply_intent(axis, intent.get(axis));
        }
    }

    pub fn face_yaw(&mut self, yaw: f32) {
        self.state.yaw = yaw;
    }

    /// Moves the player without touching vertical velocity or grounded state.
    /// Used by the collision pass.
    pub fn set_position(&mut self, position: Vec3) {
        self.state.position = position;
    }

    /// Back to the spawn point, at rest and airborne until the next landing.
    pub fn respawn(&mut self) {
        let yaw = self.state.yaw;
        *self = Self::new(&self.config);
        self.state.yaw = yaw;
    }

    /// Starts a jump if grounded. Returns whether a jump started.
    pub fn jump(&mut self) -> bool {
        if !self.state.grounded {
            return false;
        }
        self.state.vertical_velocity = self.config.jump_impulse;
        self.state.grounded = false;
        self.state.jumping = true;
        info!("jump");
        true
    }

    /// Horizontal displacement for one step. Diagonals are normalised so
    /// they never outrun a single axis.
    pub fn move_delta(&self, dt: f32, basis: &HorizontalBasis) -> Vec3 {
        if self.intent.is_idle() {
            return Vec3::ZERO;
        }
        let dir = basis.forward * self.intent.forward.as_f32() + basis.right * self.intent.side.as_f32();
        dir.normalize_or_zero() * self.config.speed * dt
    }

    /// Advances one simulation step and returns the new feet position.
    pub fn step(&mut self, dt: f32, basis: &HorizontalBasis, geometry: &StaticGeometry) -> Vec3 {
        self.state.position += self.move_delta(dt, basis);

        let ground = self.ground_level(geometry);
        if self.state.grounded && self.state.position.z > ground + self.config.step_tolerance {
            debug!("walked off ledge at z={:.2}", self.state.position.z);
            self.state.grounded = false;
        }

        if !self.state.grounded {
            let v = self.state.vertical_velocity + self.config.gravity * dt;
            self.state.vertical_velocity = v.max(self.config.max_fall_speed);
            self.state.position.z += self.state.vertical_velocity * dt;
        }

        if self.state.position.z <= ground {
            if !self.state.grounded {
                debug!("landed at z={:.2}", ground);
            }
            self.state.position.z = ground;
            self.state.vertical_velocity = 0.0;
            self.state.grounded = true;
            self.state.jumping = false;
        }

        self.state.position
    }

    /// Whether the collision pass may move the player vertically.
    pub fn stands_on_blocks(&self) -> bool {
        self.config.ground == GroundMode::Geometry
    }

    fn ground_level(&self, geometry: &StaticGeometry) -> f32 {
        match self.config.ground {
            GroundMode::Plane { level } => level,
            GroundMode::Geometry => geometry.ground_level_below(
                self.state.position,
                self.half_extents(),
                0.0,
                self.config.step_tolerance,
            ),
        }
    }

    #[cfg(test)]
    fn state_mut(&mut self) -> &mut PlayerState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Aabb;

    const EPS: f32 = 1e-5;

    fn plane_config() -> PlayerConfig {
        PlayerConfig {
            ground: GroundMode::Plane { level: 0.0 },
            ..Default::default()
        }
    }

    fn basis_y() -> HorizontalBasis {
        HorizontalBasis {
            forward: Vec3::Y,
            right: Vec3::X,
        }
    }

    fn grounded_player(config: &PlayerConfig) -> PlayerController {
        let mut p = PlayerController::new(config);
        p.step(0.1, &basis_y(), &StaticGeometry::default());
        assert!(p.state().grounded);
        p
    }

    #[test]
    fn spawns_airborne_and_settles_on_plane() {
        let p = grounded_player(&plane_config());
        assert_eq!(p.position(), Vec3::ZERO);
        assert_eq!(p.state().vertical_velocity, 0.0);
    }

    #[test]
    fn forward_intent_moves_along_camera_forward() {
        let mut p = grounded_player(&plane_config());
        let old = p.position();
        p.apply_intent(Axis::Forward, AxisValue::Positive);
        let new = p.step(1.0, &basis_y(), &StaticGeometry::default());
        assert!((new.y - (old.y + 10.0)).abs() < EPS);
        assert!((new.x - old.x).abs() < EPS);
        assert_eq!(new.z, 0.0);
    }

    #[test]
    fn diagonal_is_no_faster_than_axis() {
        let mut p = PlayerController::new(&plane_config());
        p.apply_intent(Axis::Forward, AxisValue::Positive);
        p.apply_intent(Axis::Side, AxisValue::Negative);
        let d = p.move_delta(0.1, &basis_y());
        assert!((d.length() - 10.0 * 0.1).abs() < EPS);
    }

    #[test]
    fn idle_intent_does_not_move() {
        let p = PlayerController::new(&plane_config());
        assert_eq!(p.move_delta(1.0, &basis_y()), Vec3::ZERO);
    }

    #[test]
    fn apply_intent_is_idempotent() {
        let mut p = PlayerController::new(&plane_config());
        p.apply_intent(Axis::Side, AxisValue::Positive);
        p.apply_intent(Axis::Side, AxisValue::Positive);
        assert_eq!(p.intent().side, AxisValue::Positive);
        assert!((p.move_delta(1.0, &basis_y()).length() - 10.0).abs() < EPS);
    }

    #[test]
    fn set_intent_replaces_both_axes() {
        let mut p = PlayerController::new(&plane_config());
        p.apply_intent(Axis::Forward, AxisValue::Positive);
        p.set_intent(MovementIntent {
            forward: AxisValue::Neutral,
            side: AxisValue::Negative,
        });
        assert_eq!(p.intent().forward, AxisValue::Neutral);
        assert_eq!(p.intent().side, AxisValue::Negative);

        p.set_intent(MovementIntent::default());
        assert_eq!(p.move_delta(1.0, &basis_y()), Vec3::ZERO);
    }

    #[test]
    fn gravity_accumulates_while_airborne() {
        let mut p = PlayerController::new(&plane_config());
        p.state_mut().position.z = 10.0;
        p.step(0.1, &basis_y(), &StaticGeometry::default());
        assert!((p.state().vertical_velocity + 3.0).abs() < EPS);
        assert!(!p.state().grounded);
        assert!((p.position().z - (10.0 - 0.3)).abs() < EPS);
    }

    #[test]
    fn fall_speed_is_clamped() {
        let mut p = PlayerController::new(&plane_config());
        p.state_mut().position.z = 1000.0;
        p.state_mut().vertical_velocity = -49.0;
        p.step(0.1, &basis_y(), &StaticGeometry::default());
        assert_eq!(p.state().vertical_velocity, -50.0);
    }

    #[test]
    fn falling_through_ground_snaps_to_it() {
        let mut p = PlayerController::new(&plane_config());
        p.state_mut().position.z = 0.05;
        p.state_mut().vertical_velocity = -3.0;
        p.step(0.1, &basis_y(), &StaticGeometry::default());
        let s = p.state();
        assert_eq!(s.position.z, 0.0);
        assert!(s.grounded);
        assert_eq!(s.vertical_velocity, 0.0);
    }

    #[test]
    fn jump_from_ground_sets_impulse() {
        let mut p = grounded_player(&plane_config());
        assert!(p.jump());
        let s = p.state();
        assert_eq!(s.vertical_velocity, 15.0);
        assert!(!s.grounded);
        assert!(s.jumping);
    }

    #[test]
    fn second_jump_in_air_is_a_no_op() {
        let mut p = grounded_player(&plane_config());
        p.jump();
        let after_first = *p.state();
        assert!(!p.jump());
        assert_eq!(*p.state(), after_first);
    }

    #[test]
    fn jump_arc_returns_to_ground() {
        let mut p = grounded_player(&plane_config());
        p.jump();
        let mut peak: f32 = 0.0;
        for _ in 0..200 {
            p.step(1.0 / 60.0, &basis_y(), &StaticGeometry::default());
            peak = peak.max(p.position().z);
            if p.state().grounded {
                break;
            }
        }
        assert!(p.state().grounded);
        assert!(!p.state().jumping);
        assert_eq!(p.position().z, 0.0);
        // v^2 / 2g = 225 / 60 = 3.75
        assert!(peak > 3.5 && peak < 4.0, "peak {peak}");
    }

    #[test]
    fn plane_level_is_configurable() {
        let config = PlayerConfig {
            ground: GroundMode::Plane { level: 2.0 },
            ..Default::default()
        };
        let p = grounded_player(&config);
        assert_eq!(p.position().z, 2.0);
    }

    #[test]
    fn lands_on_block_top_in_geometry_mode() {
        let config = PlayerConfig {
            ground: GroundMode::Geometry,
            ..Default::default()
        };
        let geometry = StaticGeometry::new(vec![Aabb::from_center(Vec3::new(0.0, 0.0, 0.5), Vec3::splat(0.5))]);
        let mut p = PlayerController::new(&config);
        p.state_mut().position.z = 3.0;
        for _ in 0..120 {
            p.step(1.0 / 60.0, &basis_y(), &geometry);
        }
        assert!(p.state().grounded);
        assert!((p.position().z - 1.0).abs() < EPS);
    }

    #[test]
    fn walking_off_a_ledge_starts_a_fall() {
        let config = PlayerConfig {
            ground: GroundMode::Geometry,
            ..Default::default()
        };
        let geometry = StaticGeometry::new(vec![Aabb::from_center(Vec3::new(0.0, 0.0, 0.5), Vec3::splat(0.5))]);
        let mut p = PlayerController::new(&config);
        p.state_mut().position.z = 1.0;
        p.step(0.01, &basis_y(), &geometry);
        assert!(p.state().grounded);

        p.apply_intent(Axis::Forward, AxisValue::Positive);
        // a tenth of a second at speed 10 carries the footprint off the block
        p.step(0.1, &basis_y(), &geometry);
        assert!(p.position().y > 0.99);
        assert!(!p.state().grounded);
        assert!(p.state().vertical_velocity < 0.0);
    }

    #[test]
    fn geometry_mode_never_sinks_below_zero() {
        let config = PlayerConfig {
            ground: GroundMode::Geometry,
            ..Default::default()
        };
        let mut p = PlayerController::new(&config);
        p.state_mut().position.z = 0.5;
        p.state_mut().vertical_velocity = -50.0;
        p.step(0.1, &basis_y(), &StaticGeometry::default());
        assert_eq!(p.position().z, 0.0);
        assert!(p.state().grounded);
    }

    #[test]
    fn set_position_leaves_vertical_state_alone() {
        let mut p = PlayerController::new(&plane_config());
        p.state_mut().vertical_velocity = -7.0;
        p.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.state().vertical_velocity, -7.0);
        assert!(!p.state().grounded);
    }

    #[test]
    fn respawn_returns_to_spawn_and_keeps_heading() {
        let mut p = grounded_player(&plane_config());
        p.face_yaw(45.0);
        p.set_position(Vec3::new(9.0, 9.0, 0.0));
        p.respawn();
        assert_eq!(p.position(), Vec3::ZERO);
        assert_eq!(p.state().yaw, 45.0);
        assert!(p.intent().is_idle());
    }
}
