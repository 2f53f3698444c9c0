use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use log::debug;

use crate::camera::{CameraRig, CameraTransform};
use crate::collision;
use crate::config::GameConfig;
use crate::input::FrameInput;
use crate::level::{Level, LevelManager};
use crate::player::PlayerController;
use crate::scene::{ModelHandle, Placement, Scene, SceneRegistry};

const PLAYER_MODEL: &str = "models/box";
const PLAYER_COLOR: [f32; 3] = [0.2, 0.45, 0.9];

/// Everything the simulation touches, passed explicitly to each step.
pub struct Game {
    tick: u64,
    config: GameConfig,
    scene: SceneRegistry,
    levels: LevelManager,
    player: PlayerController,
    camera: CameraRig,
    player_model: ModelHandle,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        let mut scene = SceneRegistry::new();
        let player = PlayerController::new(&config.player);
        let player_model = scene
            .load_model(PLAYER_MODEL, Self::player_placement(&player))
            .context("load player model")?;

        let mut camera = CameraRig::new(&config.camera);
        camera.compute_transform(player.position());

        Ok(Self {
            tick: 0,
            config,
            scene,
            levels: LevelManager::default(),
            player,
            camera,
            player_model,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneRegistry {
        &self.scene
    }

    #[cfg(test)]
    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    #[cfg(test)]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_transform(&self) -> &CameraTransform {
        self.camera.transform()
    }

    pub fn level_names(&self) -> Vec<String> {
        self.levels.level_names()
    }

    pub fn level(&self) -> Option<&Level> {
        self.levels.current()
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Swaps in `name` and puts the player back at the spawn point.
    pub fn load_level(&mut self, name: &str) -> Result<()> {
        self.levels.load(name, &mut self.scene)?;
        self.player.respawn();
        self.camera.compute_transform(self.player.position());
        self.sync_player_model();
        Ok(())
    }

    /// Tracks the pointer while the simulation is paused behind a menu.
    pub fn sync_pointer(&mut self, pointer: Vec2) {
        self.camera.sync_pointer(pointer);
    }

    pub fn unload_level(&mut self) {
        self.levels.unload(&mut self.scene);
        self.player.respawn();
        self.sync_player_model();
    }

    /// One fixed step: input, then player step, collision pass and camera,
    /// in that order.
    pub fn tick(&mut self, dt: f32, input: &FrameInput) {
        self.tick += 1;

        if let Some(pointer) = input.pointer {
            self.camera.apply_pointer_position(pointer);
        }
        if input.zoom_steps != 0.0 {
            self.camera.apply_zoom_delta(input.zoom_steps);
        }
        self.player.set_intent(input.intent);
        if input.jump {
            self.player.jump();
        }
        self.player.face_yaw(self.camera.yaw());

        let basis = self.camera.horizontal_basis();
        let geometry = self.levels.geometry();

        let moved = self.player.step(dt, &basis, geometry);
        let resolved = collision::resolve_penetration(
            moved,
            self.player.half_extents(),
            geometry,
            !self.player.stands_on_blocks(),
        );
        self.player.set_position(resolved);

        self.camera.compute_transform(self.player.position());
        self.sync_player_model();

        let every = self.config.simulation.trace_interval;
        if every > 0 && self.tick % every == 0 {
            let s = self.player.state();
            debug!(
                "POS x={:.2} y={:.2} z={:.2} vz={:.2} ground={}",
                s.position.x, s.position.y, s.position.z, s.vertical_velocity, s.grounded
            );
        }
    }

    fn sync_player_model(&mut self) {
        let placement = Self::player_placement(&self.player);
        self.scene.set_placement(self.player_model, placement);
    }

    fn player_placement(player: &PlayerController) -> Placement {
        let half = player.half_extents();
        Placement::at(player.position() + Vec3::new(0.0, 0.0, half.z))
            .with_scale(half * 2.0)
            .with_heading(player.state().yaw)
            .with_color(PLAYER_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{AxisValue, MovementIntent};
    use crate::player::GroundMode;

    const DT: f32 = 1.0 / 60.0;

    fn game() -> Game {
        Game::new(GameConfig::default()).unwrap()
    }

    fn settle(game: &mut Game) {
        for _ in 0..60 {
            game.tick(DT, &FrameInput::default());
        }
        assert!(game.player().state().grounded);
    }

    fn walk(forward: AxisValue, side: AxisValue) -> FrameInput {
        FrameInput {
            intent: MovementIntent { forward, side },
            ..Default::default()
        }
    }

    #[test]
    fn player_model_is_attached() {
        let g = game();
        assert_eq!(g.scene().len(), 1);
        let node = g.scene().get(g.player_model).unwrap();
        assert_eq!(node.placement.position, Vec3::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn level_load_adds_models_and_respawns() {
        let mut g = game();
        g.load_level("Level 1").unwrap();
        assert_eq!(g.scene().len(), 6);
        assert_eq!(g.level().unwrap().name(), "Level 1");
        g.unload_level();
        assert_eq!(g.scene().len(), 1);
        assert!(g.level().is_none());
    }

    #[test]
    fn unknown_level_is_an_error() {
        let mut g = game();
        assert!(g.load_level("Secret Level").is_err());
    }

    #[test]
    fn forward_walks_along_camera_heading() {
        let mut g = game();
        settle(&mut g);
        let start = g.player().position();
        // yaw 0 looks down +X
        for _ in 0..60 {
            g.tick(DT, &walk(AxisValue::Positive, AxisValue::Neutral));
        }
        let d = g.player().position() - start;
        assert!((d.x - 10.0).abs() < 1e-3, "moved {d:?}");
        assert!(d.y.abs() < 1e-4);
    }

    #[test]
    fn heading_follows_camera_not_travel() {
        let mut g = game();
        settle(&mut g);
        let input = FrameInput {
            pointer: Some(glam::Vec2::new(-1.0, 0.0)),
            ..walk(AxisValue::Neutral, AxisValue::Positive)
        };
        g.tick(DT, &input);
        // pointer moved left by one unit at 50 degrees per unit
        assert!((g.camera().yaw() - 50.0).abs() < 1e-4);
        assert_eq!(g.player().state().yaw, g.camera().yaw());
        let node = g.scene().get(g.player_model).unwrap();
        assert_eq!(node.placement.heading, g.camera().yaw());
    }

    #[test]
    fn camera_tracks_player_after_move() {
        let mut g = game();
        settle(&mut g);
        for _ in 0..30 {
            g.tick(DT, &walk(AxisValue::Positive, AxisValue::Neutral));
        }
        let focus = g.camera_transform().focus;
        let expected = g.player().position() + Vec3::new(0.0, 0.0, 1.5);
        assert!((focus - expected).length() < 1e-4);
    }

    #[test]
    fn blocks_stop_horizontal_motion() {
        let mut config = GameConfig::default();
        config.player.spawn = [2.0, 5.0, 0.0];
        let mut g = Game::new(config).unwrap();
        g.load_level("Level 1").unwrap();
        settle(&mut g);

        // turn to face +Y, straight at the block centred on (2, 10)
        let input = FrameInput {
            pointer: Some(glam::Vec2::new(-90.0 / 50.0, 0.0)),
            ..Default::default()
        };
        g.tick(DT, &input);

        for _ in 0..120 {
            g.tick(DT, &walk(AxisValue::Positive, AxisValue::Neutral));
            let p = g.player().position();
            assert!(
                !g.level().unwrap().geometry().collides(p, g.player().half_extents()),
                "inside a block at {p:?}"
            );
        }
        let p = g.player().position();
        assert!((p.y - 9.0).abs() < 1e-3, "stopped at {p:?}");
        assert!((p.x - 2.0).abs() < 1e-3);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn jump_lands_on_block_with_geometry_ground() {
        let mut config = GameConfig::default();
        config.player.ground = GroundMode::Geometry;
        config.player.spawn = [2.0, 10.0, 3.0];
        let mut g = Game::new(config).unwrap();
        g.load_level("Level 1").unwrap();
        settle(&mut g);
        assert!((g.player().position().z - 1.0).abs() < 1e-5);

        let jump = FrameInput {
            jump: true,
            ..Default::default()
        };
        g.tick(DT, &jump);
        assert!(!g.player().state().grounded);
        assert!(g.player().state().jumping);
        for _ in 0..120 {
            g.tick(DT, &FrameInput::default());
        }
        assert!(g.player().state().grounded);
        assert!((g.player().position().z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn plane_ground_player_dropped_onto_block_can_still_jump() {
        let mut config = GameConfig::default();
        config.player.ground = GroundMode::Plane { level: 0.0 };
        config.player.spawn = [2.0, 10.0, 1.5];
        let mut g = Game::new(config).unwrap();
        g.load_level("Level 1").unwrap();

        for _ in 0..240 {
            g.tick(DT, &FrameInput::default());
        }
        let s = *g.player().state();
        assert!(s.grounded, "stuck at {:?} vz={}", s.position, s.vertical_velocity);
        assert_eq!(s.position.z, 0.0);
        assert!(!g.level().unwrap().geometry().collides(s.position, g.player().half_extents()));

        let jump = FrameInput {
            jump: true,
            ..Default::default()
        };
        g.tick(DT, &jump);
        assert!(g.player().state().jumping);
        assert!(g.player().state().vertical_velocity > 0.0);
    }

    #[test]
    fn zoom_steps_reach_camera() {
        let mut g = game();
        let input = FrameInput {
            zoom_steps: 3.0,
            ..Default::default()
        };
        g.tick(DT, &input);
        assert_eq!(g.camera().state().distance, 17.0);
    }
}
