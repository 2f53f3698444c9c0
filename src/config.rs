//! Tunables for the window, the player controller, the camera rig and the
//! fixed-rate loop.
//!
//! Every section falls back to its defaults field by field, so a config file
//! only needs to name what it changes:
//!
//! ```ron
//! (
//!     player: (jump_impulse: 18.0, ground: Geometry),
//!     camera: (sensitivity: 35.0),
//! )
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use log::info;
use serde::{Deserialize, Serialize};

use crate::player::GroundMode;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "PLATFORMER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "platformer.ron";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Clear colour, linear RGB.
    pub background: [f32; 3],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "My 3D Platformer".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
            background: [0.5, 0.5, 1.0],
        }
    }
}

/// Player movement. Velocities are world units per second, z-up, so
/// `gravity` and `max_fall_speed` are negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub max_fall_speed: f32,
    /// Half size of the player box. The box sits on the feet position.
    pub half_extents: [f32; 3],
    pub spawn: [f32; 3],
    pub ground: GroundMode,
    /// How far below the feet a block top may be and still count as ground.
    pub step_tolerance: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            gravity: -30.0,
            jump_impulse: 15.0,
            max_fall_speed: -50.0,
            half_extents: [0.5, 0.5, 0.5],
            spawn: [0.0, 0.0, 0.0],
            ground: GroundMode::Geometry,
            step_tolerance: 0.05,
        }
    }
}

/// Third-person orbit camera. Angles in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub pitch_limit: f32,
    /// Degrees per unit of normalised pointer travel (the window spans 2 units).
    pub sensitivity: f32,
    /// Distance change per scroll step.
    pub zoom_speed: f32,
    /// Height of the look-at point above the player's feet.
    pub head_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 20.0,
            min_distance: 5.0,
            max_distance: 50.0,
            yaw: 0.0,
            pitch: 10.0,
            pitch_limit: 89.0,
            sensitivity: 50.0,
            zoom_speed: 1.0,
            head_height: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_rate_hz: u32,
    /// Ticks between position traces at debug level. 0 disables them.
    pub trace_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            trace_interval: 60,
        }
    }
}

impl SimulationConfig {
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }
}

impl GameConfig {
    /// Reads `$PLATFORMER_CONFIG`, or `platformer.ron` in the working
    /// directory. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config =
            Self::from_ron(&text).with_context(|| format!("parse config {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        ensure!(
            cam.min_distance > 0.0 && cam.min_distance <= cam.max_distance,
            "camera zoom range [{}, {}] is empty",
            cam.min_distance,
            cam.max_distance
        );
        ensure!(
            cam.pitch_limit > 0.0 && cam.pitch_limit < 90.0,
            "camera pitch limit {} must lie in (0, 90)",
            cam.pitch_limit
        );

        let p = &self.player;
        ensure!(p.speed >= 0.0, "player speed {} is negative", p.speed);
        ensure!(
            p.max_fall_speed < 0.0,
            "max fall speed {} must be negative (z is up)",
            p.max_fall_speed
        );
        ensure!(
            p.half_extents.iter().all(|h| *h > 0.0),
            "player half extents {:?} must be positive",
            p.half_extents
        );
        if let GroundMode::Plane { level } = p.ground {
            ensure!(level >= 0.0, "ground plane level {level} is below z = 0");
        }
        ensure!(self.simulation.tick_rate_hz > 0, "tick rate must be positive");
        Ok(())
    }
}
