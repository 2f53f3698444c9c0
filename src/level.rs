use anyhow::{Context, Result, anyhow};
use glam::Vec3;
use log::info;

use crate::collision::{Aabb, StaticGeometry};
use crate::scene::{ModelHandle, Placement, Scene};

const STONE: [f32; 3] = [0.55, 0.55, 0.6];
const GRASS: [f32; 3] = [0.3, 0.55, 0.25];
const SAND: [f32; 3] = [0.76, 0.68, 0.45];
const BRICK: [f32; 3] = [0.7, 0.35, 0.25];

/// Decorative model, no collision.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub model: &'static str,
    pub placement: Placement,
}

/// Solid box drawn with `models/box` and registered as static geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub color: [f32; 3],
}

impl Block {
    pub fn unit(center: Vec3, color: [f32; 3]) -> Self {
        Self {
            center,
            half_extents: Vec3::splat(0.5),
            color,
        }
    }

    /// Block whose top face sits at `top`.
    pub fn slab(x: f32, y: f32, top: f32, half_extents: Vec3, color: [f32; 3]) -> Self {
        Self {
            center: Vec3::new(x, y, top - half_extents.z),
            half_extents,
            color,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.center, self.half_extents)
    }

    fn placement(&self) -> Placement {
        Placement::at(self.center)
            .with_scale(self.half_extents * 2.0)
            .with_color(self.color)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    pub name: &'static str,
    pub props: Vec<Prop>,
    pub blocks: Vec<Block>,
}

fn ground_props() -> Vec<Prop> {
    vec![
        Prop {
            model: "models/environment",
            placement: Placement::at(Vec3::new(-8.0, 42.0, 0.0))
                .with_scale(Vec3::splat(0.25))
                .with_color(GRASS),
        },
        // spawn pad, top flush with the floor
        Prop {
            model: "models/box",
            placement: Placement::at(Vec3::new(0.0, 0.0, -0.25))
                .with_scale(Vec3::new(5.0, 5.0, 0.5))
                .with_color(SAND),
        },
    ]
}

/// Levels offered by the menu, in menu order.
pub fn catalogue() -> Vec<LevelDef> {
    vec![
        LevelDef {
            name: "Level 1",
            props: ground_props(),
            blocks: vec![
                Block::unit(Vec3::new(2.0, 10.0, 0.5), STONE),
                Block::unit(Vec3::new(4.0, 15.0, 0.5), STONE),
                Block::unit(Vec3::new(6.0, 20.0, 0.5), STONE),
            ],
        },
        LevelDef {
            name: "Level 2",
            props: ground_props(),
            blocks: (1..=4)
                .map(|i| {
                    let i = i as f32;
                    Block::slab(0.0, 3.0 + 3.0 * i, i, Vec3::new(1.0, 1.0, 0.5), BRICK)
                })
                .collect(),
        },
        LevelDef {
            name: "Level 3",
            props: ground_props(),
            blocks: vec![
                Block::slab(3.0, 8.0, 2.0, Vec3::new(0.75, 0.75, 1.0), STONE),
                Block::slab(-3.0, 13.0, 3.0, Vec3::new(0.75, 0.75, 1.5), STONE),
                Block::slab(0.0, 18.0, 3.5, Vec3::new(0.75, 0.75, 1.75), STONE),
                Block::slab(0.0, 26.0, 3.5, Vec3::new(3.0, 3.0, 0.25), BRICK),
            ],
        },
    ]
}

/// A loaded level: the handles it owns plus its collision blocks.
#[derive(Debug)]
pub struct Level {
    name: String,
    handles: Vec<ModelHandle>,
    geometry: StaticGeometry,
}

impl Level {
    fn load(def: &LevelDef, scene: &mut dyn Scene) -> Result<Self> {
        let mut handles = Vec::with_capacity(def.props.len() + def.blocks.len());

        let models = def
            .props
            .iter()
            .map(|p| (p.model, p.placement))
            .chain(def.blocks.iter().map(|b| ("models/box", b.placement())));

        for (model, placement) in models {
            match scene.load_model(model, placement) {
                Ok(h) => handles.push(h),
                Err(e) => {
                    for h in handles {
                        scene.release(h);
                    }
                    return Err(e).with_context(|| format!("load level {:?}", def.name));
                }
            }
        }

        let geometry = StaticGeometry::new(def.blocks.iter().map(Block::aabb).collect());
        Ok(Self {
            name: def.name.to_string(),
            handles,
            geometry,
        })
    }

    fn unload(self, scene: &mut dyn Scene) {
        for h in self.handles {
            scene.release(h);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    pub fn model_count(&self) -> usize {
        self.handles.len()
    }
}

/// Keeps at most one level resident.
#[derive(Debug)]
pub struct LevelManager {
    defs: Vec<LevelDef>,
    current: Option<Level>,
    empty: StaticGeometry,
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::with_levels(catalogue())
    }
}

impl LevelManager {
    pub fn with_levels(defs: Vec<LevelDef>) -> Self {
        Self {
            defs,
            current: None,
            empty: StaticGeometry::default(),
        }
    }

    pub fn level_names(&self) -> Vec<String> {
        self.defs.iter().map(|d| d.name.to_string()).collect()
    }

    pub fn current(&self) -> Option<&Level> {
        self.current.as_ref()
    }

    /// Blocks of the resident level, or none.
    pub fn geometry(&self) -> &StaticGeometry {
        self.current.as_ref().map_or(&self.empty, Level::geometry)
    }

    /// Unloads the resident level, then loads `name`. An unknown name leaves
    /// the resident level in place.
    pub fn load(&mut self, name: &str, scene: &mut dyn Scene) -> Result<&Level> {
        let def = self
            .defs
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| anyhow!("no level named {name:?}"))?;

        if let Some(old) = self.current.take() {
            info!("unloading {}", old.name());
            old.unload(scene);
        }

        let level = Level::load(def, scene)?;
        info!(
            "loaded {} ({} models, {} blocks)",
            level.name(),
            level.model_count(),
            level.geometry().blocks().len()
        );
        Ok(&*self.current.insert(level))
    }

    pub fn unload(&mut self, scene: &mut dyn Scene) {
        if let Some(level) = self.current.take() {
            info!("unloading {}", level.name());
            level.unload(scene);
        }
    }
}
