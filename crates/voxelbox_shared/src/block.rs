use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HARDNESS: f32 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Grass,
    Stone,
    Wood,
    Leaves,
    Dirt,
    Sand,
    Cobble,
    Glass,
    Brick,
    Cactus,
}

impl Material {
    pub const ALL: [Material; 10] = [
        Material::Grass,
        Material::Stone,
        Material::Wood,
        Material::Leaves,
        Material::Dirt,
        Material::Sand,
        Material::Cobble,
        Material::Glass,
        Material::Brick,
        Material::Cactus,
    ];

    /// Materials offered by the hotbar palette, in slot order.
    pub const HOTBAR_PALETTE: [Material; 9] = [
        Material::Grass,
        Material::Stone,
        Material::Wood,
        Material::Leaves,
        Material::Dirt,
        Material::Sand,
        Material::Cobble,
        Material::Glass,
        Material::Brick,
    ];

    /// Seconds of continuous breaking input needed to destroy a block of this material.
    pub fn hardness(self) -> f32 {
        match self {
            Material::Grass => 0.3,
            Material::Wood => 0.6,
            Material::Dirt => 0.4,
            Material::Stone => 1.0,
            Material::Leaves => 0.15,
            _ => DEFAULT_HARDNESS,
        }
    }

    /// What a broken block of this material leaves behind.
    pub fn drop_material(self) -> Material {
        self
    }

    pub fn name(self) -> &'static str {
        match self {
            Material::Grass => "grass",
            Material::Stone => "stone",
            Material::Wood => "wood",
            Material::Leaves => "leaves",
            Material::Dirt => "dirt",
            Material::Sand => "sand",
            Material::Cobble => "cobble",
            Material::Glass => "glass",
            Material::Brick => "brick",
            Material::Cactus => "cactus",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Material::Grass => "Grass",
            Material::Stone => "Stone",
            Material::Wood => "Wood",
            Material::Leaves => "Leaves",
            Material::Dirt => "Dirt",
            Material::Sand => "Sand",
            Material::Cobble => "Cobble",
            Material::Glass => "Glass",
            Material::Brick => "Brick",
            Material::Cactus => "Cactus",
        }
    }

    pub fn from_name(name: &str) -> Option<Material> {
        Material::ALL
            .into_iter()
            .find(|material| material.name().eq_ignore_ascii_case(name))
    }

    /// Linear RGB tint used by views for particles and item cubes.
    pub fn color_hint(self) -> [f32; 3] {
        match self {
            Material::Grass => [0.0, 0.8, 0.0],
            Material::Stone => [0.25, 0.25, 0.25],
            Material::Wood => [0.6, 0.4, 0.2],
            Material::Leaves => [0.35, 0.52, 0.3],
            Material::Dirt => [0.55, 0.35, 0.17],
            Material::Sand => [0.95, 0.9, 0.3],
            Material::Cobble => [0.5, 0.5, 0.5],
            Material::Glass => [0.0, 0.9, 0.9],
            Material::Brick => [0.8, 0.15, 0.1],
            Material::Cactus => [0.1, 0.55, 0.2],
        }
    }
}

/// In-progress break session attached to a single block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BreakState {
    pub pos: IVec3,
    /// Simulation clock reading when the session began.
    pub started_at: f64,
    /// Seconds of breaking input accumulated so far.
    pub elapsed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub pos: IVec3,
    pub material: Material,
    pub hardness: f32,
    pub breaking: Option<BreakState>,
}

impl Block {
    pub fn new(pos: IVec3, material: Material) -> Self {
        Self {
            pos,
            material,
            hardness: material.hardness(),
            breaking: None,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.pos.as_vec3()
    }

    /// Height of the top face; blocks are unit cubes centered on their coordinate.
    pub fn top(&self) -> f32 {
        self.pos.y as f32 + 0.5
    }

    /// Break progress in `[0, 1]`; zero when no session is active.
    pub fn break_progress(&self) -> f32 {
        match self.breaking {
            Some(state) if self.hardness > 0.0 => (state.elapsed / self.hardness).min(1.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }
}
