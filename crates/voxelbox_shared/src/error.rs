use std::fmt;

use glam::IVec3;

use crate::block::Material;

/// Recoverable simulation failures. Every variant means "nothing changed".
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    Occupied(IVec3),
    EmptySlot(usize),
    InventoryFull(Material),
    ActorUnavailable,
    OutOfReach { distance: f32 },
    NoBlock(IVec3),
    DegenerateNormal,
    NoRecipe,
    CraftingCellOccupied { row: usize, col: usize },
    CraftingCellEmpty { row: usize, col: usize },
    CraftingOpen,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupied(pos) => write!(f, "block position {pos} is already occupied"),
            Self::EmptySlot(slot) => write!(f, "inventory slot {slot} is empty or out of range"),
            Self::InventoryFull(material) => {
                write!(f, "no room in inventory for {}", material.name())
            }
            Self::ActorUnavailable => write!(f, "actor has not spawned yet"),
            Self::OutOfReach { distance } => {
                write!(f, "target is {distance:.2} blocks away, beyond reach")
            }
            Self::NoBlock(pos) => write!(f, "no block at {pos}"),
            Self::DegenerateNormal => write!(f, "surface normal has no dominant axis"),
            Self::NoRecipe => write!(f, "crafting grid does not match any recipe"),
            Self::CraftingCellOccupied { row, col } => {
                write!(f, "crafting cell ({row}, {col}) already holds an item")
            }
            Self::CraftingCellEmpty { row, col } => {
                write!(f, "crafting cell ({row}, {col}) is empty")
            }
            Self::CraftingOpen => write!(f, "world interaction is disabled while crafting"),
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
