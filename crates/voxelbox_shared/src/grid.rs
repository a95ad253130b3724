use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;

use crate::block::{Block, Material};
use crate::coords::block_containing;
use crate::error::{SimError, SimResult};

/// Sparse block storage keyed by integer coordinate.
#[derive(Clone, Debug, Default)]
pub struct WorldGrid {
    blocks: FxHashMap<IVec3, Block>,
}

impl WorldGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: IVec3) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    pub fn get_mut(&mut self, pos: IVec3) -> Option<&mut Block> {
        self.blocks.get_mut(&pos)
    }

    pub fn contains(&self, pos: IVec3) -> bool {
        self.blocks.contains_key(&pos)
    }

    pub fn insert(&mut self, block: Block) -> SimResult<()> {
        if self.blocks.contains_key(&block.pos) {
            return Err(SimError::Occupied(block.pos));
        }
        self.blocks.insert(block.pos, block);
        Ok(())
    }

    pub fn place(&mut self, pos: IVec3, material: Material) -> SimResult<()> {
        self.insert(Block::new(pos, material))
    }

    pub fn remove(&mut self, pos: IVec3) -> Option<Block> {
        self.blocks.remove(&pos)
    }

    /// Block whose unit cube contains `point`, if any.
    pub fn block_at_point(&self, point: Vec3) -> Option<&Block> {
        self.get(block_containing(point))
    }

    /// Highest occupied y in the `(x, z)` column.
    ///
    /// Walks every stored block, so keep it to one-off queries such as
    /// choosing a spawn column; it is not meant for per-tick use.
    pub fn top_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        self.blocks
            .keys()
            .filter(|pos| pos.x == x && pos.z == z)
            .map(|pos| pos.y)
            .max()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn count_material(&self, material: Material) -> usize {
        self.blocks
            .values()
            .filter(|block| block.material == material)
            .count()
    }
}
