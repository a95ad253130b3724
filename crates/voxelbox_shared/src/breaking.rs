use glam::{IVec3, Vec3};
use tracing::debug;

use crate::block::{Block, BreakState, Material};
use crate::coords::distance_to_block;
use crate::error::{SimError, SimResult};
use crate::grid::WorldGrid;
use crate::inventory::Inventory;
use crate::physics::Face;

pub const DEFAULT_REACH: f32 = 7.0;
pub const PARTICLE_BURST_COUNT: u32 = 8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BrokenBlock {
    pub pos: IVec3,
    pub material: Material,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacedBlock {
    pub pos: IVec3,
    pub material: Material,
}

/// Tracks the single block the actor is currently breaking.
#[derive(Debug, Clone)]
pub struct BlockBreaker {
    target: Option<IVec3>,
    reach: f32,
}

impl Default for BlockBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_REACH)
    }
}

impl BlockBreaker {
    pub fn new(reach: f32) -> Self {
        Self {
            target: None,
            reach,
        }
    }

    pub fn reach(&self) -> f32 {
        self.reach
    }

    pub fn target(&self) -> Option<IVec3> {
        self.target
    }

    pub fn is_breaking(&self) -> bool {
        self.target.is_some()
    }

    /// Starts a fresh session on `target`, dropping any previous one.
    pub fn begin_break(
        &mut self,
        grid: &mut WorldGrid,
        target: IVec3,
        actor_eye: Vec3,
        now: f64,
    ) -> SimResult<()> {
        if !grid.contains(target) {
            return Err(SimError::NoBlock(target));
        }
        check_reach(actor_eye, target, self.reach)?;

        self.end_break(grid);
        if let Some(block) = grid.get_mut(target) {
            block.breaking = Some(BreakState {
                pos: target,
                started_at: now,
                elapsed: 0.0,
            });
            debug!(pos = %target, material = block.material.name(), "break started");
        }
        self.target = Some(target);
        Ok(())
    }

    /// Cancels the active session; progress is discarded and nothing drops.
    pub fn end_break(&mut self, grid: &mut WorldGrid) {
        let Some(target) = self.target.take() else {
            return;
        };
        if let Some(block) = grid.get_mut(target) {
            block.breaking = None;
        }
    }

    pub fn progress(&self, grid: &WorldGrid) -> f32 {
        self.target
            .and_then(|target| grid.get(target))
            .map_or(0.0, Block::break_progress)
    }

    pub fn visual_scale(&self, grid: &WorldGrid) -> f32 {
        visual_scale(self.progress(grid))
    }

    /// Accumulates `dt` seconds of breaking. Removes and returns the block
    /// once its progress reaches 1.0.
    pub fn advance(&mut self, grid: &mut WorldGrid, dt: f32) -> Option<BrokenBlock> {
        let target = self.target?;
        let Some(block) = grid.get_mut(target) else {
            self.target = None;
            return None;
        };
        let Some(state) = block.breaking.as_mut() else {
            self.target = None;
            return None;
        };

        state.elapsed += dt.max(0.0);
        if block.break_progress() < 1.0 {
            return None;
        }

        self.target = None;
        let block = grid.remove(target)?;
        debug!(pos = %target, material = block.material.name(), "block broken");
        Some(BrokenBlock {
            pos: target,
            material: block.material,
        })
    }
}

/// Scale hint for a block being broken: shrinks from 1.0 towards 0.8.
pub fn visual_scale(progress: f32) -> f32 {
    0.8 + 0.2 * (1.0 - progress.clamp(0.0, 1.0))
}

fn check_reach(actor_eye: Vec3, target: IVec3, reach: f32) -> SimResult<()> {
    let distance = distance_to_block(actor_eye, target);
    if distance > reach {
        return Err(SimError::OutOfReach { distance });
    }
    Ok(())
}

/// Puts one unit of the selected material against `face` of `target`.
/// On any error neither the grid nor the inventory changes.
pub fn place_block(
    grid: &mut WorldGrid,
    inventory: &mut Inventory,
    target: IVec3,
    face: Face,
    actor_eye: Vec3,
    reach: f32,
) -> SimResult<PlacedBlock> {
    if !grid.contains(target) {
        return Err(SimError::NoBlock(target));
    }
    check_reach(actor_eye, target, reach)?;

    let slot = inventory.selected();
    let material = inventory
        .selected_stack()
        .map(|stack| stack.material)
        .ok_or(SimError::EmptySlot(slot))?;

    let pos = target + face.normal_ivec3();
    grid.place(pos, material)?;
    inventory.remove_one(slot)?;
    debug!(pos = %pos, material = material.name(), "block placed");
    Ok(PlacedBlock { pos, material })
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use super::{place_block, visual_scale, BlockBreaker, BrokenBlock};
    use crate::block::Material;
    use crate::error::SimError;
    use crate::grid::WorldGrid;
    use crate::inventory::Inventory;
    use crate::physics::Face;

    const EYE: Vec3 = Vec3::new(0.0, 2.0, 0.0);

    fn grid_with(material: Material) -> WorldGrid {
        let mut grid = WorldGrid::new();
        grid.place(IVec3::ZERO, material).unwrap();
        grid
    }

    #[test]
    fn stone_breaks_after_one_second() {
        let mut grid = grid_with(Material::Stone);
        let mut breaker = BlockBreaker::default();
        breaker.begin_break(&mut grid, IVec3::ZERO, EYE, 0.0).unwrap();

        let mut last = 0.0;
        for _ in 0..9 {
            assert_eq!(breaker.advance(&mut grid, 0.1), None);
            let progress = breaker.progress(&grid);
            assert!(progress >= last);
            last = progress;
        }
        assert!((breaker.visual_scale(&grid) - (0.8 + 0.2 * (1.0 - last))).abs() < 1e-6);

        assert_eq!(
            breaker.advance(&mut grid, 0.11),
            Some(BrokenBlock {
                pos: IVec3::ZERO,
                material: Material::Stone
            })
        );
        assert!(grid.is_empty());
        assert!(!breaker.is_breaking());
        assert_eq!(breaker.advance(&mut grid, 1.0), None);
    }

    #[test]
    fn end_break_resets_progress_without_drop() {
        let mut grid = grid_with(Material::Wood);
        let mut breaker = BlockBreaker::default();
        breaker.begin_break(&mut grid, IVec3::ZERO, EYE, 0.0).unwrap();
        breaker.advance(&mut grid, 0.3);
        assert!(breaker.progress(&grid) > 0.0);

        breaker.end_break(&mut grid);
        assert_eq!(breaker.progress(&grid), 0.0);
        assert!(grid.get(IVec3::ZERO).unwrap().breaking.is_none());
        assert_eq!(breaker.advance(&mut grid, 5.0), None);
        assert!(grid.contains(IVec3::ZERO));
    }

    #[test]
    fn rebeginning_restarts_the_session() {
        let mut grid = grid_with(Material::Stone);
        grid.place(IVec3::new(1, 0, 0), Material::Dirt).unwrap();
        let mut breaker = BlockBreaker::default();

        breaker.begin_break(&mut grid, IVec3::ZERO, EYE, 0.0).unwrap();
        breaker.advance(&mut grid, 0.5);
        breaker.begin_break(&mut grid, IVec3::new(1, 0, 0), EYE, 0.5).unwrap();

        assert!(grid.get(IVec3::ZERO).unwrap().breaking.is_none());
        let state = grid.get(IVec3::new(1, 0, 0)).unwrap().breaking.unwrap();
        assert_eq!(state.started_at, 0.5);
        assert_eq!(state.elapsed, 0.0);
    }

    #[test]
    fn begin_break_validates_target() {
        let mut grid = grid_with(Material::Stone);
        let mut breaker = BlockBreaker::default();

        assert_eq!(
            breaker.begin_break(&mut grid, IVec3::new(0, 1, 0), EYE, 0.0),
            Err(SimError::NoBlock(IVec3::new(0, 1, 0)))
        );
        let far_eye = Vec3::new(0.0, 2.0, 9.0);
        assert!(matches!(
            breaker.begin_break(&mut grid, IVec3::ZERO, far_eye, 0.0),
            Err(SimError::OutOfReach { .. })
        ));
        assert!(!breaker.is_breaking());
    }

    #[test]
    fn vanished_target_resets_session() {
        let mut grid = grid_with(Material::Grass);
        let mut breaker = BlockBreaker::default();
        breaker.begin_break(&mut grid, IVec3::ZERO, EYE, 0.0).unwrap();
        grid.remove(IVec3::ZERO);

        assert_eq!(breaker.advance(&mut grid, 1.0), None);
        assert!(!breaker.is_breaking());
    }

    #[test]
    fn place_consumes_selected_item() {
        let mut grid = grid_with(Material::Stone);
        let mut inventory = Inventory::new();
        inventory.add_item(Material::Glass).unwrap();

        let placed =
            place_block(&mut grid, &mut inventory, IVec3::ZERO, Face::PosY, EYE, 7.0).unwrap();
        assert_eq!(placed.pos, IVec3::new(0, 1, 0));
        assert_eq!(grid.get(placed.pos).map(|b| b.material), Some(Material::Glass));
        assert_eq!(inventory.total_count(), 0);

        assert_eq!(
            place_block(&mut grid, &mut inventory, IVec3::ZERO, Face::PosX, EYE, 7.0),
            Err(SimError::EmptySlot(0))
        );
    }

    #[test]
    fn place_failures_change_nothing() {
        let mut grid = grid_with(Material::Stone);
        grid.place(IVec3::new(0, 1, 0), Material::Dirt).unwrap();
        let mut inventory = Inventory::new();
        inventory.add_item(Material::Brick).unwrap();

        assert_eq!(
            place_block(&mut grid, &mut inventory, IVec3::ZERO, Face::PosY, EYE, 7.0),
            Err(SimError::Occupied(IVec3::new(0, 1, 0)))
        );
        let far_eye = Vec3::new(20.0, 0.0, 0.0);
        assert!(matches!(
            place_block(&mut grid, &mut inventory, IVec3::ZERO, Face::NegX, far_eye, 7.0),
            Err(SimError::OutOfReach { .. })
        ));
        assert_eq!(grid.len(), 2);
        assert_eq!(inventory.count_material(Material::Brick), 1);
    }

    #[test]
    fn visual_scale_shrinks_with_progress() {
        assert_eq!(visual_scale(0.0), 1.0);
        assert!((visual_scale(0.5) - 0.9).abs() < 1e-6);
        assert!((visual_scale(1.0) - 0.8).abs() < 1e-6);
        assert!((visual_scale(3.0) - 0.8).abs() < 1e-6);
    }
}
