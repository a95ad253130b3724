use tracing::debug;

use crate::block::Material;
use crate::error::{SimError, SimResult};
use crate::inventory::Inventory;

pub const GRID_SIZE: usize = 2;

pub type Pattern = [[Option<Material>; GRID_SIZE]; GRID_SIZE];

#[derive(Copy, Clone, Debug)]
struct RecipeDef {
    pattern: Pattern,
    output: Material,
}

const WOOD: Option<Material> = Some(Material::Wood);
const STONE: Option<Material> = Some(Material::Stone);

const RECIPES: &[RecipeDef] = &[
    // Four wood in a square -> cobble
    RecipeDef {
        pattern: [[WOOD, WOOD], [WOOD, WOOD]],
        output: Material::Cobble,
    },
    // Stone on the diagonal -> sand
    RecipeDef {
        pattern: [[STONE, None], [None, STONE]],
        output: Material::Sand,
    },
];

/// Exact lookup of a full 2x2 pattern, empty cells included.
pub fn match_pattern(pattern: &Pattern) -> Option<Material> {
    RECIPES
        .iter()
        .find(|recipe| &recipe.pattern == pattern)
        .map(|recipe| recipe.output)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CraftingGrid {
    cells: Pattern,
}

impl CraftingGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Material> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn cells(&self) -> &Pattern {
        &self.cells
    }

    /// Panics when `row` or `col` is outside the 2x2 grid.
    pub fn set_cell(&mut self, row: usize, col: usize, material: Option<Material>) {
        self.cells[row][col] = material;
    }

    pub fn clear(&mut self) {
        self.cells = Pattern::default();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    pub fn evaluate(&self) -> Option<Material> {
        match_pattern(&self.cells)
    }

    /// Moves one unit from an inventory slot into an empty cell.
    pub fn fill_from_slot(
        &mut self,
        row: usize,
        col: usize,
        inventory: &mut Inventory,
        slot: usize,
    ) -> SimResult<Material> {
        if self.cells[row][col].is_some() {
            return Err(SimError::CraftingCellOccupied { row, col });
        }
        let material = inventory.remove_one(slot)?;
        self.cells[row][col] = Some(material);
        Ok(material)
    }

    /// Hands a cell's item back to the inventory.
    pub fn take_cell(&mut self, row: usize, col: usize, inventory: &mut Inventory) -> SimResult<Material> {
        let Some(material) = self.cells[row][col] else {
            return Err(SimError::CraftingCellEmpty { row, col });
        };
        inventory.add_item(material)?;
        self.cells[row][col] = None;
        Ok(material)
    }

    /// Consumes all four cells and grants one unit of the output.
    pub fn collect_output(&mut self, inventory: &mut Inventory) -> SimResult<Material> {
        let output = self.evaluate().ok_or(SimError::NoRecipe)?;
        let slot = inventory.add_item(output)?;
        debug!(output = output.name(), slot, "crafted item");
        self.clear();
        Ok(output)
    }
}
