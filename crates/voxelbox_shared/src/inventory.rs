use crate::block::Material;
use crate::error::{SimError, SimResult};

pub const MAX_STACK_SIZE: u8 = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    pub material: Material,
    pub count: u8,
}

impl ItemStack {
    pub fn new(material: Material, count: u8) -> Self {
        assert!(
            (1..=MAX_STACK_SIZE).contains(&count),
            "item stack count must be within 1..=MAX_STACK_SIZE"
        );
        Self { material, count }
    }

    pub fn can_accept(&self, material: Material) -> bool {
        self.material == material && self.count < MAX_STACK_SIZE
    }
}

/// Nine-slot hotbar. An empty slot is `None`, so a slot can never hold a
/// material with a zero count.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    slots: [Option<ItemStack>; Self::SIZE],
    selected: usize,
}

impl Inventory {
    pub const SIZE: usize = 9;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn slots(&self) -> &[Option<ItemStack>; Self::SIZE] {
        &self.slots
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_stack(&self) -> Option<&ItemStack> {
        self.get(self.selected)
    }

    pub fn select(&mut self, slot: usize) -> SimResult<()> {
        if slot >= Self::SIZE {
            return Err(SimError::EmptySlot(slot));
        }
        self.selected = slot;
        Ok(())
    }

    /// Adds one unit, topping up an existing stack before opening a new slot.
    /// Returns the slot that received the item.
    pub fn add_item(&mut self, material: Material) -> SimResult<usize> {
        if let Some((index, stack)) = self
            .slots
            .iter_mut()
            .enumerate()
            .find_map(|(i, slot)| slot.as_mut().filter(|s| s.can_accept(material)).map(|s| (i, s)))
        {
            stack.count += 1;
            return Ok(index);
        }

        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(SimError::InventoryFull(material))?;
        *slot = Some(ItemStack::new(material, 1));
        Ok(index)
    }

    pub fn remove_one(&mut self, slot: usize) -> SimResult<Material> {
        let slot_ref = self.slots.get_mut(slot).ok_or(SimError::EmptySlot(slot))?;
        let stack = slot_ref.as_mut().ok_or(SimError::EmptySlot(slot))?;
        let material = stack.material;
        stack.count -= 1;
        if stack.count == 0 {
            *slot_ref = None;
        }
        Ok(material)
    }

    pub fn count_material(&self, material: Material) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| stack.material == material)
            .map(|stack| u32::from(stack.count))
            .sum()
    }

    pub fn total_count(&self) -> u32 {
        self.slots.iter().flatten().map(|stack| u32::from(stack.count)).sum()
    }
}
