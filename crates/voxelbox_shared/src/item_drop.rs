//! Dropped items: gravity, bouncing, spin, pickup and despawn.

use glam::Vec3;

use crate::block::Material;
use crate::coords::block_containing;
use crate::error::SimError;
use crate::grid::WorldGrid;
use crate::inventory::Inventory;

pub const GRAVITY: f32 = 1.0;
pub const BOUNCE_DAMPING: f32 = 0.5;
pub const HORIZONTAL_DAMPING: f32 = 0.8;
/// Vertical speed below which a bounce settles the item.
pub const REST_SPEED: f32 = 0.1;
/// Half the rendered item cube; items rest this far above a surface.
pub const ITEM_HALF_EXTENT: f32 = 0.125;
pub const SPIN_DEGREES_PER_SECOND: f32 = 90.0;
pub const PICKUP_DISTANCE: f32 = 2.0;
pub const DEFAULT_LIFETIME_TICKS: u32 = 300;

/// Ticks before a thrown item can be collected again.
pub const THROW_PICKUP_DELAY_TICKS: u32 = 40;

const THROW_SPEED: f32 = 0.5;
const THROW_LIFT: f32 = 0.2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemDropId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct DroppedItem {
    pub id: ItemDropId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub material: Material,
    pub grounded: bool,
    pub remaining_life_ticks: u32,
    pub picked_up: bool,
    pub spin_degrees: f32,
    /// Pickup is skipped while this is above zero.
    pub pickup_delay_ticks: u32,
}

impl DroppedItem {
    fn integrate(&mut self, grid: &WorldGrid, dt: f32) {
        if self.grounded {
            return;
        }

        self.position += self.velocity * dt;
        self.velocity.y -= GRAVITY * dt;

        let probe = block_containing(self.position - Vec3::new(0.0, ITEM_HALF_EXTENT, 0.0));
        let rest_height = match grid.get(probe) {
            Some(block) => Some(block.top() + ITEM_HALF_EXTENT),
            None if self.position.y <= ITEM_HALF_EXTENT => Some(ITEM_HALF_EXTENT),
            None => None,
        };

        if let Some(rest) = rest_height.filter(|&rest| self.position.y <= rest) {
            self.position.y = rest;
            self.velocity.y = -self.velocity.y * BOUNCE_DAMPING;
            self.velocity.x *= HORIZONTAL_DAMPING;
            self.velocity.z *= HORIZONTAL_DAMPING;
            if self.velocity.y.abs() < REST_SPEED {
                self.grounded = true;
                self.velocity = Vec3::ZERO;
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemEvent {
    PickedUp {
        id: ItemDropId,
        material: Material,
        slot: usize,
    },
    Despawned {
        id: ItemDropId,
        material: Material,
    },
}

/// Live dropped items. Order is not stable: removals swap the last item in.
#[derive(Clone, Debug)]
pub struct ItemDrops {
    items: Vec<DroppedItem>,
    next_id: u64,
    lifetime_ticks: u32,
}

impl Default for ItemDrops {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME_TICKS)
    }
}

impl ItemDrops {
    pub fn new(lifetime_ticks: u32) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            lifetime_ticks: lifetime_ticks.max(1),
        }
    }

    /// Spawns an item with a small scatter derived from its id.
    pub fn spawn(&mut self, material: Material, position: Vec3) -> ItemDropId {
        let velocity = scatter_velocity(self.next_id);
        self.spawn_with_velocity(material, position, velocity)
    }

    pub fn spawn_with_velocity(
        &mut self,
        material: Material,
        position: Vec3,
        velocity: Vec3,
    ) -> ItemDropId {
        let id = ItemDropId(self.next_id);
        self.next_id += 1;
        self.items.push(DroppedItem {
            id,
            position,
            velocity,
            material,
            grounded: false,
            remaining_life_ticks: self.lifetime_ticks,
            picked_up: false,
            spin_degrees: 0.0,
            pickup_delay_ticks: 0,
        });
        id
    }

    /// Tosses an item forward along the horizontal part of `facing`.
    pub fn throw(&mut self, material: Material, origin: Vec3, facing: Vec3) -> ItemDropId {
        let forward = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
        let velocity = forward * THROW_SPEED + Vec3::Y * THROW_LIFT;
        let id = self.spawn_with_velocity(material, origin + forward * 0.5, velocity);
        if let Some(item) = self.items.last_mut() {
            item.pickup_delay_ticks = THROW_PICKUP_DELAY_TICKS;
        }
        id
    }

    pub fn items(&self) -> &[DroppedItem] {
        &self.items
    }

    pub fn get(&self, id: ItemDropId) -> Option<&DroppedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One simulation step for every live item. `actor` is the collector's
    /// position; `None` skips pickup for this tick only.
    pub fn tick(
        &mut self,
        grid: &WorldGrid,
        inventory: &mut Inventory,
        actor: Option<Vec3>,
        dt: f32,
    ) -> Vec<ItemEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();
        let mut index = 0;

        while index < self.items.len() {
            let item = &mut self.items[index];
            item.integrate(grid, dt);
            item.spin_degrees = (item.spin_degrees + SPIN_DEGREES_PER_SECOND * dt) % 360.0;

            let collected = if item.pickup_delay_ticks > 0 {
                item.pickup_delay_ticks -= 1;
                Ok(None)
            } else {
                try_collect(item, inventory, actor)
            };
            match collected {
                Ok(Some(slot)) => {
                    item.picked_up = true;
                    let removed = self.items.swap_remove(index);
                    events.push(ItemEvent::PickedUp {
                        id: removed.id,
                        material: removed.material,
                        slot,
                    });
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::trace!(id = item.id.0, %err, "item pickup deferred");
                }
            }

            item.remaining_life_ticks = item.remaining_life_ticks.saturating_sub(1);
            if item.remaining_life_ticks == 0 {
                let removed = self.items.swap_remove(index);
                events.push(ItemEvent::Despawned {
                    id: removed.id,
                    material: removed.material,
                });
                continue;
            }

            index += 1;
        }

        events
    }
}

fn try_collect(
    item: &DroppedItem,
    inventory: &mut Inventory,
    actor: Option<Vec3>,
) -> Result<Option<usize>, SimError> {
    let actor = actor.ok_or(SimError::ActorUnavailable)?;
    if item.position.distance(actor) > PICKUP_DISTANCE {
        return Ok(None);
    }
    inventory.add_item(item.material).map(Some)
}

/// Horizontal scatter within +-0.05 and upward speed within 0.2..0.4.
fn scatter_velocity(id: u64) -> Vec3 {
    let hash = id
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    let unit = |shift: u32| ((hash >> shift) % 1001) as f32 / 1000.0;
    Vec3::new(
        (unit(8) - 0.5) * 0.1,
        0.2 + unit(24) * 0.2,
        (unit(40) - 0.5) * 0.1,
    )
}
