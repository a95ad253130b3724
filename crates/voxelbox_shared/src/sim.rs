use glam::{IVec3, Vec3};
use tracing::{debug, info};

use crate::block::Material;
use crate::breaking::{place_block, BlockBreaker, PARTICLE_BURST_COUNT};
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::grid::WorldGrid;
use crate::inventory::Inventory;
use crate::item_drop::{ItemDropId, ItemDrops, ItemEvent};
use crate::physics::{pick_block, Face, Ray, RayHit};
use crate::recipe::CraftingGrid;
use crate::worldgen::TerrainGenerator;

pub const EYE_HEIGHT: f32 = 1.6;

/// The collecting, breaking and placing entity supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    pub position: Vec3,
    pub eye: Vec3,
    /// View direction; only its horizontal part matters for drops.
    pub facing: Vec3,
}

impl Actor {
    pub fn standing_at(position: Vec3) -> Self {
        Self {
            position,
            eye: position + Vec3::Y * EYE_HEIGHT,
            facing: Vec3::NEG_Z,
        }
    }

    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.eye = position + Vec3::Y * EYE_HEIGHT;
    }

    pub fn view_ray(&self) -> Ray {
        Ray {
            origin: self.eye,
            direction: self.facing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    BeginBreak { target: IVec3 },
    EndBreak,
    Place { target: IVec3, normal: Vec3 },
    SelectSlot(usize),
    ToggleCrafting,
    DropSelected,
}

/// Render hints and state changes for an external view.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    BlockBroken {
        pos: IVec3,
        material: Material,
    },
    BlockPlaced {
        pos: IVec3,
        material: Material,
    },
    ParticleBurst {
        origin: Vec3,
        color: [f32; 3],
        count: u32,
    },
    ItemSpawned {
        id: ItemDropId,
        material: Material,
        position: Vec3,
    },
    ItemPickedUp {
        id: ItemDropId,
        material: Material,
        slot: usize,
    },
    ItemDespawned {
        id: ItemDropId,
        material: Material,
    },
    Crafted {
        output: Material,
    },
}

impl From<ItemEvent> for SimEvent {
    fn from(event: ItemEvent) -> Self {
        match event {
            ItemEvent::PickedUp { id, material, slot } => SimEvent::ItemPickedUp { id, material, slot },
            ItemEvent::Despawned { id, material } => SimEvent::ItemDespawned { id, material },
        }
    }
}

pub struct Simulation {
    grid: WorldGrid,
    inventory: Inventory,
    items: ItemDrops,
    breaker: BlockBreaker,
    crafting: CraftingGrid,
    crafting_open: bool,
    clock: f64,
    tick_count: u64,
    events: Vec<SimEvent>,
}

impl Simulation {
    /// Generates the terrain once and returns a ready simulation.
    pub fn new(config: &SimConfig) -> Self {
        let config = config.clone().sanitize();
        let generator = TerrainGenerator::new(config.seed, config.world_size);
        let mut grid = WorldGrid::new();
        let stats = generator.populate(&mut grid);
        info!(
            "Generated {}x{} world with seed {}: {} blocks, {} trees, {} cacti",
            config.world_size,
            config.world_size,
            config.seed,
            stats.blocks,
            stats.trees,
            stats.cacti
        );
        Self::with_grid(grid, &config)
    }

    /// Wraps an existing grid without running terrain generation.
    pub fn with_grid(grid: WorldGrid, config: &SimConfig) -> Self {
        let config = config.clone().sanitize();
        Self {
            grid,
            inventory: Inventory::new(),
            items: ItemDrops::new(config.item_lifetime_ticks),
            breaker: BlockBreaker::new(config.reach),
            crafting: CraftingGrid::new(),
            crafting_open: false,
            clock: 0.0,
            tick_count: 0,
            events: Vec::new(),
        }
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn items(&self) -> &ItemDrops {
        &self.items
    }

    pub fn crafting(&self) -> &CraftingGrid {
        &self.crafting
    }

    pub fn is_crafting_open(&self) -> bool {
        self.crafting_open
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn breaking_target(&self) -> Option<IVec3> {
        self.breaker.target()
    }

    pub fn break_progress(&self) -> f32 {
        self.breaker.progress(&self.grid)
    }

    pub fn break_visual_scale(&self) -> f32 {
        self.breaker.visual_scale(&self.grid)
    }

    pub fn reach(&self) -> f32 {
        self.breaker.reach()
    }

    /// Block the actor is looking at, within reach.
    pub fn hovered_block(&self, actor: &Actor) -> Option<RayHit> {
        pick_block(&self.grid, &actor.view_ray(), self.breaker.reach())
    }

    pub fn handle_input(&mut self, event: InputEvent, actor: Option<&Actor>) -> SimResult<()> {
        let result = self.apply_input(event, actor);
        if let Err(err) = &result {
            debug!(?event, %err, "input rejected");
        }
        result
    }

    fn apply_input(&mut self, event: InputEvent, actor: Option<&Actor>) -> SimResult<()> {
        match event {
            InputEvent::BeginBreak { target } => {
                self.ensure_world_interaction()?;
                let actor = actor.ok_or(SimError::ActorUnavailable)?;
                self.breaker
                    .begin_break(&mut self.grid, target, actor.eye, self.clock)
            }
            InputEvent::EndBreak => {
                self.breaker.end_break(&mut self.grid);
                Ok(())
            }
            InputEvent::Place { target, normal } => {
                self.ensure_world_interaction()?;
                let actor = actor.ok_or(SimError::ActorUnavailable)?;
                let face = Face::from_normal(normal).ok_or(SimError::DegenerateNormal)?;
                let placed = place_block(
                    &mut self.grid,
                    &mut self.inventory,
                    target,
                    face,
                    actor.eye,
                    self.breaker.reach(),
                )?;
                self.events.push(SimEvent::BlockPlaced {
                    pos: placed.pos,
                    material: placed.material,
                });
                Ok(())
            }
            InputEvent::SelectSlot(slot) => self.inventory.select(slot),
            InputEvent::ToggleCrafting => {
                self.crafting_open = !self.crafting_open;
                if self.crafting_open {
                    self.breaker.end_break(&mut self.grid);
                }
                debug!(open = self.crafting_open, "crafting screen toggled");
                Ok(())
            }
            InputEvent::DropSelected => {
                self.ensure_world_interaction()?;
                let actor = actor.ok_or(SimError::ActorUnavailable)?;
                let material = self.inventory.remove_one(self.inventory.selected())?;
                let id = self.items.throw(material, actor.eye, actor.facing);
                let position = self.items.get(id).map_or(actor.eye, |item| item.position);
                self.events.push(SimEvent::ItemSpawned {
                    id,
                    material,
                    position,
                });
                Ok(())
            }
        }
    }

    fn ensure_world_interaction(&self) -> SimResult<()> {
        if self.crafting_open {
            return Err(SimError::CraftingOpen);
        }
        Ok(())
    }

    pub fn set_crafting_cell(&mut self, row: usize, col: usize, material: Option<Material>) {
        self.crafting.set_cell(row, col, material);
    }

    pub fn fill_crafting_cell(&mut self, row: usize, col: usize, slot: usize) -> SimResult<Material> {
        self.crafting.fill_from_slot(row, col, &mut self.inventory, slot)
    }

    pub fn take_crafting_cell(&mut self, row: usize, col: usize) -> SimResult<Material> {
        self.crafting.take_cell(row, col, &mut self.inventory)
    }

    pub fn collect_crafting_output(&mut self) -> SimResult<Material> {
        let output = self.crafting.collect_output(&mut self.inventory)?;
        self.events.push(SimEvent::Crafted { output });
        Ok(output)
    }

    /// Advances the clock, then simulates items, then resolves breaking.
    pub fn tick(&mut self, dt: f32, actor: Option<&Actor>) {
        let dt = dt.max(0.0);
        self.clock += f64::from(dt);
        self.tick_count += 1;

        let item_events = self.items.tick(
            &self.grid,
            &mut self.inventory,
            actor.map(|actor| actor.position),
            dt,
        );
        self.events.extend(item_events.into_iter().map(SimEvent::from));

        if let Some(broken) = self.breaker.advance(&mut self.grid, dt) {
            let origin = broken.pos.as_vec3();
            self.events.push(SimEvent::ParticleBurst {
                origin,
                color: broken.material.color_hint(),
                count: PARTICLE_BURST_COUNT,
            });
            let material = broken.material.drop_material();
            let id = self.items.spawn(material, origin);
            self.events.push(SimEvent::ItemSpawned {
                id,
                material,
                position: origin,
            });
            self.events.push(SimEvent::BlockBroken {
                pos: broken.pos,
                material: broken.material,
            });
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use super::{Actor, InputEvent, SimEvent, Simulation};
    use crate::block::Material;
    use crate::config::SimConfig;
    use crate::error::SimError;
    use crate::grid::WorldGrid;

    const DT: f32 = 1.0 / 60.0;

    fn flat_world() -> Simulation {
        let mut grid = WorldGrid::new();
        for x in -2..=2 {
            for z in -2..=2 {
                grid.place(IVec3::new(x, 0, z), Material::Stone).unwrap();
            }
        }
        Simulation::with_grid(grid, &SimConfig::default())
    }

    fn actor() -> Actor {
        Actor::standing_at(Vec3::new(0.0, 0.5, 0.0))
    }

    fn run_until_broken(sim: &mut Simulation, actor: &Actor) -> Vec<SimEvent> {
        for _ in 0..600 {
            sim.tick(DT, Some(actor));
            let events = sim.drain_events();
            if events.iter().any(|e| matches!(e, SimEvent::BlockBroken { .. })) {
                return events;
            }
        }
        panic!("block never broke");
    }

    #[test]
    fn breaking_then_pickup_conserves_material() {
        let mut sim = flat_world();
        let actor = actor();
        let blocks_before = sim.grid().len();

        sim.handle_input(InputEvent::BeginBreak { target: IVec3::new(1, 0, 0) }, Some(&actor))
            .unwrap();
        let events = run_until_broken(&mut sim, &actor);

        assert!(matches!(
            events.as_slice(),
            [
                SimEvent::ParticleBurst { count: 8, .. },
                SimEvent::ItemSpawned { material: Material::Stone, .. },
                SimEvent::BlockBroken { material: Material::Stone, .. },
            ]
        ));
        assert_eq!(sim.grid().len(), blocks_before - 1);
        assert!(!sim.grid().contains(IVec3::new(1, 0, 0)));
        assert_eq!(sim.items().len(), 1);

        sim.tick(DT, Some(&actor));
        let events = sim.drain_events();
        assert!(matches!(
            events.as_slice(),
            [SimEvent::ItemPickedUp { material: Material::Stone, slot: 0, .. }]
        ));
        assert_eq!(sim.inventory().count_material(Material::Stone), 1);
        assert!(sim.items().is_empty());
    }

    #[test]
    fn break_progress_is_monotonic_until_release() {
        let mut sim = flat_world();
        let actor = actor();
        sim.handle_input(InputEvent::BeginBreak { target: IVec3::ZERO }, Some(&actor))
            .unwrap();

        let mut last = 0.0;
        for _ in 0..30 {
            sim.tick(DT, Some(&actor));
            assert!(sim.break_progress() >= last);
            last = sim.break_progress();
        }
        assert!(last > 0.0 && last < 1.0);

        sim.handle_input(InputEvent::EndBreak, Some(&actor)).unwrap();
        assert_eq!(sim.break_progress(), 0.0);
        assert_eq!(sim.break_visual_scale(), 1.0);
        assert!(sim.grid().contains(IVec3::ZERO));
    }

    #[test]
    fn place_uses_selected_slot_and_normal() {
        let mut sim = flat_world();
        let actor = actor();
        sim.inventory_mut().add_item(Material::Dirt).unwrap();
        sim.inventory_mut().add_item(Material::Glass).unwrap();
        sim.handle_input(InputEvent::SelectSlot(1), None).unwrap();

        sim.handle_input(
            InputEvent::Place {
                target: IVec3::new(2, 0, 2),
                normal: Vec3::new(0.1, 0.95, 0.0),
            },
            Some(&actor),
        )
        .unwrap();

        assert_eq!(
            sim.grid().get(IVec3::new(2, 1, 2)).map(|b| b.material),
            Some(Material::Glass)
        );
        assert_eq!(sim.inventory().count_material(Material::Glass), 0);
        assert_eq!(
            sim.drain_events(),
            vec![SimEvent::BlockPlaced {
                pos: IVec3::new(2, 1, 2),
                material: Material::Glass
            }]
        );
        assert_eq!(
            sim.handle_input(
                InputEvent::Place {
                    target: IVec3::ZERO,
                    normal: Vec3::ZERO
                },
                Some(&actor)
            ),
            Err(SimError::DegenerateNormal)
        );
    }

    #[test]
    fn crafting_screen_freezes_world_interaction() {
        let mut sim = flat_world();
        let actor = actor();
        sim.handle_input(InputEvent::BeginBreak { target: IVec3::ZERO }, Some(&actor))
            .unwrap();
        sim.tick(DT, Some(&actor));

        sim.handle_input(InputEvent::ToggleCrafting, Some(&actor)).unwrap();
        assert!(sim.is_crafting_open());
        assert_eq!(sim.breaking_target(), None);
        assert_eq!(
            sim.handle_input(InputEvent::BeginBreak { target: IVec3::ZERO }, Some(&actor)),
            Err(SimError::CraftingOpen)
        );

        let wood = Some(Material::Wood);
        for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            sim.set_crafting_cell(row, col, wood);
        }
        assert_eq!(sim.collect_crafting_output(), Ok(Material::Cobble));
        assert!(sim.drain_events().contains(&SimEvent::Crafted {
            output: Material::Cobble
        }));

        sim.handle_input(InputEvent::ToggleCrafting, Some(&actor)).unwrap();
        assert!(sim
            .handle_input(InputEvent::BeginBreak { target: IVec3::ZERO }, Some(&actor))
            .is_ok());
    }

    #[test]
    fn actions_without_actor_are_rejected() {
        let mut sim = flat_world();
        assert_eq!(
            sim.handle_input(InputEvent::BeginBreak { target: IVec3::ZERO }, None),
            Err(SimError::ActorUnavailable)
        );
        assert_eq!(
            sim.handle_input(InputEvent::DropSelected, None),
            Err(SimError::ActorUnavailable)
        );
        sim.tick(DT, None);
        assert_eq!(sim.tick_count(), 1);
        assert!((sim.clock() - f64::from(DT)).abs() < 1e-9);
    }

    #[test]
    fn drop_selected_spawns_item_in_front_of_actor() {
        let mut sim = flat_world();
        let actor = actor();
        sim.inventory_mut().add_item(Material::Sand).unwrap();

        sim.handle_input(InputEvent::DropSelected, Some(&actor)).unwrap();
        assert_eq!(sim.inventory().total_count(), 0);
        assert_eq!(sim.items().len(), 1);
        let item = &sim.items().items()[0];
        assert!(item.position.z < actor.eye.z);
        assert!(matches!(
            sim.drain_events().as_slice(),
            [SimEvent::ItemSpawned { material: Material::Sand, .. }]
        ));
        assert_eq!(
            sim.handle_input(InputEvent::DropSelected, Some(&actor)),
            Err(SimError::EmptySlot(0))
        );
    }

    #[test]
    fn dropped_item_is_not_collected_straight_back() {
        let mut sim = flat_world();
        let actor = actor();
        sim.inventory_mut().add_item(Material::Sand).unwrap();
        sim.handle_input(InputEvent::DropSelected, Some(&actor)).unwrap();
        sim.drain_events();

        for _ in 0..10 {
            sim.tick(DT, Some(&actor));
            let events = sim.drain_events();
            assert!(!events
                .iter()
                .any(|e| matches!(e, SimEvent::ItemPickedUp { .. })));
        }
        assert_eq!(sim.inventory().count_material(Material::Sand), 0);
        assert_eq!(sim.items().len(), 1);
    }

    #[test]
    fn crafting_cells_move_items_through_the_simulation() {
        let mut sim = flat_world();
        sim.inventory_mut().add_item(Material::Stone).unwrap();
        sim.inventory_mut().add_item(Material::Stone).unwrap();

        assert_eq!(sim.fill_crafting_cell(0, 0, 0), Ok(Material::Stone));
        assert_eq!(sim.fill_crafting_cell(1, 1, 0), Ok(Material::Stone));
        assert_eq!(sim.crafting().evaluate(), Some(Material::Sand));

        assert_eq!(sim.take_crafting_cell(1, 1), Ok(Material::Stone));
        assert_eq!(sim.inventory().count_material(Material::Stone), 1);
        assert_eq!(sim.crafting().evaluate(), None);
        assert_eq!(
            sim.take_crafting_cell(1, 1),
            Err(SimError::CraftingCellEmpty { row: 1, col: 1 })
        );
    }

    #[test]
    fn hovered_block_follows_view_direction() {
        let sim = flat_world();
        let mut actor = actor();
        actor.facing = Vec3::new(0.0, -1.0, -0.2);
        let hit = sim.hovered_block(&actor).expect("looking at the floor");
        assert_eq!(hit.pos.y, 0);
    }

    #[test]
    fn generated_world_is_deterministic() {
        let config = SimConfig {
            seed: 4242,
            ..SimConfig::default()
        };
        let a = Simulation::new(&config);
        let b = Simulation::new(&config);
        assert_eq!(a.grid().len(), b.grid().len());
        for block in a.grid().iter() {
            assert_eq!(b.grid().get(block.pos).map(|b| b.material), Some(block.material));
        }
    }
}
