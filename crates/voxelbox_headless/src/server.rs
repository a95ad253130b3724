use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use glam::Vec3;
use tracing::{debug, info, warn};

use voxelbox_shared::error::SimResult;
use voxelbox_shared::sim::{Actor, InputEvent, SimEvent, Simulation};

use crate::commands::{self, Command};
use crate::config::HeadlessConfig;
use crate::player::PlayerState;

const STATUS_INTERVAL_SECONDS: u64 = 30;

pub struct Host {
    config: HeadlessConfig,
    sim: Simulation,
    player: Option<PlayerState>,
    running: Arc<AtomicBool>,
    command_rx: Receiver<Command>,
}

impl Host {
    pub fn new(config: HeadlessConfig, running: Arc<AtomicBool>, command_rx: Receiver<Command>) -> Self {
        let sim = Simulation::new(&config.sim);
        let center = config.sim.world_size / 2;
        let player = PlayerState::spawn_above(sim.grid(), center, center);
        match &player {
            Some(player) => info!("Actor spawned at {}", player.actor.position),
            None => warn!("No terrain at world center; actor stays unspawned until /tp"),
        }
        Self {
            config,
            sim,
            player,
            running,
            command_rx,
        }
    }

    fn actor(&self) -> Option<&Actor> {
        self.player.as_ref().map(|player| &player.actor)
    }

    pub fn run(&mut self) {
        let tick_duration = Duration::from_secs_f32(self.config.tick_seconds());
        let dt = self.config.tick_seconds();
        let status_interval = u64::from(self.config.tick_rate) * STATUS_INTERVAL_SECONDS;
        info!(
            "Starting headless simulation at {} Hz (seed {}, world {}x{})",
            self.config.tick_rate,
            self.config.sim.seed,
            self.config.sim.world_size,
            self.config.sim.world_size
        );

        while self.running.load(Ordering::SeqCst) {
            let tick_start = Instant::now();

            self.handle_console_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let actor = self.player.as_ref().map(|player| player.actor);
            self.sim.tick(dt, actor.as_ref());
            self.log_events();

            let tick = self.sim.tick_count();
            if tick % status_interval == 0 {
                self.log_status();
            }
            if self.config.max_ticks.is_some_and(|max| tick >= max) {
                info!("Reached tick limit of {tick}");
                break;
            }

            let elapsed = tick_start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            }
        }

        self.log_status();
        info!("Simulation stopped after {} ticks. Goodbye!", self.sim.tick_count());
    }

    fn handle_console_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.execute_console_command(command);
        }
    }

    fn send_input(&mut self, event: InputEvent) -> SimResult<()> {
        let actor = self.player.as_ref().map(|player| player.actor);
        self.sim.handle_input(event, actor.as_ref())
    }

    fn execute_console_command(&mut self, command: Command) {
        match command {
            Command::Noop => {}
            Command::Stop => self.request_shutdown("console /stop"),
            Command::Help => log_help(),
            Command::Break(target) => match self.send_input(InputEvent::BeginBreak { target }) {
                Ok(()) => info!("[CONSOLE] breaking {target} (hold until /release)"),
                Err(err) => warn!("[CONSOLE] /break failed: {err}"),
            },
            Command::Release => {
                if let Err(err) = self.send_input(InputEvent::EndBreak) {
                    warn!("[CONSOLE] /release failed: {err}");
                }
            }
            Command::Place { target, normal } => {
                if let Err(err) = self.send_input(InputEvent::Place { target, normal }) {
                    warn!("[CONSOLE] /place failed: {err}");
                }
            }
            Command::Select(slot) => match self.send_input(InputEvent::SelectSlot(slot)) {
                Ok(()) => info!("[CONSOLE] selected slot {slot}"),
                Err(err) => warn!("[CONSOLE] /select failed: {err}"),
            },
            Command::ToggleCrafting => match self.send_input(InputEvent::ToggleCrafting) {
                Ok(()) if self.sim.is_crafting_open() => info!("[CONSOLE] crafting screen opened"),
                Ok(()) => info!("[CONSOLE] crafting screen closed"),
                Err(err) => warn!("[CONSOLE] /craft failed: {err}"),
            },
            Command::SetCell { row, col, material } => {
                self.sim.set_crafting_cell(row, col, material);
                self.log_crafting();
            }
            Command::Fill { row, col, slot } => match self.sim.fill_crafting_cell(row, col, slot) {
                Ok(_) => self.log_crafting(),
                Err(err) => warn!("[CONSOLE] /fill failed: {err}"),
            },
            Command::Take { row, col } => match self.sim.take_crafting_cell(row, col) {
                Ok(_) => self.log_crafting(),
                Err(err) => warn!("[CONSOLE] /take failed: {err}"),
            },
            Command::Collect => {
                if let Err(err) = self.sim.collect_crafting_output() {
                    warn!("[CONSOLE] /collect failed: {err}");
                }
            }
            Command::Drop => {
                if let Err(err) = self.send_input(InputEvent::DropSelected) {
                    warn!("[CONSOLE] /drop failed: {err}");
                }
            }
            Command::Teleport { x, y, z } => {
                let position = Vec3::new(x, y, z);
                match self.player.as_mut() {
                    Some(player) => player.teleport(position),
                    None => self.player = Some(PlayerState::new(position)),
                }
                info!("[CONSOLE] actor teleported to [{x}, {y}, {z}]");
            }
            Command::Look { view } => self.look(view),
            Command::Inventory => self.log_inventory(),
            Command::Status => self.log_status(),
            Command::InvalidUsage(message) => warn!("[CONSOLE] {message}"),
            Command::Unknown(input) => {
                warn!("[CONSOLE] unknown command '{input}' (try /help)")
            }
        }
    }

    fn look(&mut self, view: Option<(f32, f32)>) {
        let Some(player) = self.player.as_mut() else {
            warn!("[CONSOLE] /look failed: actor has not spawned yet");
            return;
        };
        if let Some((yaw, pitch)) = view {
            player.set_view(yaw, pitch);
        }
        let (yaw, pitch) = (player.yaw, player.pitch);
        match self.actor().and_then(|actor| self.sim.hovered_block(actor)) {
            Some(hit) => {
                let material = self
                    .sim
                    .grid()
                    .get(hit.pos)
                    .map_or("?", |block| block.material.name());
                let face = hit
                    .face
                    .map_or_else(|| "inside".to_string(), |face| format!("{face:?}"));
                info!("[CONSOLE] yaw {yaw:.0} pitch {pitch:.0}: {material} at {} (face {face})", hit.pos);
            }
            None => info!("[CONSOLE] yaw {yaw:.0} pitch {pitch:.0}: nothing within reach"),
        }
    }

    fn request_shutdown(&mut self, source: &str) {
        info!("Shutdown requested via {source}");
        self.running.store(false, Ordering::SeqCst);
    }

    fn log_events(&mut self) {
        for event in self.sim.drain_events() {
            match event {
                SimEvent::BlockBroken { pos, material } => {
                    info!("Broke {} at {pos}", material.display_name())
                }
                SimEvent::BlockPlaced { pos, material } => {
                    info!("Placed {} at {pos}", material.display_name())
                }
                SimEvent::ParticleBurst { origin, count, .. } => {
                    debug!("Particle burst of {count} at {origin}")
                }
                SimEvent::ItemSpawned { id, material, position } => {
                    debug!("Item {} ({}) spawned at {position}", id.0, material.name())
                }
                SimEvent::ItemPickedUp { id, material, slot } => {
                    info!("Picked up {} (item {}) into slot {slot}", material.display_name(), id.0)
                }
                SimEvent::ItemDespawned { id, material } => {
                    debug!("Item {} ({}) despawned", id.0, material.name())
                }
                SimEvent::Crafted { output } => info!("Crafted {}", output.display_name()),
            }
        }
    }

    fn log_inventory(&self) {
        let inventory = self.sim.inventory();
        info!("[CONSOLE] hotbar (selected slot {}):", inventory.selected());
        for (slot, stack) in inventory.slots().iter().enumerate() {
            match stack {
                Some(stack) => info!("[CONSOLE]   {slot}: {} x{}", stack.material.display_name(), stack.count),
                None => info!("[CONSOLE]   {slot}: empty"),
            }
        }
    }

    fn log_crafting(&self) {
        let cell = |row, col| {
            self.sim
                .crafting()
                .cell(row, col)
                .map_or("-", |material| material.name())
        };
        let output = self
            .sim
            .crafting()
            .evaluate()
            .map_or("nothing", |material| material.name());
        info!(
            "[CONSOLE] crafting [{} {}] [{} {}] -> {output}",
            cell(0, 0),
            cell(0, 1),
            cell(1, 0),
            cell(1, 1)
        );
    }

    fn log_status(&self) {
        let position = self
            .actor()
            .map_or_else(|| "unspawned".to_string(), |actor| actor.position.to_string());
        let breaking = self
            .sim
            .breaking_target()
            .map_or_else(|| "idle".to_string(), |pos| {
                format!("{pos} at {:.0}%", self.sim.break_progress() * 100.0)
            });
        info!(
            "[STATUS] tick {} ({:.1}s), {} blocks, {} items, actor {position}, breaking {breaking}",
            self.sim.tick_count(),
            self.sim.clock(),
            self.sim.grid().len(),
            self.sim.items().len()
        );
    }
}

fn log_help() {
    info!("[CONSOLE] Available commands:");
    info!("[CONSOLE]   /break <x> <y> <z>, /release");
    info!("[CONSOLE]   /place <x> <y> <z> <nx> <ny> <nz>");
    info!("[CONSOLE]   /select <slot 0-8>, /drop, /inv");
    info!("[CONSOLE]   /craft, /set <row> <col> <material|none>, /fill <row> <col> <slot>, /take <row> <col>, /collect");
    info!("[CONSOLE]   /tp <x> <y> <z>, /look [<yaw> <pitch>]");
    info!("[CONSOLE]   /status, /help, /stop");
}

pub fn run(config: HeadlessConfig, running: Arc<AtomicBool>) -> io::Result<()> {
    let (command_tx, command_rx) = mpsc::channel();
    spawn_console_command_thread(command_tx)?;

    let mut host = Host::new(config, running, command_rx);
    host.run();
    Ok(())
}

fn spawn_console_command_thread(command_tx: Sender<Command>) -> io::Result<()> {
    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line_result in stdin.lock().lines() {
                let line = match line_result {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("Failed to read console input: {err}");
                        break;
                    }
                };

                let command = commands::parse_command(&line);
                if command_tx.send(command).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}
