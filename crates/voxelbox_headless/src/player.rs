use glam::Vec3;
use voxelbox_shared::grid::WorldGrid;
use voxelbox_shared::sim::Actor;

/// Console-driven stand-in for the engine's player controller.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub actor: Actor,
    pub yaw: f32,
    pub pitch: f32,
}

impl PlayerState {
    pub fn new(position: Vec3) -> Self {
        let mut player = Self {
            actor: Actor::standing_at(position),
            yaw: 0.0,
            pitch: 0.0,
        };
        player.set_view(0.0, -45.0);
        player
    }

    /// Stands on the highest block of the `(x, z)` column, if it has any.
    pub fn spawn_above(grid: &WorldGrid, x: i32, z: i32) -> Option<Self> {
        let top = grid.top_solid_y(x, z)?;
        Some(Self::new(Vec3::new(x as f32, top as f32 + 0.5, z as f32)))
    }

    /// Yaw 0 faces -Z; pitch in degrees, positive looks up.
    pub fn set_view(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw.rem_euclid(360.0);
        self.pitch = pitch.clamp(-89.0, 89.0);
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.actor.facing = Vec3::new(
            -yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        );
    }

    pub fn teleport(&mut self, position: Vec3) {
        self.actor.teleport(position);
    }
}
