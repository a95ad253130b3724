use glam::{IVec3, Vec3};

use crate::grid::WorldGrid;

#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub fn normal_ivec3(&self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }

    /// Snaps an arbitrary hit normal to the face of its dominant axis.
    /// Ties prefer x, then y. Returns `None` for zero or non-finite input.
    pub fn from_normal(normal: Vec3) -> Option<Face> {
        if !normal.is_finite() || normal == Vec3::ZERO {
            return None;
        }
        let abs = normal.abs();
        let face = if abs.x >= abs.y && abs.x >= abs.z {
            if normal.x > 0.0 {
                Face::PosX
            } else {
                Face::NegX
            }
        } else if abs.y >= abs.z {
            if normal.y > 0.0 {
                Face::PosY
            } else {
                Face::NegY
            }
        } else if normal.z > 0.0 {
            Face::PosZ
        } else {
            Face::NegZ
        };
        Some(face)
    }
}

/// Grid walk over unit cells centered on integer coordinates. The first
/// item is the cell holding the origin and carries no entry face.
#[derive(Debug, Copy, Clone)]
pub struct RaycastIter {
    current: IVec3,
    step: IVec3,
    t_max: Vec3,
    t_delta: Vec3,
    max_distance: f32,
    started: bool,
    finished: bool,
}

fn axis_step(d: f32) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

impl RaycastIter {
    fn new(ray: &Ray, max_distance: f32) -> Self {
        let direction = ray.direction.normalize_or_zero();
        // Shift into a lattice where cell `c` spans `[c, c + 1)`.
        let origin = ray.origin + Vec3::splat(0.5);
        let step = IVec3::new(
            axis_step(direction.x),
            axis_step(direction.y),
            axis_step(direction.z),
        );
        let current = origin.floor().as_ivec3();

        let boundary = |cell: i32, step: i32| {
            if step > 0 {
                cell as f32 + 1.0
            } else {
                cell as f32
            }
        };
        let t_to = |next: f32, from: f32, d: f32| {
            if d != 0.0 {
                (next - from) / d
            } else {
                f32::INFINITY
            }
        };
        let t_max = Vec3::new(
            t_to(boundary(current.x, step.x), origin.x, direction.x),
            t_to(boundary(current.y, step.y), origin.y, direction.y),
            t_to(boundary(current.z, step.z), origin.z, direction.z),
        );
        let delta = |d: f32| if d != 0.0 { 1.0 / d.abs() } else { f32::INFINITY };
        let t_delta = Vec3::new(delta(direction.x), delta(direction.y), delta(direction.z));

        Self {
            current,
            step,
            t_max,
            t_delta,
            max_distance: max_distance.max(0.0),
            started: false,
            finished: direction == Vec3::ZERO,
        }
    }
}

impl Iterator for RaycastIter {
    type Item = (IVec3, Option<Face>);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some((self.current, None));
        }
        if self.finished {
            return None;
        }

        let (axis, distance) = if self.t_max.x <= self.t_max.y && self.t_max.x <= self.t_max.z {
            (0usize, self.t_max.x)
        } else if self.t_max.y <= self.t_max.z {
            (1usize, self.t_max.y)
        } else {
            (2usize, self.t_max.z)
        };

        if !distance.is_finite() || distance > self.max_distance {
            self.finished = true;
            return None;
        }

        let face = match axis {
            0 => {
                self.current.x += self.step.x;
                self.t_max.x += self.t_delta.x;
                if self.step.x > 0 {
                    Face::NegX
                } else {
                    Face::PosX
                }
            }
            1 => {
                self.current.y += self.step.y;
                self.t_max.y += self.t_delta.y;
                if self.step.y > 0 {
                    Face::NegY
                } else {
                    Face::PosY
                }
            }
            _ => {
                self.current.z += self.step.z;
                self.t_max.z += self.t_delta.z;
                if self.step.z > 0 {
                    Face::NegZ
                } else {
                    Face::PosZ
                }
            }
        };

        Some((self.current, Some(face)))
    }
}

pub fn raycast_blocks(ray: &Ray, max_distance: f32) -> RaycastIter {
    RaycastIter::new(ray, max_distance)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RayHit {
    pub pos: IVec3,
    /// Face the ray entered through; `None` when the origin is inside the block.
    pub face: Option<Face>,
}

/// First occupied cell along `ray` within `max_distance`.
pub fn pick_block(grid: &WorldGrid, ray: &Ray, max_distance: f32) -> Option<RayHit> {
    raycast_blocks(ray, max_distance)
        .find(|(pos, _)| grid.contains(*pos))
        .map(|(pos, face)| RayHit { pos, face })
}
