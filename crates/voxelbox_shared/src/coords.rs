use glam::{IVec3, Vec3};

/// Axis-aligned neighbours used when scanning for a differing biome.
pub const AXIS_OFFSETS_2D: [(i32, i32); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

/// Offsets sampled to estimate how close a column is to a biome seam.
pub const BLEND_OFFSETS_2D: [(i32, i32); 6] = [(2, 0), (-2, 0), (0, 2), (0, -2), (1, 1), (-1, -1)];

/// Maps a continuous world point to the grid key of the block containing it.
///
/// Blocks are unit cubes centered on integer coordinates, so this is a
/// component-wise round (half away from zero).
pub fn block_containing(point: Vec3) -> IVec3 {
    IVec3::new(
        point.x.round() as i32,
        point.y.round() as i32,
        point.z.round() as i32,
    )
}

pub fn distance_to_block(point: Vec3, block: IVec3) -> f32 {
    point.distance(block.as_vec3())
}
