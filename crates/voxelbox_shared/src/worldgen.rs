use glam::IVec3;
use noise::{NoiseFn, Perlin};
use tracing::debug;

use crate::block::{Block, Material};
use crate::coords::{AXIS_OFFSETS_2D, BLEND_OFFSETS_2D};
use crate::grid::WorldGrid;

pub const DEFAULT_WORLD_SIZE: i32 = 20;
pub const BIOME_FREQUENCY: f64 = 0.05;
pub const HEIGHT_FREQUENCY: f64 = 0.1;
const NEIGHBOR_BLEND_CAP: f64 = 0.7;
const FEATURE_BLEND_LIMIT: f32 = 0.5;
const SUBSURFACE_DEPTH: i32 = 3;
const TREE_TRUNK_HEIGHT: i32 = 3;

/// Seedable 2D coherent noise returning values in `[-1, 1]`.
pub trait NoiseSource {
    fn sample(&self, x: f64, z: f64) -> f64;
}

impl NoiseSource for Perlin {
    fn sample(&self, x: f64, z: f64) -> f64 {
        self.get([x, z])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    Plains,
    Mountains,
    Desert,
}

impl Biome {
    pub fn from_noise(value: f64) -> Biome {
        if value < -0.2 {
            Biome::Plains
        } else if value < 0.4 {
            Biome::Mountains
        } else {
            Biome::Desert
        }
    }

    pub fn surface(self) -> Material {
        match self {
            Biome::Plains => Material::Grass,
            Biome::Mountains => Material::Stone,
            Biome::Desert => Material::Sand,
        }
    }

    pub fn subsurface(self) -> Material {
        match self {
            Biome::Plains => Material::Dirt,
            Biome::Mountains => Material::Cobble,
            Biome::Desert => Material::Sand,
        }
    }

    fn height_from_noise(self, n: f64) -> f64 {
        let n = n.clamp(-1.0, 1.0);
        match self {
            Biome::Plains => 3.0 + (n + 1.0) * 2.0,
            Biome::Mountains => (n + 1.0) * 8.0,
            Biome::Desert => 2.0 + (n + 1.0),
        }
    }

    /// One-in-N chance of a decoration per eligible column.
    fn feature_frequency(self) -> u64 {
        match self {
            Biome::Plains => 50,
            Biome::Mountains => 80,
            Biome::Desert => 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSample {
    pub biome: Biome,
    pub blend: f32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Tree,
    Cactus { height: i32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub blocks: usize,
    pub trees: usize,
    pub cacti: usize,
    pub plains_columns: usize,
    pub mountain_columns: usize,
    pub desert_columns: usize,
}

#[derive(Debug, Clone)]
pub struct TerrainGenerator<N = Perlin> {
    pub seed: u64,
    pub world_size: i32,
    biome_noise: N,
    height_noise: N,
}

impl TerrainGenerator<Perlin> {
    pub fn new(seed: u64, world_size: i32) -> Self {
        Self::with_noise(
            seed,
            world_size,
            Perlin::new(seed as u32),
            Perlin::new(seed.wrapping_add(3) as u32),
        )
    }
}

impl<N: NoiseSource> TerrainGenerator<N> {
    pub fn with_noise(seed: u64, world_size: i32, biome_noise: N, height_noise: N) -> Self {
        Self {
            seed,
            world_size,
            biome_noise,
            height_noise,
        }
    }

    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        let value = self
            .biome_noise
            .sample(x as f64 * BIOME_FREQUENCY, z as f64 * BIOME_FREQUENCY);
        Biome::from_noise(value)
    }

    /// Share of the six seam probes that land in a different biome.
    pub fn blend_at(&self, x: i32, z: i32) -> f32 {
        let center = self.biome_at(x, z);
        let differing = BLEND_OFFSETS_2D
            .iter()
            .filter(|&&(dx, dz)| self.biome_at(x + dx, z + dz) != center)
            .count();
        differing as f32 / BLEND_OFFSETS_2D.len() as f32
    }

    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        self.sample_column(x, z).height
    }

    pub fn sample_column(&self, x: i32, z: i32) -> ColumnSample {
        let biome = self.biome_at(x, z);
        let blend = self.blend_at(x, z);
        let mut height = self.biome_height(biome, x, z);

        if blend > 0.0 {
            let neighbor = AXIS_OFFSETS_2D
                .iter()
                .map(|&(dx, dz)| self.biome_at(x + dx, z + dz))
                .find(|&other| other != biome);
            if let Some(neighbor) = neighbor {
                let target = self.biome_height(neighbor, x, z);
                let weight = f64::from(blend) * NEIGHBOR_BLEND_CAP;
                height += (target - height) * weight;
            }
        }

        ColumnSample {
            biome,
            blend,
            height: (height as i32).max(1),
        }
    }

    fn biome_height(&self, biome: Biome, x: i32, z: i32) -> f64 {
        let n = self
            .height_noise
            .sample(x as f64 * HEIGHT_FREQUENCY, z as f64 * HEIGHT_FREQUENCY);
        biome.height_from_noise(n)
    }

    fn column_hash(&self, x: i32, z: i32, salt: u64) -> u64 {
        let mut hash = self
            .seed
            .wrapping_add(salt)
            .wrapping_mul(6364136223846793005)
            .wrapping_add((x as i64 as u64).wrapping_mul(2654435761))
            .wrapping_add((z as i64 as u64).wrapping_mul(40503));
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(0xff51_afd7_ed55_8ccd);
        hash ^ (hash >> 33)
    }

    /// Decoration rooted on top of the `(x, z)` column, if any.
    pub fn decoration_at(&self, x: i32, z: i32) -> Option<Decoration> {
        let sample = self.sample_column(x, z);
        if sample.blend >= FEATURE_BLEND_LIMIT {
            return None;
        }

        let hash = self.column_hash(x, z, 0);
        if (hash >> 8) % sample.biome.feature_frequency() != 0 {
            return None;
        }

        Some(match sample.biome {
            Biome::Plains | Biome::Mountains => Decoration::Tree,
            Biome::Desert => Decoration::Cactus {
                height: 2 + ((hash >> 16) % 3) as i32,
            },
        })
    }

    /// Fills `grid` with the whole `world_size` square. Terrain columns are
    /// laid first; decorations only take cells that are still empty.
    pub fn populate(&self, grid: &mut WorldGrid) -> GenerationStats {
        let mut stats = GenerationStats::default();
        let mut decorations = Vec::new();

        for z in 0..self.world_size {
            for x in 0..self.world_size {
                let sample = self.sample_column(x, z);
                match sample.biome {
                    Biome::Plains => stats.plains_columns += 1,
                    Biome::Mountains => stats.mountain_columns += 1,
                    Biome::Desert => stats.desert_columns += 1,
                }

                for y in 0..sample.height {
                    let material = if y == sample.height - 1 {
                        sample.biome.surface()
                    } else if y >= sample.height - 1 - SUBSURFACE_DEPTH {
                        sample.biome.subsurface()
                    } else {
                        Material::Stone
                    };
                    if grid.insert(Block::new(IVec3::new(x, y, z), material)).is_ok() {
                        stats.blocks += 1;
                    }
                }

                if let Some(decoration) = self.decoration_at(x, z) {
                    decorations.push((IVec3::new(x, sample.height, z), decoration));
                }
            }
        }

        for (base, decoration) in decorations {
            let placed = match decoration {
                Decoration::Tree => {
                    stats.trees += 1;
                    place_tree(grid, base)
                }
                Decoration::Cactus { height } => {
                    stats.cacti += 1;
                    place_cactus(grid, base, height)
                }
            };
            stats.blocks += placed;
        }

        debug!(
            seed = self.seed,
            world_size = self.world_size,
            blocks = stats.blocks,
            trees = stats.trees,
            cacti = stats.cacti,
            plains = stats.plains_columns,
            mountains = stats.mountain_columns,
            desert = stats.desert_columns,
            "terrain generated"
        );
        stats
    }
}

fn place_if_empty(grid: &mut WorldGrid, pos: IVec3, material: Material) -> usize {
    usize::from(grid.insert(Block::new(pos, material)).is_ok())
}

/// Three-block trunk with a 3x3 leaf layer directly above it.
fn place_tree(grid: &mut WorldGrid, base: IVec3) -> usize {
    let mut placed = 0;
    for dy in 0..TREE_TRUNK_HEIGHT {
        placed += place_if_empty(grid, base + IVec3::new(0, dy, 0), Material::Wood);
    }
    let canopy_y = base.y + TREE_TRUNK_HEIGHT;
    for dz in -1..=1 {
        for dx in -1..=1 {
            let pos = IVec3::new(base.x + dx, canopy_y, base.z + dz);
            placed += place_if_empty(grid, pos, Material::Leaves);
        }
    }
    placed
}

fn place_cactus(grid: &mut WorldGrid, base: IVec3, height: i32) -> usize {
    (0..height)
        .map(|dy| place_if_empty(grid, base + IVec3::new(0, dy, 0), Material::Cactus))
        .sum()
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::{
        place_cactus, place_tree, Biome, Decoration, NoiseSource, TerrainGenerator,
        BIOME_FREQUENCY,
    };
    use crate::block::Material;
    use crate::grid::WorldGrid;

    struct FnNoise(fn(f64, f64) -> f64);

    impl NoiseSource for FnNoise {
        fn sample(&self, x: f64, z: f64) -> f64 {
            (self.0)(x, z)
        }
    }

    fn generator(biome: fn(f64, f64) -> f64, height: fn(f64, f64) -> f64) -> TerrainGenerator<FnNoise> {
        TerrainGenerator::with_noise(7, 20, FnNoise(biome), FnNoise(height))
    }

    #[test]
    fn biome_thresholds_partition_noise() {
        assert_eq!(Biome::from_noise(-0.9), Biome::Plains);
        assert_eq!(Biome::from_noise(-0.21), Biome::Plains);
        assert_eq!(Biome::from_noise(-0.2), Biome::Mountains);
        assert_eq!(Biome::from_noise(0.39), Biome::Mountains);
        assert_eq!(Biome::from_noise(0.4), Biome::Desert);
    }

    #[test]
    fn uniform_plains_column_is_layered() {
        let generator = generator(|_, _| -0.5, |_, _| 0.0);
        let sample = generator.sample_column(3, 4);
        assert_eq!(sample.biome, Biome::Plains);
        assert_eq!(sample.blend, 0.0);
        assert_eq!(sample.height, 5);

        let mut grid = WorldGrid::new();
        generator.populate(&mut grid);
        let material = |y| grid.get(IVec3::new(3, y, 4)).map(|b| b.material);
        assert_eq!(material(4), Some(Material::Grass));
        assert_eq!(material(3), Some(Material::Dirt));
        assert_eq!(material(1), Some(Material::Dirt));
        assert_eq!(material(0), Some(Material::Stone));
    }

    #[test]
    fn seam_columns_blend_toward_neighbor_height() {
        // Mountains for x >= 0, plains to the west; flat maximum height noise.
        let generator = generator(|x, _| if x >= 0.0 { 0.0 } else { -0.5 }, |_, _| 1.0);

        let deep = generator.sample_column(6, 0);
        assert_eq!((deep.biome, deep.blend, deep.height), (Biome::Mountains, 0.0, 16));

        let east_edge = generator.sample_column(0, 0);
        assert_eq!(east_edge.biome, Biome::Mountains);
        assert!((east_edge.blend - 2.0 / 6.0).abs() < 1e-6);
        assert_eq!(east_edge.height, 13);

        let west_edge = generator.sample_column(-1, 0);
        assert_eq!(west_edge.biome, Biome::Plains);
        assert!((west_edge.blend - 2.0 / 6.0).abs() < 1e-6);
        assert_eq!(west_edge.height, 9);
    }

    #[test]
    fn decorations_are_suppressed_near_seams() {
        // Biome stripes two columns wide along x.
        let generator = generator(
            |x, _| {
                let column = (x / BIOME_FREQUENCY).round() as i64;
                if column.rem_euclid(4) < 2 {
                    -0.5
                } else {
                    0.5
                }
            },
            |_, _| 0.0,
        );

        let mut seams = 0;
        for z in 0..40 {
            for x in 0..40 {
                if generator.blend_at(x, z) >= 0.5 {
                    seams += 1;
                    assert_eq!(generator.decoration_at(x, z), None);
                }
            }
        }
        assert!(seams > 0);
    }

    #[test]
    fn perlin_sampling_is_deterministic() {
        let a = TerrainGenerator::new(1337, 20);
        let b = TerrainGenerator::new(1337, 20);
        for z in -5..25 {
            for x in -5..25 {
                assert_eq!(a.biome_at(x, z), a.biome_at(x, z));
                assert_eq!(a.height_at(x, z), a.height_at(x, z));
                assert_eq!(a.sample_column(x, z), b.sample_column(x, z));
                assert_eq!(a.decoration_at(x, z), b.decoration_at(x, z));
            }
        }
    }

    #[test]
    fn populated_world_respects_column_heights() {
        let generator = TerrainGenerator::new(99, 20);
        let mut grid = WorldGrid::new();
        let stats = generator.populate(&mut grid);
        assert_eq!(stats.blocks, grid.len());
        assert_eq!(
            stats.plains_columns + stats.mountain_columns + stats.desert_columns,
            400
        );

        for z in 0..20 {
            for x in 0..20 {
                let sample = generator.sample_column(x, z);
                let top = grid
                    .get(IVec3::new(x, sample.height - 1, z))
                    .map(|b| b.material);
                assert_eq!(top, Some(sample.biome.surface()));
            }
        }

        for block in grid.iter() {
            let height = generator.height_at(block.pos.x, block.pos.z);
            if block.pos.y >= height {
                assert!(matches!(
                    block.material,
                    Material::Wood | Material::Leaves | Material::Cactus
                ));
            }
        }
    }

    #[test]
    fn tree_has_trunk_and_canopy() {
        let mut grid = WorldGrid::new();
        let placed = place_tree(&mut grid, IVec3::new(5, 4, 5));
        assert_eq!(placed, 12);
        for y in 4..7 {
            assert_eq!(grid.get(IVec3::new(5, y, 5)).map(|b| b.material), Some(Material::Wood));
        }
        let leaves = grid
            .iter()
            .filter(|b| b.material == Material::Leaves && b.pos.y == 7)
            .count();
        assert_eq!(leaves, 9);

        // A second overlapping tree only fills the free cells.
        let overlap = place_tree(&mut grid, IVec3::new(6, 4, 5));
        assert_eq!(overlap, 3 + 3);
    }

    #[test]
    fn cactus_heights_stay_in_range() {
        let generator = generator(|_, _| 0.9, |_, _| 0.0);
        let mut found = 0;
        for z in 0..64 {
            for x in 0..64 {
                if let Some(decoration) = generator.decoration_at(x, z) {
                    let Decoration::Cactus { height } = decoration else {
                        panic!("desert columns should only grow cacti");
                    };
                    assert!((2..=4).contains(&height));
                    found += 1;
                }
            }
        }
        assert!(found > 0);

        let mut grid = WorldGrid::new();
        assert_eq!(place_cactus(&mut grid, IVec3::new(0, 3, 0), 4), 4);
        assert_eq!(grid.count_material(Material::Cactus), 4);
    }
}
