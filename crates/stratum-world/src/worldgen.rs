use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;
use stratum_blocks::{Block, BlockRegistry};

use crate::coord::SectionPos;
use crate::section::{MAX_LIGHT, SECTION_SIZE, SectionData};
use crate::world::World;

const COLUMN_HEIGHT: i32 = SectionPos::COLUMN_SECTIONS * SECTION_SIZE as i32;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_mode")]
    pub mode: WorldGenMode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub noise: Noise,
    #[serde(default = "default_water_level")]
    pub water_level: i32,
    #[serde(default = "default_columns")]
    pub columns_x: i32,
    #[serde(default = "default_columns")]
    pub columns_z: i32,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            mode: default_mode(),
            flat: Flat::default(),
            noise: Noise::default(),
            water_level: default_water_level(),
            columns_x: default_columns(),
            columns_z: default_columns(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorldGenMode {
    Flat,
    Noise,
}

fn default_seed() -> i32 {
    1337
}
fn default_mode() -> WorldGenMode {
    WorldGenMode::Noise
}
fn default_water_level() -> i32 {
    62
}
fn default_columns() -> i32 {
    8
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    #[serde(default = "default_flat_thickness")]
    pub thickness: i32,
}
fn default_flat_thickness() -> i32 {
    4
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            thickness: default_flat_thickness(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Noise {
    #[serde(default = "default_noise_frequency")]
    pub frequency: f32,
    #[serde(default = "default_base_height")]
    pub base_height: i32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
}
fn default_noise_frequency() -> f32 {
    0.01
}
fn default_base_height() -> i32 {
    64
}
fn default_amplitude() -> f32 {
    16.0
}
impl Default for Noise {
    fn default() -> Self {
        Self {
            frequency: default_noise_frequency(),
            base_height: default_base_height(),
            amplitude: default_amplitude(),
        }
    }
}

// Block ids the generator places; names missing from the registry fall back to air.
struct Palette {
    stone: Block,
    dirt: Block,
    grass: Block,
    sand: Block,
    water: Block,
    tall_grass: Block,
    flower: Block,
}

impl Palette {
    fn resolve(reg: &BlockRegistry) -> Self {
        let get = |name: &str| {
            reg.block(name).unwrap_or_else(|| {
                log::warn!(target: "world", "block `{name}` not in registry; generating air");
                Block::AIR
            })
        };
        Self {
            stone: get("stone"),
            dirt: get("dirt"),
            grass: get("grass"),
            sand: get("sand"),
            water: get("water"),
            tall_grass: get("tall_grass"),
            flower: get("flower"),
        }
    }
}

impl WorldGenConfig {
    /// Column range covered by generation, centred on column (0, 0).
    pub fn column_range(&self) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
        let x0 = -(self.columns_x / 2);
        let z0 = -(self.columns_z / 2);
        (x0..x0 + self.columns_x.max(0), z0..z0 + self.columns_z.max(0))
    }

    fn terrain_noise(&self) -> FastNoiseLite {
        let mut n = FastNoiseLite::with_seed(self.seed);
        n.set_noise_type(Some(NoiseType::OpenSimplex2));
        n.set_frequency(Some(self.noise.frequency));
        n
    }

    fn surface_height(&self, noise: &FastNoiseLite, wx: i32, wz: i32) -> i32 {
        let h = match self.mode {
            WorldGenMode::Flat => self.flat.thickness,
            WorldGenMode::Noise => {
                let n = noise.get_noise_2d(wx as f32, wz as f32);
                self.noise.base_height + (n * self.noise.amplitude).round() as i32
            }
        };
        h.clamp(1, COLUMN_HEIGHT - 1)
    }

    /// Generates every column in `column_range` and stores its sections in `world`.
    /// Returns the number of sections inserted.
    pub fn populate(&self, world: &World) -> usize {
        let palette = Palette::resolve(world.registry());
        let noise = self.terrain_noise();
        let (xs, zs) = self.column_range();
        let mut count = 0;
        for cx in xs {
            for cz in zs.clone() {
                for (pos, data) in self.generate_column(world.registry(), &palette, &noise, cx, cz)
                {
                    world.insert_section(pos, data);
                    count += 1;
                }
            }
        }
        log::info!(
            target: "world",
            "generated {} sections ({:?} mode, seed {})",
            count,
            self.mode,
            self.seed
        );
        count
    }

    fn generate_column(
        &self,
        reg: &BlockRegistry,
        palette: &Palette,
        noise: &FastNoiseLite,
        cx: i32,
        cz: i32,
    ) -> Vec<(SectionPos, SectionData)> {
        let mut sections: Vec<SectionData> = (0..SectionPos::COLUMN_SECTIONS)
            .map(|_| SectionData::default())
            .collect();
        let water_level = match self.mode {
            WorldGenMode::Flat => -1,
            WorldGenMode::Noise => self.water_level,
        };
        for lz in 0..SECTION_SIZE {
            for lx in 0..SECTION_SIZE {
                let wx = (cx << 4) + lx as i32;
                let wz = (cz << 4) + lz as i32;
                let height = self.surface_height(noise, wx, wz);
                let beach = height - 1 <= water_level + 1;
                let decoration = match decoration_hash(self.seed, wx, wz) % 64 {
                    0..=5 if !beach => palette.tall_grass,
                    6 if !beach => palette.flower,
                    _ => Block::AIR,
                };
                let mut sky = MAX_LIGHT;
                for wy in (0..COLUMN_HEIGHT).rev() {
                    let block = if wy < height - 4 {
                        palette.stone
                    } else if wy < height - 1 {
                        if beach { palette.sand } else { palette.dirt }
                    } else if wy == height - 1 {
                        if beach { palette.sand } else { palette.grass }
                    } else if wy <= water_level {
                        palette.water
                    } else if wy == height {
                        decoration
                    } else {
                        Block::AIR
                    };
                    let section = &mut sections[(wy >> 4) as usize];
                    let ly = (wy & 15) as usize;
                    section.set(lx, ly, lz, block);
                    section.set_sky_light(lx, ly, lz, sky);
                    let ty = reg.block_type(block);
                    if ty.should_cull_against() {
                        sky = 0;
                    } else if ty.is_liquid() {
                        sky = sky.saturating_sub(2);
                    } else if ty.renderable() && !ty.is_translucent() {
                        sky = sky.saturating_sub(1);
                    }
                }
            }
        }
        sections
            .into_iter()
            .enumerate()
            .map(|(sy, data)| (SectionPos::new(cx, sy as i32, cz), data))
            .collect()
    }
}

fn decoration_hash(seed: i32, wx: i32, wz: i32) -> u32 {
    let mut h = (wx as u32).wrapping_mul(0x9E37_79B1) ^ (wz as u32).wrapping_mul(0x85EB_CA77);
    h ^= seed as u32;
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h
}
