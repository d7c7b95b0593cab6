use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use stratum_mesh_cpu::VertexStride;
use stratum_render::DEFAULT_SYNC_CAPACITY;
use stratum_world::WorldGenConfig;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StratumConfig {
    /// Block table to load instead of the built-in one.
    #[serde(default)]
    pub blocks: Option<PathBuf>,
    #[serde(default)]
    pub world: WorldGenConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Mesh worker threads; 0 uses the available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_sync_capacity")]
    pub sync_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            sync_capacity: default_sync_capacity(),
        }
    }
}

fn default_sync_capacity() -> usize {
    DEFAULT_SYNC_CAPACITY
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrideSetting {
    #[default]
    Packed36,
    Padded40,
}

impl From<StrideSetting> for VertexStride {
    fn from(s: StrideSetting) -> Self {
        match s {
            StrideSetting::Packed36 => VertexStride::Packed36,
            StrideSetting::Padded40 => VertexStride::Padded40,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default)]
    pub vertex_stride: StrideSetting,
    #[serde(default = "default_frames")]
    pub frames: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            vertex_stride: StrideSetting::default(),
            frames: default_frames(),
        }
    }
}

fn default_fov() -> f32 {
    90.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    500.0
}
fn default_frames() -> u32 {
    3
}

#[derive(Clone, Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub x: f32,
    #[serde(default = "default_camera_y")]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default = "default_camera_pitch")]
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: default_camera_y(),
            z: 0.0,
            yaw: 0.0,
            pitch: default_camera_pitch(),
        }
    }
}

// Just above the default noise surface.
fn default_camera_y() -> f32 {
    80.0
}
fn default_camera_pitch() -> f32 {
    -20.0
}

pub fn load_config_from_path(path: &Path) -> Result<StratumConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: StratumConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_world::WorldGenMode;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: StratumConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.runtime.sync_capacity, 500);
        assert_eq!(cfg.render.fov_degrees, 90.0);
        assert_eq!(cfg.render.vertex_stride, StrideSetting::Packed36);
        assert_eq!(cfg.world.mode, WorldGenMode::Noise);
        assert!(cfg.blocks.is_none());
    }

    #[test]
    fn block_table_path_is_read() {
        let cfg: StratumConfig = toml::from_str("blocks = \"assets/blocks.toml\"\n").unwrap();
        assert_eq!(cfg.blocks, Some(PathBuf::from("assets/blocks.toml")));
    }

    #[test]
    fn sections_override_individually() {
        let cfg: StratumConfig = toml::from_str(
            r#"
            [world]
            mode = "flat"
            flat = { thickness = 10 }

            [render]
            vertex_stride = "padded40"
            frames = 7

            [camera]
            yaw = 45.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.world.mode, WorldGenMode::Flat);
        assert_eq!(cfg.world.flat.thickness, 10);
        assert_eq!(cfg.world.seed, 1337);
        assert_eq!(VertexStride::from(cfg.render.vertex_stride), VertexStride::Padded40);
        assert_eq!(cfg.render.frames, 7);
        assert_eq!(cfg.render.far, 500.0);
        assert_eq!(cfg.camera.yaw, 45.0);
        assert_eq!(cfg.camera.y, 80.0);
    }

    #[test]
    fn shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("stratum.toml");
        let cfg = load_config_from_path(&path).unwrap();
        assert_eq!(cfg.runtime.workers, 0);
        assert_eq!(cfg.camera.x, 8.0);
        assert_eq!(cfg.world.noise.base_height, 64);
    }

    #[test]
    fn unknown_stride_is_rejected() {
        let res = toml::from_str::<StratumConfig>("[render]\nvertex_stride = \"wide\"\n");
        assert!(res.is_err());
    }
}
