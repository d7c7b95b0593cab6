mod config;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::unbounded;
use stratum_blocks::BlockRegistry;
use stratum_geom::Vec3;
use stratum_render::{Camera, DrawRecorder, FrameStats, Renderer};
use stratum_runtime::MeshScheduler;
use stratum_world::World;

use crate::config::StratumConfig;

#[derive(Parser, Debug)]
#[command(name = "stratum", about = "Headless section mesher and visibility-guided renderer")]
struct Args {
    /// TOML configuration file; built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Default log filter (RUST_LOG takes precedence).
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Frames to draw once every build has completed.
    #[arg(long)]
    frames: Option<u32>,
    /// Generate (2 * radius + 1)^2 columns around the origin.
    #[arg(long)]
    radius: Option<i32>,
}

fn log_frame(stats: &FrameStats, elapsed: Duration) {
    log::info!(
        target: "render",
        "frame {}: visited={} culled={} draws={}+{} elements={}+{} bridge={} ({:.2}ms)",
        stats.frame_id,
        stats.visited,
        stats.frustum_culled,
        stats.opaque_draws,
        stats.translucent_draws,
        stats.opaque_elements,
        stats.translucent_elements,
        stats.bridge_tasks,
        elapsed.as_secs_f64() * 1000.0
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .parse_env("RUST_LOG")
        .init();

    let mut cfg = match &args.config {
        Some(path) => config::load_config_from_path(path)?,
        None => StratumConfig::default(),
    };
    if let Some(r) = args.radius {
        cfg.world.columns_x = 2 * r.max(0) + 1;
        cfg.world.columns_z = 2 * r.max(0) + 1;
    }
    if let Some(frames) = args.frames {
        cfg.render.frames = frames;
    }

    let registry = match &cfg.blocks {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::builtin()?,
    };
    log::info!(target: "world", "{} block types registered", registry.len());
    let registry = Arc::new(registry);
    let world = Arc::new(World::new(registry));
    let t_gen = Instant::now();
    cfg.world.populate(&world);
    log::info!(target: "world", "world ready in {:?}", t_gen.elapsed());

    let mut renderer = Renderer::new(cfg.runtime.sync_capacity);
    let sections = world.loaded_sections();
    for pos in &sections {
        renderer.buffers_mut().insert(*pos);
    }

    let scheduler = MeshScheduler::new(
        Arc::clone(&world),
        renderer.sync_sender(),
        cfg.runtime.workers,
        cfg.render.vertex_stride.into(),
    )?;
    let (done_tx, done_rx) = unbounded();
    let t_build = Instant::now();
    for pos in &sections {
        scheduler.build(*pos, done_tx.clone());
    }
    drop(done_tx);

    let mut camera = Camera::new(
        Vec3::new(cfg.camera.x, cfg.camera.y, cfg.camera.z),
        cfg.camera.yaw,
        cfg.camera.pitch,
    );
    camera.fov_y_degrees = cfg.render.fov_degrees;
    camera.near = cfg.render.near;
    camera.far = cfg.render.far;

    let mut sink = DrawRecorder::default();
    let mut completed = 0;
    let mut settled_frames = 0;
    while settled_frames < cfg.render.frames.max(1) {
        let all_built = completed == sections.len();
        sink.clear();
        let t_frame = Instant::now();
        let stats = renderer.draw_frame(&camera, &mut sink);
        if all_built {
            settled_frames += 1;
            log_frame(&stats, t_frame.elapsed());
            continue;
        }
        log::debug!(
            target: "render",
            "frame {} while building: {}/{} sections, bridge={}",
            stats.frame_id,
            completed,
            sections.len(),
            stats.bridge_tasks
        );
        // Pace the warm-up frames on build progress.
        if done_rx.recv_timeout(Duration::from_millis(16)).is_ok() {
            completed += 1;
        }
        completed += done_rx.try_iter().count();
        if completed == sections.len() {
            log::info!(
                target: "runtime",
                "built {} sections in {:?}",
                completed,
                t_build.elapsed()
            );
        }
    }

    let arena = scheduler.arena_stats();
    let snaps = scheduler.snapshot_stats();
    log::info!(
        target: "runtime",
        "vertex arena: allocated={} taken={} returned={}; snapshots: allocated={} acquired={} released={}",
        arena.allocated,
        arena.taken,
        arena.returned,
        snaps.allocated,
        snaps.acquired,
        snaps.released
    );
    Ok(())
}
