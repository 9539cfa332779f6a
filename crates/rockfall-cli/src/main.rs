//! rockfall CLI - headless driver for the rock playground
//!
//! Inspects scene manifests and runs scripted sessions without a renderer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nalgebra::Point3;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rockfall_physics::{
    seeded, transform_from, Cue, PerspectiveCamera, RockfallConfig, Scene, TriggerLog,
};
use rockfall_scene::{classify, BoundaryKind, SceneManifest, Transform};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(Parser)]
#[command(name = "rockfall")]
#[command(about = "Headless driver for the rockfall physics playground", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display how a manifest's meshes are classified
    Info {
        /// Path to a scene manifest (.json)
        manifest: PathBuf,
        /// TOML config with loader naming rules
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a scripted session and print the final body poses
    Simulate {
        /// Scene manifest (default: built-in demo scene)
        manifest: Option<PathBuf>,
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to run
        #[arg(long, default_value_t = 240)]
        frames: u32,
        /// Frame delta in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Seed for the impulse generator
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Pick at FRAME:X,Y in normalized device coordinates (repeatable)
        #[arg(long = "pick")]
        picks: Vec<PickAt>,
        /// Press reset at FRAME (repeatable)
        #[arg(long = "reset-at")]
        resets: Vec<u32>,
    },
}

/// A scripted pick.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PickAt {
    frame: u32,
    x: f32,
    y: f32,
}

impl FromStr for PickAt {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (frame, coords) = s
            .split_once(':')
            .ok_or_else(|| format!("expected FRAME:X,Y, got '{}'", s))?;
        let (x, y) = coords
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y after ':', got '{}'", coords))?;

        let frame: u32 = frame
            .trim()
            .parse()
            .map_err(|e| format!("bad frame '{}': {}", frame, e))?;
        let x: f32 = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
        let y: f32 = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
        if !(-1.0..=1.0).contains(&x) || !(-1.0..=1.0).contains(&y) {
            return Err(format!("coordinates must be in [-1, 1], got ({}, {})", x, y));
        }
        Ok(Self { frame, x, y })
    }
}

#[derive(Serialize)]
struct BodyReport {
    id: String,
    transform: Transform,
    displaced: f32,
}

#[derive(Serialize)]
struct SessionReport {
    frames: u32,
    clock: f64,
    phase: String,
    impulses: usize,
    bodies: Vec<BodyReport>,
    cues: BTreeMap<String, usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { manifest, config } => {
            show_info(&manifest, config.as_deref())?;
        }
        Commands::Simulate {
            manifest,
            config,
            frames,
            dt,
            seed,
            picks,
            resets,
        } => {
            let manifest = match manifest {
                Some(path) => load_manifest(&path)?,
                None => demo::demo_manifest(),
            };
            let config = load_config(config.as_deref())?;
            let report = simulate(&manifest, config, frames, dt, seed, &picks, &resets)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_manifest(path: &Path) -> Result<SceneManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest = SceneManifest::from_json(&json)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(manifest)
}

fn load_config(path: Option<&Path>) -> Result<RockfallConfig> {
    match path {
        Some(path) => RockfallConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(RockfallConfig::default()),
    }
}

fn show_info(path: &Path, config: Option<&Path>) -> Result<()> {
    let manifest = load_manifest(path)?;
    let config = load_config(config)?;
    let roles = classify(&manifest, &config.loader)?;

    println!("rockfall manifest: {}", path.display());
    println!("  Version: {}", manifest.version);
    println!("  Meshes: {}", manifest.meshes.len());
    println!("  Simulated bodies: {}", roles.bodies.len());
    println!("  Boundaries: {}", roles.boundaries.len());

    if !roles.bodies.is_empty() {
        println!("\nBodies:");
        for body in &roles.bodies {
            let [x, y, z] = body.transform.translation;
            println!(
                "  {} ({} parts, {} points) at ({:.3}, {:.3}, {:.3})",
                body.id,
                body.parts.len(),
                body.hull_points().count(),
                x,
                y,
                z
            );
        }
    }

    if !roles.boundaries.is_empty() {
        println!("\nBoundaries:");
        for boundary in &roles.boundaries {
            let kind = match boundary.kind {
                BoundaryKind::Ground => "ground",
                BoundaryKind::Wall => "wall",
            };
            let [hx, hy, hz] = boundary.half_extents;
            println!(
                "  {} [{}] half extents ({:.3}, {:.3}, {:.3})",
                boundary.name, kind, hx, hy, hz
            );
        }
    }

    Ok(())
}

fn simulate(
    manifest: &SceneManifest,
    config: RockfallConfig,
    frames: u32,
    dt: f32,
    seed: u64,
    picks: &[PickAt],
    resets: &[u32],
) -> Result<SessionReport> {
    if !(dt.is_finite() && dt > 0.0) {
        anyhow::bail!("--dt must be a positive number of seconds, got {}", dt);
    }

    let camera = PerspectiveCamera::looking_at(Point3::new(4.0, 3.0, 5.0), Point3::new(0.0, 0.3, 0.0));
    let mut scene = Scene::new(config, TriggerLog::new(), seeded(seed))?.with_camera(camera);
    scene.on_manifest_loaded(manifest)?;
    scene.on_engine_ready(Ok(()))?;
    scene.on_start();
    info!(bodies = scene.registry().len(), frames, "session started");

    let mut impulses = 0;
    for frame in 0..frames {
        if resets.contains(&frame) && !scene.on_reset()? {
            warn!(frame, phase = %scene.phase(), "scripted reset rejected");
        }
        for pick in picks.iter().filter(|p| p.frame == frame) {
            let outcome = scene.on_pick(pick.x, pick.y);
            info!(frame, pushed = ?outcome.pushed, "pick");
            impulses += outcome.impulses();
        }
        scene.frame(dt);
    }

    let bodies = scene
        .registry()
        .iter()
        .map(|body| BodyReport {
            id: body.id().to_string(),
            transform: transform_from(body.visual()),
            displaced: (body.visual().translation.vector - body.original().translation.vector)
                .norm(),
        })
        .collect();

    let cues = [Cue::Ambient, Cue::Collision, Cue::Explosion, Cue::Reset]
        .into_iter()
        .map(|cue| (cue.to_string(), scene.audio().count(cue)))
        .collect();

    Ok(SessionReport {
        frames,
        clock: scene.clock(),
        phase: scene.phase().to_string(),
        impulses,
        bodies,
        cues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pick() {
        let pick: PickAt = "30:0.25,-0.5".parse().unwrap();
        assert_eq!(
            pick,
            PickAt {
                frame: 30,
                x: 0.25,
                y: -0.5
            }
        );
    }

    #[test]
    fn test_parse_pick_rejects_bad_input() {
        assert!("30".parse::<PickAt>().is_err());
        assert!("30:0.5".parse::<PickAt>().is_err());
        assert!("x:0,0".parse::<PickAt>().is_err());
        assert!("1:2.0,0".parse::<PickAt>().is_err());
    }

    #[test]
    fn test_simulate_demo() {
        let picks = [PickAt {
            frame: 60,
            x: 0.0,
            y: 0.0,
        }];
        let report = simulate(
            &demo::demo_manifest(),
            RockfallConfig::default(),
            120,
            1.0 / 60.0,
            7,
            &picks,
            &[],
        )
        .unwrap();

        assert_eq!(report.bodies.len(), 6);
        assert_eq!(report.phase, "playing");
        assert!(report.impulses >= 1);
        assert_eq!(report.cues["ambient"], 1);
        assert_eq!(report.cues["explosion"], 1);
    }

    #[test]
    fn test_simulate_reset_restores_poses() {
        let report = simulate(
            &demo::demo_manifest(),
            RockfallConfig::default(),
            1,
            1.0 / 60.0,
            7,
            &[],
            &[0],
        )
        .unwrap();

        assert_eq!(report.cues["reset"], 1);
        // One frame of fall after the rebuild.
        assert!(report.bodies.iter().all(|b| b.displaced < 0.01));
    }

    #[test]
    fn test_simulate_rejects_bad_dt() {
        let result = simulate(
            &demo::demo_manifest(),
            RockfallConfig::default(),
            1,
            0.0,
            7,
            &[],
            &[],
        );
        assert!(result.is_err());
    }
}
