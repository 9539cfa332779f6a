#![warn(missing_docs)]

//! Rigid-body core of the rock playground, built on Rapier3d.
//!
//! A cluster of rock fragments sits on a ground slab inside a few walls.
//! Pointer picks push the rocks around with random impulses, contacts drive
//! a rate-limited collision cue, and a reset rebuilds every rock at its
//! load-time pose.
//!
//! # Features
//!
//! - Single-fire world construction once both the engine and the assets are ready
//! - Convex hull colliders for rocks, cuboid colliders for boundaries
//! - Ray picking with one impulse per distinct body per pick
//! - Debounced collision audio and a play/reset phase machine
//!
//! # Example
//!
//! ```ignore
//! use rockfall_physics::{seeded, RockfallConfig, Scene, TriggerLog};
//!
//! let mut scene = Scene::new(RockfallConfig::default(), TriggerLog::new(), seeded(42))?;
//! scene.on_manifest_loaded(&manifest)?;
//! scene.on_engine_ready(Ok(()))?;
//! scene.on_start();
//!
//! scene.on_pick(0.0, 0.0);
//! scene.frame(1.0 / 60.0);
//! ```

mod audio;
mod bridge;
mod camera;
mod colliders;
mod config;
mod error;
mod lifecycle;
mod phase;
mod picking;
mod random;
mod readiness;
mod registry;
mod scene;
mod world;

pub use audio::{AudioSink, Cue, TriggerLog};
pub use bridge::{CollisionBridge, ExplosionCue};
pub use camera::{pixel_to_ndc, PerspectiveCamera};
pub use colliders::{boundary_cuboid, hull_from_points, pick_shape};
pub use config::{AudioConfig, ImpulseConfig, PhysicsConfig, ResetConfig, RockfallConfig};
pub use error::{PhysicsError, Result};
pub use lifecycle::{clamp_step, Physics};
pub use phase::{Phase, PhaseMachine};
pub use picking::{Inputs, MeshIntersector, PickHit, PickOutcome, RayIntersector};
pub use random::{sample_impulse, seeded, RandomSource};
pub use readiness::{ReadinessGate, Ready};
pub use registry::{
    boundaries_from_roles, isometry_from, transform_from, BodyRegistry, BoundaryBody,
    SimulatedBody,
};
pub use scene::Scene;
pub use world::{ColliderMaterial, ContactSummary, SimulationWorld};
