//! The playground as one owned value.
//!
//! [`Scene`] wires the readiness gate, phase machine, simulation lifecycle,
//! pick router and collision bridge together and exposes the handful of entry
//! points an application shell drives: the two startup signals, user actions
//! and the per-frame callback. Every service it holds is owned here and passed
//! explicitly to the component that needs it.

use rockfall_scene::{classify, SceneManifest, SceneRoles};
use tracing::{error, info};

use crate::audio::AudioSink;
use crate::bridge::{CollisionBridge, ExplosionCue};
use crate::camera::PerspectiveCamera;
use crate::config::RockfallConfig;
use crate::error::{PhysicsError, Result};
use crate::lifecycle::Physics;
use crate::phase::{Phase, PhaseMachine};
use crate::picking::{Inputs, PickOutcome, RayIntersector};
use crate::random::RandomSource;
use crate::readiness::{Ready, ReadinessGate};
use crate::registry::{boundaries_from_roles, BodyRegistry, BoundaryBody};

/// Interactive rock playground.
pub struct Scene<A: AudioSink, R: RandomSource> {
    config: RockfallConfig,
    gate: ReadinessGate,
    phase: PhaseMachine,
    physics: Physics,
    registry: BodyRegistry,
    boundaries: Vec<BoundaryBody>,
    clock: f64,
    bridge: CollisionBridge,
    explosion: ExplosionCue,
    inputs: Inputs,
    camera: PerspectiveCamera,
    audio: A,
    rng: R,
}

impl<A: AudioSink, R: RandomSource> Scene<A, R> {
    /// Create a scene in [`Phase::Loading`].
    pub fn new(config: RockfallConfig, audio: A, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: ReadinessGate::new(),
            phase: PhaseMachine::new(config.reset.grace_delay),
            physics: Physics::new(config.physics.clone()),
            registry: BodyRegistry::default(),
            boundaries: Vec::new(),
            clock: 0.0,
            bridge: CollisionBridge::new(config.audio.collision_min_interval),
            explosion: ExplosionCue::new(&config.audio),
            inputs: Inputs::new(config.impulse.clone()),
            camera: PerspectiveCamera::default(),
            audio,
            rng,
            config,
        })
    }

    /// Replace the pick intersection test.
    pub fn with_intersector(mut self, intersector: Box<dyn RayIntersector>) -> Self {
        self.inputs = Inputs::with_intersector(self.config.impulse.clone(), intersector);
        self
    }

    /// Replace the camera picks are cast from.
    pub fn with_camera(mut self, camera: PerspectiveCamera) -> Self {
        self.camera = camera;
        self
    }

    /// The physics engine finished (or failed) its own initialization.
    ///
    /// A failure is fatal and returned as [`PhysicsError::EngineInit`].
    pub fn on_engine_ready(&mut self, outcome: std::result::Result<(), String>) -> Result<()> {
        if let Err(reason) = outcome {
            error!(%reason, "physics engine failed to initialize");
            return Err(PhysicsError::EngineInit(reason));
        }
        match self.gate.engine_ready() {
            Some(ready) => self.build(ready),
            None => Ok(()),
        }
    }

    /// The loader delivered its classification.
    pub fn on_assets_loaded(&mut self, roles: SceneRoles) -> Result<()> {
        match self.gate.assets_loaded(roles) {
            Some(ready) => self.build(ready),
            None => Ok(()),
        }
    }

    /// Classify a manifest with the configured naming rules and hand it off.
    pub fn on_manifest_loaded(&mut self, manifest: &SceneManifest) -> Result<()> {
        let roles = classify(manifest, &self.config.loader)?;
        self.on_assets_loaded(roles)
    }

    fn build(&mut self, ready: Ready) -> Result<()> {
        let mut registry = BodyRegistry::from_roles(ready.roles())?;
        let boundaries = boundaries_from_roles(ready.roles());
        self.physics.initialize(&ready, &mut registry, &boundaries)?;

        self.registry = registry;
        self.boundaries = boundaries;
        self.phase.mark_ready();
        Ok(())
    }

    /// User start action. Returns whether the scene started playing.
    pub fn on_start(&mut self) -> bool {
        if !self.phase.start() {
            return false;
        }
        self.audio.play_ambient();
        true
    }

    /// User reset action.
    ///
    /// Rebuilds every body at its original pose and resumes play after the
    /// grace delay. Returns `Ok(false)` if the request was rejected because
    /// the scene is not playing.
    pub fn on_reset(&mut self) -> Result<bool> {
        if !self.phase.begin_reset() {
            return Ok(false);
        }
        self.audio.play_reset();
        self.physics.reset(&mut self.registry)?;
        self.explosion.rearm();
        self.phase.reset_completed(self.clock);
        info!(at = self.clock, "reset complete");
        Ok(true)
    }

    /// Pointer activation at normalized device coordinates.
    pub fn on_pick(&mut self, x: f32, y: f32) -> PickOutcome {
        let outcome = self.inputs.handle_pick(
            self.phase.phase(),
            &self.camera,
            x,
            y,
            &self.registry,
            &mut self.physics,
            &mut self.rng,
        );
        if !outcome.pushed.is_empty() {
            self.explosion.on_push(&mut self.audio);
        }
        outcome
    }

    /// The viewport changed size.
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Global mute toggle.
    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    /// Per-frame callback: advance the clock, step the world, sync poses and
    /// feed the contacts to the collision bridge.
    ///
    /// Returns whether a collision cue fired this frame.
    pub fn frame(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.clock += f64::from(dt);
        }
        self.phase.advance(self.clock);

        match self.physics.tick(dt, &mut self.registry) {
            Some(contacts) => {
                self.bridge
                    .on_batch(self.clock, &contacts, self.phase.phase(), &mut self.audio)
            }
            None => false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    /// Seconds of frame time elapsed.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Active configuration.
    pub fn config(&self) -> &RockfallConfig {
        &self.config
    }

    /// Simulated bodies.
    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Static boundaries.
    pub fn boundaries(&self) -> &[BoundaryBody] {
        &self.boundaries
    }

    /// Simulation lifecycle.
    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Pick camera.
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Audio sink.
    pub fn audio(&self) -> &A {
        &self.audio
    }
}
