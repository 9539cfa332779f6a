//! Simulation lifecycle: world creation, per-frame advancement and reset.

use nalgebra::{Isometry3, Vector3};
use rapier3d::dynamics::RigidBodyHandle;
use tracing::{debug, info, trace};

use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::readiness::Ready;
use crate::registry::{BodyRegistry, BoundaryBody};
use crate::world::{ColliderMaterial, ContactSummary, SimulationWorld};

/// Clamp a frame delta to the longest step the solver is trusted with.
///
/// Returns `None` for deltas that must not advance the world at all
/// (zero, negative, NaN).
pub fn clamp_step(dt: f32, max_step: f32) -> Option<f32> {
    if dt.is_nan() || dt <= 0.0 {
        return None;
    }
    Some(dt.min(max_step))
}

/// Owner of the simulation world and every physical body in it.
///
/// Structural changes (creating or destroying bodies) only happen inside
/// [`initialize`](Self::initialize) and [`reset`](Self::reset).
pub struct Physics {
    config: PhysicsConfig,
    material: ColliderMaterial,
    world: Option<SimulationWorld>,
}

impl Physics {
    /// Create a manager with no world yet.
    pub fn new(config: PhysicsConfig) -> Self {
        let material = ColliderMaterial::from(&config);
        Self {
            config,
            material,
            world: None,
        }
    }

    /// True once the world has been built.
    pub fn is_initialized(&self) -> bool {
        self.world.is_some()
    }

    /// The world, if built.
    pub fn world(&self) -> Option<&SimulationWorld> {
        self.world.as_ref()
    }

    /// Build the world, its static boundaries and one dynamic body per
    /// registered rock.
    ///
    /// The [`Ready`] token proves both startup signals fired. Calling this a
    /// second time fails with [`PhysicsError::AlreadyInitialized`] and leaves
    /// the existing world alone.
    pub fn initialize(
        &mut self,
        _ready: &Ready,
        registry: &mut BodyRegistry,
        boundaries: &[BoundaryBody],
    ) -> Result<()> {
        if self.world.is_some() {
            return Err(PhysicsError::AlreadyInitialized);
        }

        let [gx, gy, gz] = self.config.gravity;
        let mut world = SimulationWorld::new(Vector3::new(gx, gy, gz));

        for boundary in boundaries {
            world.insert_fixed(boundary.shape(), boundary.pose);
        }

        for body in registry.iter_mut() {
            let handle = world.insert_dynamic(body.shape().clone(), body.visual, &self.material);
            body.physical = Some(handle);
        }

        info!(
            bodies = registry.len(),
            boundaries = boundaries.len(),
            colliders = world.collider_count(),
            "simulation world built"
        );
        self.world = Some(world);
        Ok(())
    }

    /// Advance the world by one frame and mirror body poses into the
    /// registry.
    ///
    /// Returns the contact events raised by the step, or `None` when the world
    /// does not exist yet.
    pub fn tick(&mut self, dt: f32, registry: &mut BodyRegistry) -> Option<ContactSummary> {
        let Some(world) = self.world.as_mut() else {
            trace!("tick before world exists");
            return None;
        };

        let Some(step) = clamp_step(dt, self.config.max_step) else {
            debug!(dt, "skipping non-positive frame delta");
            return Some(ContactSummary::default());
        };
        if step < dt {
            debug!(dt, step, "frame delta clamped");
        }

        world.step(step);

        for body in registry.iter_mut() {
            if let Some(pose) = body.physical.and_then(|h| world.body_pose(h)) {
                body.visual = pose;
            }
        }

        Some(world.drain_contacts())
    }

    /// Destroy every rock body and rebuild it at its original pose.
    ///
    /// Boundaries and the world itself persist.
    pub fn reset(&mut self, registry: &mut BodyRegistry) -> Result<()> {
        let world = self.world.as_mut().ok_or(PhysicsError::NotInitialized)?;

        for body in registry.iter_mut() {
            if let Some(handle) = body.physical.take() {
                world.remove_body(handle);
            }
            body.visual = *body.original();
            let handle = world.insert_dynamic(body.shape().clone(), body.visual, &self.material);
            body.physical = Some(handle);
        }

        // Events raised by the destroyed bodies belong to the previous run.
        world.drain_contacts();

        info!(bodies = registry.len(), "bodies rebuilt at original poses");
        Ok(())
    }

    /// Push a body. Returns false if the world or the body is gone.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vector3<f32>) -> bool {
        match self.world.as_mut() {
            Some(world) => world.apply_impulse(handle, impulse),
            None => false,
        }
    }

    /// Current pose of a physical body.
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<Isometry3<f32>> {
        self.world.as_ref()?.body_pose(handle)
    }
}
