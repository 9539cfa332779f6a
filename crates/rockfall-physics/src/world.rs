//! Physics world management using Rapier3d.

use nalgebra::{Isometry3, Vector3};
use parry3d::shape::SharedShape;
use rapier3d::crossbeam::channel::{unbounded, Receiver};
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};
use rapier3d::geometry::{
    BroadPhaseMultiSap, ColliderBuilder, ColliderHandle, ColliderSet, CollisionEvent,
    ContactForceEvent, NarrowPhase,
};
use rapier3d::pipeline::{ActiveEvents, ChannelEventCollector, PhysicsPipeline};

use crate::config::PhysicsConfig;

/// Surface material and event settings shared by every rock collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderMaterial {
    /// Collider density.
    pub density: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Restitution coefficient.
    pub restitution: f32,
    /// Minimum total contact force that raises a force event.
    pub contact_force_threshold: f32,
}

impl From<&PhysicsConfig> for ColliderMaterial {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            density: config.density,
            friction: config.friction,
            restitution: config.restitution,
            contact_force_threshold: config.contact_force_threshold,
        }
    }
}

/// Count of contact events raised by one step.
///
/// A fixed-size reduction of the event queue: draining never allocates and
/// nothing outlives the tick it was drained in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactSummary {
    /// Pairs that started touching.
    pub started: u32,
    /// Pairs that stopped touching.
    pub stopped: u32,
    /// Contacts whose total force exceeded the threshold.
    pub forceful: u32,
    /// Largest total contact force seen.
    pub peak_force: f32,
}

impl ContactSummary {
    /// True if any pair started touching in the batch.
    ///
    /// Separation and force events are silent.
    pub fn is_audible(&self) -> bool {
        self.started > 0
    }
}

/// Rapier world plus its companion event queue.
pub struct SimulationWorld {
    // Rapier components
    pipeline: PhysicsPipeline,
    gravity: Vector3<f32>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    // Event queue
    events: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    force_recv: Receiver<ContactForceEvent>,

    steps: u64,
}

impl SimulationWorld {
    /// Create an empty world under the given gravity.
    pub fn new(gravity: Vector3<f32>) -> Self {
        let (collision_send, collision_recv) = unbounded();
        let (force_send, force_recv) = unbounded();

        Self {
            pipeline: PhysicsPipeline::new(),
            gravity,
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            events: ChannelEventCollector::new(collision_send, force_send),
            collision_recv,
            force_recv,
            steps: 0,
        }
    }

    /// Insert a parentless static collider.
    pub fn insert_fixed(&mut self, shape: SharedShape, pose: Isometry3<f32>) -> ColliderHandle {
        let collider = ColliderBuilder::new(shape).position(pose).build();
        self.colliders.insert(collider)
    }

    /// Insert a dynamic body with one event-reporting collider.
    pub fn insert_dynamic(
        &mut self,
        shape: SharedShape,
        pose: Isometry3<f32>,
        material: &ColliderMaterial,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic().position(pose).build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::new(shape)
            .density(material.density)
            .friction(material.friction)
            .restitution(material.restitution)
            .active_events(ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS)
            .contact_force_event_threshold(material.contact_force_threshold)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        handle
    }

    /// Remove a body and its colliders. Returns false for a stale handle.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Apply an instantaneous impulse, waking the body.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vector3<f32>) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.apply_impulse(impulse, true);
                true
            }
            None => false,
        }
    }

    /// Current pose of a body.
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<Isometry3<f32>> {
        self.bodies.get(handle).map(|body| *body.position())
    }

    /// Current linear velocity of a body.
    pub fn body_linvel(&self, handle: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(handle).map(|body| *body.linvel())
    }

    /// Step the physics simulation by dt seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &self.events,
        );
        self.steps += 1;
    }

    /// Drain every pending contact event into a summary.
    pub fn drain_contacts(&self) -> ContactSummary {
        let mut summary = ContactSummary::default();

        for event in self.collision_recv.try_iter() {
            match event {
                CollisionEvent::Started(..) => summary.started += 1,
                CollisionEvent::Stopped(..) => summary.stopped += 1,
            }
        }
        for event in self.force_recv.try_iter() {
            summary.forceful += 1;
            summary.peak_force = summary.peak_force.max(event.total_force_magnitude);
        }

        summary
    }

    /// Step length used by the last `step` call.
    pub fn last_dt(&self) -> f32 {
        self.integration_params.dt
    }

    /// Number of steps taken since creation.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of rigid bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of colliders, static and attached.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Gravity vector.
    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }
}
