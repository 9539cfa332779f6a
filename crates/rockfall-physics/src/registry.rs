//! Simulated bodies and their visual/physical counterparts.

use std::collections::HashMap;

use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use parry3d::shape::SharedShape;
use rapier3d::dynamics::RigidBodyHandle;
use rockfall_scene::{BodyDesc, BoundaryDesc, BoundaryKind, SceneRoles, Transform};

use crate::colliders::{boundary_cuboid, hull_from_points, pick_shape};
use crate::error::{PhysicsError, Result};

/// Convert a loader transform to an isometry.
pub fn isometry_from(transform: &Transform) -> Isometry3<f32> {
    let [x, y, z] = transform.translation;
    let [qx, qy, qz, qw] = transform.rotation;
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz)),
    )
}

/// Convert an isometry back to a loader transform.
pub fn transform_from(pose: &Isometry3<f32>) -> Transform {
    let t = pose.translation.vector;
    let q = pose.rotation;
    Transform {
        translation: [t.x, t.y, t.z],
        rotation: [q.i, q.j, q.k, q.w],
    }
}

/// One rock fragment.
#[derive(Clone)]
pub struct SimulatedBody {
    id: String,
    pub(crate) visual: Isometry3<f32>,
    original: Isometry3<f32>,
    pub(crate) physical: Option<RigidBodyHandle>,
    shape: SharedShape,
    parts: Vec<SharedShape>,
}

impl SimulatedBody {
    /// Register a body, deriving its hull and pick shapes once.
    pub fn from_desc(desc: &BodyDesc) -> Result<Self> {
        let points: Vec<Point3<f32>> = desc.hull_points().map(Point3::from).collect();
        let shape = hull_from_points(&points, &desc.id)?;
        let parts = desc
            .parts
            .iter()
            .map(|part| pick_shape(part, &desc.id))
            .collect::<Result<Vec<_>>>()?;
        let pose = isometry_from(&desc.transform);

        Ok(Self {
            id: desc.id.clone(),
            visual: pose,
            original: pose,
            physical: None,
            shape,
            parts,
        })
    }

    /// Stable body id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pose the renderer should draw this frame.
    pub fn visual(&self) -> &Isometry3<f32> {
        &self.visual
    }

    /// Pose captured at load time.
    pub fn original(&self) -> &Isometry3<f32> {
        &self.original
    }

    /// Handle of the live rigid body, `None` before the world exists.
    pub fn physical(&self) -> Option<RigidBodyHandle> {
        self.physical
    }

    /// Convex hull collider shape.
    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    /// Ray-cast shapes of the drawable sub-meshes, in the body's local frame.
    pub fn parts(&self) -> &[SharedShape] {
        &self.parts
    }
}

impl std::fmt::Debug for SimulatedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedBody")
            .field("id", &self.id)
            .field("visual", &self.visual)
            .field("physical", &self.physical)
            .field("parts", &self.parts.len())
            .finish()
    }
}

/// Static collision geometry.
#[derive(Debug, Clone)]
pub struct BoundaryBody {
    /// Mesh name.
    pub name: String,
    /// Ground or wall.
    pub kind: BoundaryKind,
    /// World placement of the collider center.
    pub pose: Isometry3<f32>,
    /// Half extents of the cuboid collider.
    pub half_extents: Vector3<f32>,
}

impl BoundaryBody {
    /// Boundary from its loader description.
    pub fn from_desc(desc: &BoundaryDesc) -> Self {
        Self {
            name: desc.name.clone(),
            kind: desc.kind,
            pose: isometry_from(&desc.transform),
            half_extents: Vector3::from(desc.half_extents),
        }
    }

    /// Cuboid collider shape.
    pub fn shape(&self) -> SharedShape {
        boundary_cuboid(&self.half_extents)
    }
}

/// Every simulated body, in load order, with lookup by id.
///
/// The set is fixed at load; bodies are rebuilt in place, never added or
/// removed.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<SimulatedBody>,
    index: HashMap<String, usize>,
}

impl BodyRegistry {
    /// Build the registry from the loader hand-off.
    pub fn from_roles(roles: &SceneRoles) -> Result<Self> {
        let bodies = roles
            .bodies
            .iter()
            .map(SimulatedBody::from_desc)
            .collect::<Result<Vec<_>>>()?;
        Self::from_bodies(bodies)
    }

    /// Build the registry from already registered bodies.
    pub fn from_bodies(bodies: Vec<SimulatedBody>) -> Result<Self> {
        let mut index = HashMap::with_capacity(bodies.len());
        for (i, body) in bodies.iter().enumerate() {
            if index.insert(body.id.clone(), i).is_some() {
                return Err(PhysicsError::DuplicateBody(body.id.clone()));
            }
        }
        Ok(Self { bodies, index })
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// True if no bodies were loaded.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Look up a body by id.
    pub fn get(&self, id: &str) -> Option<&SimulatedBody> {
        self.index.get(id).map(|&i| &self.bodies[i])
    }

    /// Iterate bodies in load order.
    pub fn iter(&self) -> impl Iterator<Item = &SimulatedBody> {
        self.bodies.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SimulatedBody> {
        self.bodies.iter_mut()
    }

    /// Body ids in load order.
    pub fn ids(&self) -> Vec<String> {
        self.bodies.iter().map(|b| b.id.clone()).collect()
    }
}

/// Build the static boundaries from the loader hand-off.
pub fn boundaries_from_roles(roles: &SceneRoles) -> Vec<BoundaryBody> {
    roles.boundaries.iter().map(BoundaryBody::from_desc).collect()
}
