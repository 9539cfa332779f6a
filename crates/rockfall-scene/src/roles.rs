//! Mesh-role classification.
//!
//! The loader walks the model and hands over every mesh it found. Which of
//! those meshes fall, which ones fence the fall in, and which are scenery is
//! decided here from their names.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SceneError};
use crate::{Geometry, SceneManifest, Transform};

/// Naming rules for classifying meshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleRules {
    /// Meshes whose name starts with this prefix are simulated bodies.
    pub body_prefix: String,
    /// Meshes whose name starts with this prefix are static walls.
    pub wall_prefix: String,
    /// Exact name of the ground mesh.
    pub ground_name: String,
    /// Add a 10 x 0.5 x 10 slab under the origin when no ground mesh exists.
    pub default_ground: bool,
}

impl Default for RoleRules {
    fn default() -> Self {
        Self {
            body_prefix: "explodingRocks".to_string(),
            wall_prefix: "wall".to_string(),
            ground_name: "ground".to_string(),
            default_ground: true,
        }
    }
}

/// What kind of static geometry a boundary is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// The floor everything lands on.
    Ground,
    /// An enclosing wall.
    Wall,
}

/// A simulated body as classified from the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    /// Body id, the mesh name.
    pub id: String,
    /// Load-time placement.
    pub transform: Transform,
    /// Drawable sub-meshes, all in the body's local frame.
    pub parts: Vec<Geometry>,
}

impl BodyDesc {
    /// Every vertex of every part, the input for the body's hull.
    pub fn hull_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.parts.iter().flat_map(Geometry::points)
    }
}

/// A static boundary as classified from the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryDesc {
    /// Mesh name.
    pub name: String,
    /// Ground or wall.
    pub kind: BoundaryKind,
    /// World placement of the collider center.
    pub transform: Transform,
    /// Half extents of the mesh's bounding box.
    pub half_extents: [f32; 3],
}

impl BoundaryDesc {
    /// Boundary sized from the bounding box of `geometry`.
    pub fn from_geometry(
        name: impl Into<String>,
        kind: BoundaryKind,
        geometry: &Geometry,
        transform: Transform,
    ) -> Result<Self> {
        let name = name.into();
        let (min, max) = geometry
            .bounds()
            .ok_or_else(|| SceneError::EmptyBoundary(name.clone()))?;
        Ok(Self {
            name,
            kind,
            transform,
            half_extents: [
                (max[0] - min[0]) / 2.0,
                (max[1] - min[1]) / 2.0,
                (max[2] - min[2]) / 2.0,
            ],
        })
    }

    /// Default ground slab: 10 x 0.5 x 10 with its top face at y = 0.
    pub fn default_ground() -> Self {
        Self {
            name: "ground".to_string(),
            kind: BoundaryKind::Ground,
            transform: Transform::from_translation(0.0, -0.25, 0.0),
            half_extents: [5.0, 0.25, 5.0],
        }
    }
}

/// The loader's hand-off: which meshes fall and which stay put.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneRoles {
    /// Simulated bodies, in manifest order.
    pub bodies: Vec<BodyDesc>,
    /// Static boundaries, in manifest order.
    pub boundaries: Vec<BoundaryDesc>,
}

impl SceneRoles {
    /// The ground boundary, if there is one.
    pub fn ground(&self) -> Option<&BoundaryDesc> {
        self.boundaries
            .iter()
            .find(|b| b.kind == BoundaryKind::Ground)
    }
}

/// Split a manifest into simulated bodies and boundaries.
///
/// Records sharing a body name are merged into one body with several parts;
/// they must share a transform. Meshes matching no rule are scenery and are
/// skipped.
pub fn classify(manifest: &SceneManifest, rules: &RoleRules) -> Result<SceneRoles> {
    let mut roles = SceneRoles::default();

    for mesh in &manifest.meshes {
        if mesh.name.starts_with(&rules.body_prefix) {
            match roles.bodies.iter_mut().find(|b| b.id == mesh.name) {
                Some(body) => {
                    if body.transform != mesh.transform {
                        return Err(SceneError::SplitBody(mesh.name.clone()));
                    }
                    body.parts.push(mesh.geometry.clone());
                }
                None => roles.bodies.push(BodyDesc {
                    id: mesh.name.clone(),
                    transform: mesh.transform,
                    parts: vec![mesh.geometry.clone()],
                }),
            }
        } else if mesh.name == rules.ground_name {
            roles.boundaries.push(BoundaryDesc::from_geometry(
                &mesh.name,
                BoundaryKind::Ground,
                &mesh.geometry,
                mesh.transform,
            )?);
        } else if mesh.name.starts_with(&rules.wall_prefix) {
            roles.boundaries.push(BoundaryDesc::from_geometry(
                &mesh.name,
                BoundaryKind::Wall,
                &mesh.geometry,
                mesh.transform,
            )?);
        } else {
            debug!(mesh = %mesh.name, "skipping scenery mesh");
        }
    }

    for body in &roles.bodies {
        let count = body.hull_points().count();
        if count < 4 {
            return Err(SceneError::DegenerateBody {
                name: body.id.clone(),
                count,
            });
        }
    }

    if rules.default_ground && roles.ground().is_none() {
        roles.boundaries.push(BoundaryDesc::default_ground());
    }

    Ok(roles)
}
