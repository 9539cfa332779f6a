#![warn(missing_docs)]

//! Scene manifest for the rockfall playground.
//!
//! This crate defines what the asset loader hands to the physics core: a flat
//! list of named meshes with their geometry and placement, and the rules that
//! split those meshes into simulated bodies and static boundaries.
//!
//! The manifest is purely declarative. Building colliders from it is the job
//! of `rockfall-physics`.

use serde::{Deserialize, Serialize};

mod error;
mod roles;

pub use error::{Result, SceneError};
pub use roles::{classify, BodyDesc, BoundaryDesc, BoundaryKind, RoleRules, SceneRoles};

/// Position and orientation of a mesh in world space.
///
/// Rotation is a unit quaternion stored as `[x, y, z, w]`, the same order the
/// renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World-space translation.
    pub translation: [f32; 3],
    /// Orientation quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
}

impl Transform {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Transform with a translation and no rotation.
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: [x, y, z],
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Raw triangle geometry in the mesh's local frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    /// Flat vertex positions `[x0, y0, z0, x1, ...]`.
    pub vertices: Vec<f32>,
    /// Triangle indices into `vertices`, three per triangle. May be empty
    /// for point clouds used only as hull input.
    #[serde(default)]
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Iterate vertices as `[x, y, z]` triples.
    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.chunks_exact(3).map(|v| [v[0], v[1], v[2]])
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for empty geometry.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut points = self.points();
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some((min, max))
    }

    /// Axis-aligned box centered at the origin with the given half extents.
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        let mut vertices = Vec::with_capacity(24);
        for &z in &[-hz, hz] {
            for &y in &[-hy, hy] {
                for &x in &[-hx, hx] {
                    vertices.extend_from_slice(&[x, y, z]);
                }
            }
        }
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        Self { vertices, indices }
    }
}

/// One named mesh as discovered by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Mesh name from the model file.
    pub name: String,
    /// Local geometry.
    #[serde(flatten)]
    pub geometry: Geometry,
    /// World placement.
    #[serde(default)]
    pub transform: Transform,
}

/// A loaded scene, as stored in a manifest file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// Every mesh in the model, in traversal order.
    pub meshes: Vec<MeshRecord>,
}

impl Default for SceneManifest {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            meshes: Vec::new(),
        }
    }
}

impl SceneManifest {
    /// Create a new empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mesh.
    pub fn push(&mut self, name: impl Into<String>, geometry: Geometry, transform: Transform) {
        self.meshes.push(MeshRecord {
            name: name.into(),
            geometry,
            transform,
        });
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
