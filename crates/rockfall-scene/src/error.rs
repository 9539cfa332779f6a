//! Error types for manifest classification.

use thiserror::Error;

/// Errors that can occur while turning a manifest into scene roles.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Manifest could not be parsed.
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// A boundary mesh has no vertices, so it cannot be sized.
    #[error("boundary mesh has no geometry: {0}")]
    EmptyBoundary(String),

    /// A simulated mesh has too few vertices for a hull.
    #[error("body mesh {name} has {count} vertices, need at least 4")]
    DegenerateBody {
        /// Mesh name.
        name: String,
        /// Number of vertices found.
        count: usize,
    },

    /// Two records share a body name but not a placement.
    #[error("sub-meshes of {0} disagree on transform")]
    SplitBody(String),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
