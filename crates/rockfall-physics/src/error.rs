//! Error types for the physics core.

use rockfall_scene::SceneError;
use thiserror::Error;

/// Errors that can occur while building or driving the simulation.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// The physics engine failed to come up. Fatal for the scene.
    #[error("physics engine failed to initialize: {0}")]
    EngineInit(String),

    /// `initialize` was called on a world that already exists.
    #[error("simulation world is already initialized")]
    AlreadyInitialized,

    /// An operation needed the world before it was built.
    #[error("simulation world is not initialized")]
    NotInitialized,

    /// Two bodies share an id.
    #[error("duplicate body id: {0}")]
    DuplicateBody(String),

    /// Failed to create collision shape.
    #[error("failed to create collision shape for {name}: {reason}")]
    CollisionShape {
        /// Body or boundary name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// The loader hand-off was malformed.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Configuration values are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for physics operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;
