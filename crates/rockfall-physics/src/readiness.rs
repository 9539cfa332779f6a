//! Join of the two startup signals.
//!
//! The engine and the asset loader come up independently and in either order.
//! [`ReadinessGate`] holds whichever arrives first and hands out a single
//! [`Ready`] token when the second one lands. [`Physics::initialize`] takes that
//! token, so a world cannot be built before both signals have fired.
//!
//! [`Physics::initialize`]: crate::Physics::initialize

use rockfall_scene::SceneRoles;
use tracing::debug;

/// Proof that both startup signals fired, carrying the loader hand-off.
#[derive(Debug)]
pub struct Ready {
    roles: SceneRoles,
}

impl Ready {
    /// Simulated bodies and boundaries delivered by the loader.
    pub fn roles(&self) -> &SceneRoles {
        &self.roles
    }
}

/// Barrier over the engine-ready and assets-loaded signals.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    engine: bool,
    roles: Option<SceneRoles>,
    fired: bool,
}

impl ReadinessGate {
    /// Create a gate with neither signal received.
    pub fn new() -> Self {
        Self::default()
    }

    /// The physics engine finished initializing.
    pub fn engine_ready(&mut self) -> Option<Ready> {
        if self.engine {
            debug!("duplicate engine-ready signal ignored");
        }
        self.engine = true;
        self.try_fire()
    }

    /// The loader delivered its classification.
    pub fn assets_loaded(&mut self, roles: SceneRoles) -> Option<Ready> {
        if self.fired || self.roles.is_some() {
            debug!("duplicate assets-loaded signal ignored");
            return None;
        }
        self.roles = Some(roles);
        self.try_fire()
    }

    /// True once the token has been handed out.
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    fn try_fire(&mut self) -> Option<Ready> {
        if self.fired || !self.engine {
            return None;
        }
        let roles = self.roles.take()?;
        self.fired = true;
        Some(Ready { roles })
    }
}
