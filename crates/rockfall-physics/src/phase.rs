//! Play/reset phase machine.

use std::fmt;

use tracing::{debug, info};

/// Where the scene is in its play/reset cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the engine and the assets.
    Loading,
    /// World built, waiting for the user to start.
    Ready,
    /// Picks and collision cues are live.
    Playing,
    /// Bodies rebuilt, waiting out the grace delay.
    Resetting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Playing => "playing",
            Phase::Resetting => "resetting",
        };
        f.write_str(name)
    }
}

/// Transition table for [`Phase`].
///
/// Each request method returns whether the transition happened; requests
/// that are not legal from the current phase are rejected, never queued.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phase: Phase,
    grace_delay: f64,
    resume_at: Option<f64>,
}

impl PhaseMachine {
    /// Machine in [`Phase::Loading`].
    pub fn new(grace_delay: f64) -> Self {
        Self {
            phase: Phase::Loading,
            grace_delay,
            resume_at: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True if picks may push bodies.
    pub fn accepts_picks(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// `Loading → Ready`, once both startup signals fired.
    pub fn mark_ready(&mut self) -> bool {
        self.transition(Phase::Loading, Phase::Ready)
    }

    /// `Ready → Playing` on the user's start action.
    pub fn start(&mut self) -> bool {
        self.transition(Phase::Ready, Phase::Playing)
    }

    /// `Playing → Resetting` on the user's reset action.
    pub fn begin_reset(&mut self) -> bool {
        self.transition(Phase::Playing, Phase::Resetting)
    }

    /// The rebuild finished at time `now`; resume after the grace delay.
    pub fn reset_completed(&mut self, now: f64) {
        if self.phase != Phase::Resetting {
            debug!(phase = %self.phase, "reset completion outside resetting ignored");
            return;
        }
        self.resume_at = Some(now + self.grace_delay);
        self.advance(now);
    }

    /// Move the clock to `now`, finishing a reset whose grace delay elapsed.
    pub fn advance(&mut self, now: f64) -> bool {
        match self.resume_at {
            Some(at) if self.phase == Phase::Resetting && now >= at => {
                self.resume_at = None;
                self.transition(Phase::Resetting, Phase::Playing)
            }
            _ => false,
        }
    }

    fn transition(&mut self, from: Phase, to: Phase) -> bool {
        if self.phase != from {
            debug!(phase = %self.phase, requested = %to, "phase transition rejected");
            return false;
        }
        info!(%from, %to, "phase change");
        self.phase = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(grace: f64) -> PhaseMachine {
        let mut machine = PhaseMachine::new(grace);
        assert!(machine.mark_ready());
        assert!(machine.start());
        machine
    }

    #[test]
    fn test_startup_path() {
        let mut machine = PhaseMachine::new(0.25);
        assert_eq!(machine.phase(), Phase::Loading);
        assert!(!machine.start());
        assert!(machine.mark_ready());
        assert!(!machine.accepts_picks());
        assert!(machine.start());
        assert!(machine.accepts_picks());
        assert!(!machine.mark_ready());
    }

    #[test]
    fn test_reset_waits_for_grace_delay() {
        let mut machine = playing(0.25);
        assert!(machine.begin_reset());
        machine.reset_completed(1.0);
        assert_eq!(machine.phase(), Phase::Resetting);
        assert!(!machine.accepts_picks());

        assert!(!machine.advance(1.2));
        assert!(machine.advance(1.25));
        assert_eq!(machine.phase(), Phase::Playing);
    }

    #[test]
    fn test_second_reset_rejected() {
        let mut machine = playing(0.25);
        assert!(machine.begin_reset());
        machine.reset_completed(0.0);
        assert!(!machine.begin_reset());
        assert_eq!(machine.phase(), Phase::Resetting);

        machine.advance(0.3);
        assert!(machine.begin_reset());
    }

    #[test]
    fn test_zero_grace_resumes_immediately() {
        let mut machine = playing(0.0);
        machine.begin_reset();
        machine.reset_completed(2.0);
        assert_eq!(machine.phase(), Phase::Playing);
    }

    #[test]
    fn test_reset_before_start_rejected() {
        let mut machine = PhaseMachine::new(0.25);
        machine.mark_ready();
        assert!(!machine.begin_reset());
        assert_eq!(machine.phase(), Phase::Ready);
    }
}
