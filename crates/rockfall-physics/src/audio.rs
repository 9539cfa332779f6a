//! Audio triggers emitted by the core.
//!
//! The core never touches sound data. It tells an [`AudioSink`] which cue to
//! play and leaves voice selection, mixing and volume to the audio subsystem.

use std::fmt;

use tracing::trace;

/// A sound the core can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Rocks hit something.
    Collision,
    /// A pick pushed at least one rock.
    Explosion,
    /// Background loop started with play.
    Ambient,
    /// The scene is being rebuilt.
    Reset,
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cue::Collision => "collision",
            Cue::Explosion => "explosion",
            Cue::Ambient => "ambient",
            Cue::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// The audio subsystem as seen from the core.
pub trait AudioSink {
    /// Play a cue.
    fn play(&mut self, cue: Cue);

    /// Global mute toggle.
    fn set_muted(&mut self, muted: bool);

    /// Play the collision cue.
    fn play_collision(&mut self) {
        self.play(Cue::Collision);
    }

    /// Play the explosion cue.
    fn play_explosion(&mut self) {
        self.play(Cue::Explosion);
    }

    /// Start the ambient loop.
    fn play_ambient(&mut self) {
        self.play(Cue::Ambient);
    }

    /// Play the reset cue.
    fn play_reset(&mut self) {
        self.play(Cue::Reset);
    }
}

/// Sink that records every audible cue in order.
///
/// Cues requested while muted are dropped, as a real mixer would.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerLog {
    cues: Vec<Cue>,
    muted: bool,
}

impl TriggerLog {
    /// Create an empty, unmuted log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every cue played, oldest first.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// How many times `cue` was played.
    pub fn count(&self, cue: Cue) -> usize {
        self.cues.iter().filter(|&&c| c == cue).count()
    }

    /// True if muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl AudioSink for TriggerLog {
    fn play(&mut self, cue: Cue) {
        if self.muted {
            trace!(%cue, "cue dropped while muted");
            return;
        }
        self.cues.push(cue);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_log_counts() {
        let mut log = TriggerLog::new();
        log.play_ambient();
        log.play_collision();
        log.play_collision();

        assert_eq!(log.cues(), &[Cue::Ambient, Cue::Collision, Cue::Collision]);
        assert_eq!(log.count(Cue::Collision), 2);
        assert_eq!(log.count(Cue::Reset), 0);
    }

    #[test]
    fn test_muted_log_drops_cues() {
        let mut log = TriggerLog::new();
        log.set_muted(true);
        log.play_explosion();
        log.set_muted(false);
        log.play_reset();

        assert_eq!(log.cues(), &[Cue::Reset]);
    }
}
