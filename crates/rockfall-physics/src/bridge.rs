//! Collision event bridge: contact batches in, rate-limited cues out.

use tracing::trace;

use crate::audio::AudioSink;
use crate::config::AudioConfig;
use crate::phase::Phase;
use crate::world::ContactSummary;

/// Turns each tick's contact batch into at most one collision cue.
#[derive(Debug, Clone)]
pub struct CollisionBridge {
    min_interval: f64,
    last_fired: Option<f64>,
}

impl CollisionBridge {
    /// Bridge with the given debounce interval in seconds.
    pub fn new(min_interval: f64) -> Self {
        Self {
            min_interval,
            last_fired: None,
        }
    }

    /// Handle one tick's batch at time `now`.
    ///
    /// Fires one collision cue for the whole batch if the scene is playing,
    /// the batch holds an audible contact and the debounce window has passed.
    /// Returns whether the cue fired.
    pub fn on_batch(
        &mut self,
        now: f64,
        contacts: &ContactSummary,
        phase: Phase,
        audio: &mut dyn AudioSink,
    ) -> bool {
        if phase != Phase::Playing || !contacts.is_audible() {
            return false;
        }
        if let Some(last) = self.last_fired {
            if now - last < self.min_interval {
                trace!(now, last, "collision cue debounced");
                return false;
            }
        }

        audio.play_collision();
        self.last_fired = Some(now);
        true
    }
}

/// Explosion cue with the optional once-per-reset limit.
#[derive(Debug, Clone)]
pub struct ExplosionCue {
    once_per_reset: bool,
    spent: bool,
}

impl ExplosionCue {
    /// Cue limiter from audio settings.
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            once_per_reset: config.explosion_once_per_reset,
            spent: false,
        }
    }

    /// A pick pushed at least one body. Returns whether the cue fired.
    pub fn on_push(&mut self, audio: &mut dyn AudioSink) -> bool {
        if self.once_per_reset && self.spent {
            return false;
        }
        audio.play_explosion();
        self.spent = true;
        true
    }

    /// Allow the cue again after a reset.
    pub fn rearm(&mut self) {
        self.spent = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Cue, TriggerLog};

    fn hit() -> ContactSummary {
        ContactSummary {
            started: 3,
            ..ContactSummary::default()
        }
    }

    #[test]
    fn test_debounce_window() {
        let mut bridge = CollisionBridge::new(0.25);
        let mut audio = TriggerLog::new();

        let fired: Vec<bool> = [0.0, 0.05, 0.10, 0.30]
            .iter()
            .map(|&t| bridge.on_batch(t, &hit(), Phase::Playing, &mut audio))
            .collect();

        assert_eq!(fired, vec![true, false, false, true]);
        assert_eq!(audio.count(Cue::Collision), 2);
    }

    #[test]
    fn test_one_cue_per_batch() {
        let mut bridge = CollisionBridge::new(0.0);
        let mut audio = TriggerLog::new();
        let crowded = ContactSummary {
            started: 40,
            forceful: 12,
            ..ContactSummary::default()
        };

        bridge.on_batch(0.0, &crowded, Phase::Playing, &mut audio);
        assert_eq!(audio.cues(), &[Cue::Collision]);
    }

    #[test]
    fn test_silent_outside_playing() {
        let mut bridge = CollisionBridge::new(0.25);
        let mut audio = TriggerLog::new();

        for phase in [Phase::Loading, Phase::Ready, Phase::Resetting] {
            assert!(!bridge.on_batch(1.0, &hit(), phase, &mut audio));
        }
        assert!(audio.cues().is_empty());
        // Suppressed batches do not start the debounce window.
        assert!(bridge.on_batch(1.0, &hit(), Phase::Playing, &mut audio));
    }

    #[test]
    fn test_empty_batch_is_silent() {
        let mut bridge = CollisionBridge::new(0.25);
        let mut audio = TriggerLog::new();
        let separating = ContactSummary {
            stopped: 2,
            ..ContactSummary::default()
        };

        assert!(!bridge.on_batch(0.0, &separating, Phase::Playing, &mut audio));
        assert!(audio.cues().is_empty());
    }

    #[test]
    fn test_force_only_batch_is_silent() {
        let mut bridge = CollisionBridge::new(0.25);
        let mut audio = TriggerLog::new();
        let resting = ContactSummary {
            forceful: 3,
            peak_force: 12.0,
            ..ContactSummary::default()
        };

        assert!(!bridge.on_batch(0.0, &resting, Phase::Playing, &mut audio));
        assert!(audio.cues().is_empty());
    }

    #[test]
    fn test_explosion_once_per_reset() {
        let config = AudioConfig {
            explosion_once_per_reset: true,
            ..AudioConfig::default()
        };
        let mut cue = ExplosionCue::new(&config);
        let mut audio = TriggerLog::new();

        assert!(cue.on_push(&mut audio));
        assert!(!cue.on_push(&mut audio));
        cue.rearm();
        assert!(cue.on_push(&mut audio));
        assert_eq!(audio.count(Cue::Explosion), 2);
    }

    #[test]
    fn test_explosion_unlimited_by_default() {
        let mut cue = ExplosionCue::new(&AudioConfig::default());
        let mut audio = TriggerLog::new();

        for _ in 0..3 {
            assert!(cue.on_push(&mut audio));
        }
        assert_eq!(audio.count(Cue::Explosion), 3);
    }
}
