//! Seedable randomness for pick impulses.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ImpulseConfig;

/// Attempts at drawing a non-degenerate direction before falling back to up.
const DIRECTION_ATTEMPTS: usize = 8;

/// Source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Deterministic generator for a given seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draw a pick impulse.
///
/// Each direction component is drawn independently from `[-1, 1]` and the
/// result normalized; the magnitude is drawn from the configured range.
pub fn sample_impulse(rng: &mut dyn RandomSource, range: &ImpulseConfig) -> Vector3<f32> {
    let direction = (0..DIRECTION_ATTEMPTS)
        .map(|_| {
            Vector3::new(
                rng.next_unit() * 2.0 - 1.0,
                rng.next_unit() * 2.0 - 1.0,
                rng.next_unit() * 2.0 - 1.0,
            )
        })
        .find_map(|v| v.try_normalize(1.0e-6))
        .unwrap_or_else(Vector3::y);

    let magnitude = range.min + (range.max - range.min) * rng.next_unit();
    direction * magnitude
}
