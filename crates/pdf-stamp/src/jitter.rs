//! Random perturbation of page stamps
//!
//! Small offsets and tilts make repeated stamps look hand-applied. Each draw
//! is independent, so the engine can reuse one generator across a batch.

use crate::constants::{JITTER_MAX_ROTATION_DEG, JITTER_MAX_STEPS, JITTER_STEP};
use crate::options::PagePosition;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Boxed generator shared across a batch
pub type StampRng = Box<dyn RngCore + Send>;

/// Generator from an optional seed; unseeded runs draw from OS entropy
pub fn stamp_rng(seed: Option<u64>) -> StampRng {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    }
}

/// A jittered page stamp position plus its tilt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jittered {
    pub position: PagePosition,
    /// Counter-clockwise tilt in whole degrees
    pub rotation_degrees: f32,
}

/// Perturb `base` by up to two steps per axis and tilt up to two degrees.
///
/// A perturbed ratio is kept only if it stays strictly inside (0, 1);
/// otherwise that axis keeps its base value.
pub fn jitter<R: Rng + ?Sized>(base: PagePosition, rng: &mut R) -> Jittered {
    let steps = JITTER_MAX_STEPS;
    let dx = f32::from(rng.gen_range(-steps..=steps)) * JITTER_STEP;
    let dy = f32::from(rng.gen_range(-steps..=steps)) * JITTER_STEP;
    let tilt = f32::from(rng.gen_range(-JITTER_MAX_ROTATION_DEG..=JITTER_MAX_ROTATION_DEG));

    Jittered {
        position: PagePosition::new(nudge(base.x, dx), nudge(base.y, dy)),
        rotation_degrees: tilt,
    }
}

fn nudge(value: f32, delta: f32) -> f32 {
    let moved = value + delta;
    if moved > 0.0 && moved < 1.0 { moved } else { value }
}
