//! Randomness seam for the engine.
//!
//! Every probabilistic rule (breakthrough rolls, strike variance, rewards) draws from a
//! [`Dice`]. Production code shares one [`GameRng`] seeded from process entropy; tests
//! seed it or script exact values with [`ScriptedDice`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub trait Dice: Send {
    /// Uniform integer in `low..=high`.
    fn roll(&mut self, low: i64, high: i64) -> i64;

    /// Uniform float in `[0, 1)`.
    fn chance(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        self.roll(0, len.saturating_sub(1) as i64) as usize
    }
}

/// The shared generator used outside tests.
pub struct GameRng {
    rng: StdRng,
}

impl GameRng {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for GameRng {
    fn roll(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn chance(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays fixed values. Rolls are clamped into the requested range; once a queue is
/// exhausted, rolls fall back to the value closest to zero and chances to `0.5`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDice {
    rolls: VecDeque<i64>,
    chances: VecDeque<f64>,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = i64>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn with_chances(mut self, chances: impl IntoIterator<Item = f64>) -> Self {
        self.chances.extend(chances);
        self
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, low: i64, high: i64) -> i64 {
        let value = self.rolls.pop_front().unwrap_or(0);
        value.clamp(low, high.max(low))
    }

    fn chance(&mut self) -> f64 {
        self.chances.pop_front().unwrap_or(0.5)
    }
}
