//! RNG module - injectable random sources
//!
//! Every random decision the rules make (refill kinds, the context-event roll,
//! review text) goes through [`RandomSource`], so callers can swap the
//! generator. [`SimpleRng`] is a seeded LCG for normal play and
//! reproducible runs; [`SequenceRng`] replays a fixed script for tests that
//! need exact control over each draw.

use crate::types::TileKind;

/// Source of randomness for the forge rules.
pub trait RandomSource {
    /// Generate the next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Generate a value in `[0, bound)`. `bound` must be non-zero.
    ///
    /// The default maps the high bits of [`RandomSource::next_u32`] onto the
    /// range, which avoids the short low-bit periods of an LCG.
    fn next_below(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }

    /// Uniform pick from the five ordinary kinds.
    fn ordinary_kind(&mut self) -> TileKind {
        TileKind::ORDINARY[self.next_below(TileKind::ORDINARY.len() as u32) as usize]
    }

    /// Roll in `[0, 100)`.
    fn percent_roll(&mut self) -> u32 {
        self.next_below(100)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        (**self).next_below(bound)
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Current internal state (reseeding with it continues the sequence).
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Scripted source that cycles through a fixed list of values.
///
/// `next_below(bound)` yields `value % bound`, so a script of small integers
/// reads directly as "which ordinary kind" or "which percent roll".
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<u32>,
    cursor: usize,
}

impl SequenceRng {
    /// Create from a script. An empty script behaves like `[0]`.
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        let mut values = values.into();
        if values.is_empty() {
            values.push(0);
        }
        Self { values, cursor: 0 }
    }

    /// Script that always refills with `kind`.
    ///
    /// Event rolls draw the same value: the kind's slot in `TileKind::ORDINARY`,
    /// so a roll comes out in `0..=4` and fires for any chance above that slot.
    pub fn constant(kind: TileKind) -> Self {
        let slot = TileKind::ORDINARY
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0) as u32;
        Self::new(vec![slot])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_script_rolls_its_slot() {
        let mut rng = SequenceRng::constant(TileKind::Bug);
        assert_eq!(rng.next_below(5), 4);
        assert_eq!(rng.percent_roll(), 4);
        assert!(rng.percent_roll() < 5);

        let mut rng = SequenceRng::constant(TileKind::Data);
        assert_eq!(rng.percent_roll(), 0);
    }

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);

        let v1 = rng1.next_u32();
        let v2 = rng2.next_u32();
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        let mut zero = SimpleRng::new(0);
        let mut one = SimpleRng::new(1);
        assert_eq!(zero.next_u32(), one.next_u32());
    }

    #[test]
    fn test_next_below_stays_in_range() {
        let mut rng = SimpleRng::new(7);
        for bound in [1u32, 2, 5, 6, 100] {
            for _ in 0..500 {
                assert!(rng.next_below(bound) < bound);
            }
        }
    }

    #[test]
    fn test_ordinary_kind_covers_all_kinds() {
        let mut rng = SimpleRng::new(42);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let kind = rng.ordinary_kind();
            assert!(kind.is_ordinary());
            let slot = TileKind::ORDINARY.iter().position(|k| *k == kind).unwrap();
            seen[slot] = true;
        }
        assert!(seen.iter().all(|s| *s), "Missing kinds: {:?}", seen);
    }

    #[test]
    fn test_sequence_rng_cycles_script() {
        let mut rng = SequenceRng::new(vec![0, 3, 4]);
        assert_eq!(rng.ordinary_kind(), TileKind::Data);
        assert_eq!(rng.ordinary_kind(), TileKind::Coffee);
        assert_eq!(rng.ordinary_kind(), TileKind::Bug);
        assert_eq!(rng.ordinary_kind(), TileKind::Data);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_sequence_constant() {
        let mut rng = SequenceRng::constant(TileKind::Writing);
        for _ in 0..10 {
            assert_eq!(rng.ordinary_kind(), TileKind::Writing);
        }
        // Slot 2 is always below the 30% threshold.
        assert!(rng.percent_roll() < 30);
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn draw_kind(mut source: impl RandomSource) -> TileKind {
            source.ordinary_kind()
        }

        let mut rng = SequenceRng::new(vec![1]);
        assert_eq!(draw_kind(&mut rng), TileKind::Theory);
        assert_eq!(rng.draws(), 1);
    }
}
