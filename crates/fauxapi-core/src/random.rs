//! Random sources for failure injection.
//!
//! The client never reaches for a global RNG: every decision is drawn from
//! a [`RandomSource`] handed over at construction, so tests can script the
//! exact values a call sees.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A stream of uniform values in `[0, 1)`.
pub trait RandomSource {
    /// Returns the next uniform value.
    fn next_uniform(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Clamps a raw draw into `[0, 1)`. NaN maps to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else if value >= 1.0 {
        1.0 - f64::EPSILON
    } else {
        value
    }
}

/// Convenience draws built on top of [`RandomSource::next_uniform`].
pub(crate) trait DrawExt: RandomSource {
    /// Next value, clamped into `[0, 1)`.
    fn unit(&mut self) -> f64 {
        clamp_unit(self.next_uniform())
    }

    /// Uniform integer in `lo..=hi`.
    fn range_u64(&mut self, lo: u64, hi: u64) -> u64 {
        let span = hi.saturating_sub(lo) + 1;
        lo + ((self.unit() * span as f64) as u64).min(span - 1)
    }

    /// Uniform element of a non-empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = (self.unit() * items.len() as f64) as usize;
        &items[idx.min(items.len() - 1)]
    }

    /// Price in `lo..hi`, rounded to cents.
    fn price(&mut self, lo: f64, hi: f64) -> f64 {
        round_cents(lo + self.unit() * (hi - lo))
    }
}

impl<S: RandomSource + ?Sized> DrawExt for S {}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Adapter exposing any [`rand::Rng`] as a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R = StdRng> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Seeds from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Seeds deterministically; the same seed replays the same run.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Scripted values, replayed in order and cycled once exhausted.
///
/// An empty script yields `0.0` forever.
#[derive(Debug, Clone, Default)]
pub struct FixedSequence {
    values: Vec<f64>,
    position: usize,
}

impl FixedSequence {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.position
    }
}

impl RandomSource for FixedSequence {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            self.position += 1;
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sequence_cycles() {
        let mut source = FixedSequence::new(vec![0.1, 0.2]);
        assert_eq!(source.next_uniform(), 0.1);
        assert_eq!(source.next_uniform(), 0.2);
        assert_eq!(source.next_uniform(), 0.1);
        assert_eq!(source.draws(), 3);
    }

    #[test]
    fn test_fixed_sequence_empty_yields_zero() {
        let mut source = FixedSequence::default();
        assert_eq!(source.next_uniform(), 0.0);
        assert_eq!(source.next_uniform(), 0.0);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = RngSource::seeded(99);
        let mut b = RngSource::seeded(99);
        for _ in 0..100 {
            assert_eq!(a.next_uniform(), b.next_uniform());
        }
    }

    #[test]
    fn test_rng_source_stays_in_unit_interval() {
        let mut source = RngSource::seeded(1);
        for _ in 0..10_000 {
            let value = source.next_uniform();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(-3.0), 0.0);
        assert!(clamp_unit(1.0) < 1.0);
        assert!(clamp_unit(7.5) < 1.0);
        assert_eq!(clamp_unit(0.25), 0.25);
    }

    #[test]
    fn test_range_u64_bounds() {
        assert_eq!(FixedSequence::constant(0.0).range_u64(1, 10), 1);
        assert_eq!(FixedSequence::constant(0.999_999).range_u64(1, 10), 10);
        assert_eq!(FixedSequence::constant(1.0).range_u64(1, 10), 10);
        assert_eq!(FixedSequence::constant(0.5).range_u64(7, 7), 7);
    }

    #[test]
    fn test_pick_covers_slice() {
        let items = ["a", "b", "c"];
        assert_eq!(*FixedSequence::constant(0.0).pick(&items), "a");
        assert_eq!(*FixedSequence::constant(0.5).pick(&items), "b");
        assert_eq!(*FixedSequence::constant(0.99).pick(&items), "c");
    }

    #[test]
    fn test_price_rounds_to_cents() {
        let price = FixedSequence::constant(0.123_456).price(10.0, 20.0);
        assert_eq!(price, 11.23);
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn RandomSource> = Box::new(FixedSequence::constant(0.5));
        assert_eq!(source.next_uniform(), 0.5);
    }
}
