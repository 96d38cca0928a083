//! Deterministic random stream
//!
//! A run owns exactly one [`RandomStream`], seeded from configuration. There is
//! no entropy source: for a given seed the sequence of deviates, and therefore
//! the whole optimization trajectory, is reproducible bit for bit.
//!
//! Both numeric backends consume the same `f64` deviates; the fixed-point
//! backend quantizes them with [`Numeric::from_f64`].

use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

use crate::numeric::Numeric;

/// 2^-53: maps the top 53 bits of a `u64` onto `[0, 1)`.
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// Seeded source of uniform deviates.
#[derive(Debug, Clone)]
pub struct RandomStream<R = ChaCha8Rng> {
    rng: R,
    draws: u64,
}

impl RandomStream<ChaCha8Rng> {
    /// Create the default stream (ChaCha8) from a seed
    pub fn new(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomStream<R> {
    /// Wrap an already-seeded generator
    pub fn from_rng(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Uniform deviate in `[0, 1)`
    pub fn next_unit(&mut self) -> f64 {
        self.draws += 1;
        (self.rng.next_u64() >> 11) as f64 * UNIT_SCALE
    }

    /// Uniform deviate in `[lo, hi)`
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_unit()
    }

    /// Uniform deviate in `[lo, hi)`, quantized into `N`
    pub fn uniform_value<N: Numeric>(&mut self, lo: N, hi: N) -> N {
        N::from_f64(self.uniform(lo.to_f64(), hi.to_f64()))
    }

    /// Unit deviate quantized into `N` (cognitive/social coefficients)
    pub fn unit_value<N: Numeric>(&mut self) -> N {
        N::from_f64(self.next_unit())
    }

    /// Number of deviates produced so far
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Fix16;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomStream::new(42);
        let mut b = RandomStream::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_unit().to_bits(), b.next_unit().to_bits());
        }
        assert_eq!(a.draws(), 1000);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = RandomStream::new(1);
        let mut b = RandomStream::new(2);
        let same = (0..16).filter(|_| a.next_unit() == b.next_unit()).count();
        assert!(same < 16);
    }

    #[test]
    fn deviates_stay_in_range() {
        let mut stream = RandomStream::new(7);
        for _ in 0..10_000 {
            let u = stream.next_unit();
            assert!((0.0..1.0).contains(&u));
            let v = stream.uniform(-5.0, 5.0);
            assert!((-5.0..5.0).contains(&v));
        }
    }

    #[test]
    fn fixed_point_quantizes_the_float_stream() {
        let mut float = RandomStream::new(42);
        let mut fixed = RandomStream::new(42);
        for _ in 0..100 {
            let u = float.next_unit();
            let q: Fix16 = fixed.unit_value();
            assert_eq!(q, Fix16::from_f64(u));
        }
    }
}
