//! Swarm state and the deterministic initializer

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::algorithms::ParticleSwarmConfig;
use crate::numeric::Numeric;
use crate::rng::RandomStream;
use crate::telemetry;
use crate::traits::Objective;
use crate::{ConfigError, Error, Result};

/// Search-space bounds, identical on every axis.
///
/// Bounds only shape the initial sampling; they are not enforced while the
/// swarm moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<N> {
    lower: N,
    upper: N,
}

impl<N: Numeric> Bounds<N> {
    /// Create bounds, rejecting `lower >= upper` and unrepresentable spans
    pub fn new(lower: N, upper: N) -> core::result::Result<Self, ConfigError> {
        let bounds = Self { lower, upper };
        bounds.validate()?;
        Ok(bounds)
    }

    // Caller guarantees `lower < upper` with a representable span.
    pub(crate) const fn unchecked(lower: N, upper: N) -> Self {
        Self { lower, upper }
    }

    pub fn lower(&self) -> N {
        self.lower
    }

    pub fn upper(&self) -> N {
        self.upper
    }

    /// `upper - lower`
    pub fn span(&self) -> core::result::Result<N, ConfigError> {
        self.upper
            .checked_sub(self.lower)
            .ok_or(ConfigError::BoundsOverflow)
    }

    /// Initial velocity sampling range `[-(upper - lower), upper - lower]`
    pub fn velocity_range(&self) -> core::result::Result<(N, N), ConfigError> {
        let span = self.span()?;
        Ok((-span, span))
    }

    pub(crate) fn validate(&self) -> core::result::Result<(), ConfigError> {
        // Written as a negation so NaN bounds are rejected too.
        if !(self.lower < self.upper) {
            return Err(ConfigError::InvertedBounds);
        }
        self.span().map(|_| ())
    }
}

/// A candidate solution with personal-best memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle<N> {
    pub position: Vec<N>,
    pub velocity: Vec<N>,
    pub best_position: Vec<N>,
    pub best_score: N,
}

/// All particles plus the globally best-known solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Swarm<N> {
    pub(crate) particles: Vec<Particle<N>>,
    pub(crate) best_position: Vec<N>,
    pub(crate) best_score: N,
    pub(crate) dimensions: usize,
}

impl<N: Numeric> Swarm<N> {
    /// Build a swarm from configuration.
    ///
    /// Draw order: for each particle, for each axis, one position deviate in
    /// `[lower, upper)` then one velocity deviate in `[-span, span)`. Each
    /// particle is evaluated once and that score seeds its personal best. The
    /// swarm best starts at `N::MAX` and only moves on strict improvement; if
    /// no particle scores below `N::MAX`, particle 0 holds it.
    pub fn initialize<F, R>(
        config: &ParticleSwarmConfig<N>,
        objective: &F,
        rng: &mut RandomStream<R>,
    ) -> Result<Self>
    where
        F: Objective<N> + ?Sized,
        R: rand_core::RngCore,
    {
        config.validate()?;
        let dimensions = config.dimensions;
        let bounds = config.bounds;
        let (velocity_lo, velocity_hi) = bounds.velocity_range()?;

        let mut swarm = Swarm {
            particles: Vec::with_capacity(config.num_particles),
            best_position: alloc::vec![bounds.lower(); dimensions],
            best_score: N::MAX,
            dimensions,
        };

        for index in 0..config.num_particles {
            let mut position = Vec::with_capacity(dimensions);
            let mut velocity = Vec::with_capacity(dimensions);
            for _ in 0..dimensions {
                position.push(rng.uniform_value(bounds.lower(), bounds.upper()));
                velocity.push(rng.uniform_value(velocity_lo, velocity_hi));
            }

            let score = evaluate(objective, &position, None, index)?;
            if score < swarm.best_score {
                swarm.best_score = score;
                swarm.best_position.clone_from(&position);
                telemetry::improved(None, index, score);
            } else if index == 0 {
                // Scored exactly `N::MAX`; still a real position.
                swarm.best_position.clone_from(&position);
            }

            swarm.particles.push(Particle {
                best_position: position.clone(),
                position,
                velocity,
                best_score: score,
            });
        }

        Ok(swarm)
    }

    pub fn best_score(&self) -> N {
        self.best_score
    }

    pub fn best_position(&self) -> &[N] {
        &self.best_position
    }

    pub fn particles(&self) -> &[Particle<N>] {
        &self.particles
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Global best equals the minimum personal best and sits at the best
    /// position of a particle holding that minimum.
    pub fn global_best_is_consistent(&self) -> bool {
        let min = self
            .particles
            .iter()
            .map(|p| p.best_score)
            .fold(N::MAX, |acc, s| if s < acc { s } else { acc });
        min == self.best_score
            && self
                .particles
                .iter()
                .any(|p| p.best_score == min && p.best_position == self.best_position)
    }
}

/// Evaluate and reject values that cannot be compared.
pub(crate) fn evaluate<N, F>(
    objective: &F,
    position: &[N],
    iteration: Option<usize>,
    particle: usize,
) -> Result<N>
where
    N: Numeric,
    F: Objective<N> + ?Sized,
{
    let wrap = |source| Error::Evaluation {
        iteration,
        particle,
        source,
    };
    let score = objective.evaluate(position).map_err(wrap)?;
    if !score.is_comparable() {
        return Err(wrap(crate::EvaluationError::NotComparable));
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Fix16;
    use crate::objectives::Sphere;
    use crate::EvaluationError;

    fn config(num_particles: usize, dimensions: usize) -> ParticleSwarmConfig<f64> {
        ParticleSwarmConfig {
            num_particles,
            dimensions,
            ..ParticleSwarmConfig::default()
        }
    }

    #[test]
    fn rejects_empty_swarm_and_space() {
        let mut rng = RandomStream::new(42);
        assert_eq!(
            Swarm::initialize(&config(0, 2), &Sphere, &mut rng),
            Err(Error::Configuration(ConfigError::ZeroParticles))
        );
        assert_eq!(
            Swarm::initialize(&config(3, 0), &Sphere, &mut rng),
            Err(Error::Configuration(ConfigError::ZeroDimensions))
        );
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn rejects_inverted_and_unrepresentable_bounds() {
        assert_eq!(Bounds::new(1.0, 1.0), Err(ConfigError::InvertedBounds));
        assert_eq!(Bounds::new(2.0, -2.0), Err(ConfigError::InvertedBounds));
        assert_eq!(Bounds::new(f64::NAN, 1.0), Err(ConfigError::InvertedBounds));
        assert_eq!(
            Bounds::new(Fix16::from_int(-20000), Fix16::from_int(20000)),
            Err(ConfigError::BoundsOverflow)
        );
    }

    #[test]
    fn samples_positions_and_velocities_in_range() {
        let mut rng = RandomStream::new(42);
        let swarm = Swarm::initialize(&config(25, 3), &Sphere, &mut rng).unwrap();
        assert_eq!(swarm.len(), 25);
        assert_eq!(rng.draws(), 25 * 3 * 2);
        for p in swarm.particles() {
            assert_eq!(p.position.len(), 3);
            assert!(p.position.iter().all(|x| (-5.0..5.0).contains(x)));
            assert!(p.velocity.iter().all(|v| (-10.0..10.0).contains(v)));
            assert_eq!(p.best_position, p.position);
        }
    }

    #[test]
    fn draws_position_then_velocity_per_axis() {
        let mut rng = RandomStream::new(9);
        let swarm = Swarm::initialize(&config(2, 2), &Sphere, &mut rng).unwrap();

        let mut replay = RandomStream::new(9);
        for p in swarm.particles() {
            for d in 0..2 {
                assert_eq!(p.position[d], replay.uniform(-5.0, 5.0));
                assert_eq!(p.velocity[d], replay.uniform(-10.0, 10.0));
            }
        }
    }

    #[test]
    fn personal_best_is_the_initial_evaluation() {
        let mut rng = RandomStream::new(42);
        let swarm = Swarm::initialize(&config(5, 2), &Sphere, &mut rng).unwrap();
        for p in swarm.particles() {
            assert_eq!(p.best_score, Sphere.evaluate(&p.position).unwrap());
        }
        assert!(swarm.global_best_is_consistent());
    }

    #[test]
    fn saturated_scores_still_seed_a_real_global_best() {
        let config = ParticleSwarmConfig::<Fix16> {
            num_particles: 5,
            bounds: Bounds::new(Fix16::from_int(20000), Fix16::from_int(30000)).unwrap(),
            ..ParticleSwarmConfig::default()
        };
        let swarm = Swarm::initialize(&config, &Sphere, &mut RandomStream::new(42)).unwrap();
        assert!(swarm.particles().iter().all(|p| p.best_score == Fix16::MAX));
        assert_eq!(swarm.best_score(), Fix16::MAX);
        assert_eq!(swarm.best_position(), swarm.particles()[0].position.as_slice());
        assert!(swarm.global_best_is_consistent());
    }

    #[test]
    fn global_best_is_first_minimum() {
        let mut rng = RandomStream::new(3);
        let constant = |_: &[f64]| 1.0;
        let swarm = Swarm::initialize(&config(4, 2), &constant, &mut rng).unwrap();
        assert_eq!(swarm.best_score(), 1.0);
        assert_eq!(swarm.best_position(), swarm.particles()[0].position.as_slice());
        assert!(swarm.global_best_is_consistent());
    }

    #[test]
    fn nan_score_is_an_evaluation_error() {
        let mut rng = RandomStream::new(42);
        let broken = |_: &[f64]| f64::NAN;
        assert_eq!(
            Swarm::initialize(&config(2, 2), &broken, &mut rng),
            Err(Error::Evaluation {
                iteration: None,
                particle: 0,
                source: EvaluationError::NotComparable,
            })
        );
    }
}
