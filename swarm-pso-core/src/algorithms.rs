//! Particle Swarm Optimization configuration and driver
//!
//! [`ParticleSwarm`] is the construction interface: it owns the configuration,
//! the objective and the run's [`RandomStream`], and exposes the two-phase
//! initialize/run lifecycle plus best-score/best-position queries.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::numeric::Numeric;
use crate::observe::NoopObserver;
use crate::optimizer::{self, Outcome};
use crate::rng::RandomStream;
use crate::swarm::{Bounds, Swarm};
use crate::traits::{Objective, SwarmObserver};
use crate::{ConfigError, Error, Result};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Velocity update coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights<N> {
    /// Inertia weight (how much prior velocity persists)
    pub inertia: N,
    /// Cognitive coefficient (attraction to personal best)
    pub cognitive: N,
    /// Social coefficient (attraction to global best)
    pub social: N,
}

impl<N: Numeric> Weights<N> {
    pub fn new(inertia: N, cognitive: N, social: N) -> Self {
        Self {
            inertia,
            cognitive,
            social,
        }
    }
}

impl<N: Numeric> Default for Weights<N> {
    fn default() -> Self {
        Self::new(N::from_f64(0.75), N::ONE, N::ONE)
    }
}

/// What the update rule does when arithmetic leaves the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Keep the two's-complement wrapped result; the event is counted
    #[default]
    Wrap,
    /// Clamp to the representable range; the event is counted
    Saturate,
    /// Abort the run with [`Error::NumericOverflow`]
    Fail,
}

/// Particle Swarm Optimization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSwarmConfig<N> {
    /// Number of particles in the swarm
    pub num_particles: usize,
    /// Dimensionality of the search space
    pub dimensions: usize,
    /// Initial sampling domain
    pub bounds: Bounds<N>,
    /// Inertia / cognitive / social coefficients
    pub weights: Weights<N>,
    /// Fixed iteration budget (no early stopping)
    pub max_iterations: usize,
    /// Seed for the run's random stream
    pub seed: u64,
    /// Overflow handling in the update rule
    pub overflow: OverflowPolicy,
}

impl<N: Numeric> Default for ParticleSwarmConfig<N> {
    fn default() -> Self {
        Self {
            num_particles: 100,
            dimensions: 2,
            bounds: Bounds::unchecked(N::from_f64(-5.0), N::from_f64(5.0)),
            weights: Weights::default(),
            max_iterations: 1000,
            seed: DEFAULT_SEED,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl<N: Numeric> ParticleSwarmConfig<N> {
    /// Reject configurations the initializer cannot honor
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.num_particles == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if self.dimensions == 0 {
            return Err(ConfigError::ZeroDimensions);
        }
        self.bounds.validate()
    }

    /// Iterations between progress callbacks
    pub fn progress_interval(&self) -> usize {
        optimizer::progress_interval(self.max_iterations)
    }
}

struct RunState<N, R> {
    swarm: Swarm<N>,
    rng: RandomStream<R>,
}

/// A particle swarm bound to one objective.
pub struct ParticleSwarm<N, F, R = ChaCha8Rng> {
    config: ParticleSwarmConfig<N>,
    objective: F,
    state: Option<RunState<N, R>>,
}

impl<N: Numeric, F: Objective<N>> ParticleSwarm<N, F> {
    /// Validate the configuration and bind the objective
    pub fn new(config: ParticleSwarmConfig<N>, objective: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            objective,
            state: None,
        })
    }

    /// Build the swarm from a fresh random stream seeded with `config.seed`.
    ///
    /// Calling this again discards the previous swarm and starts over.
    pub fn initialize(&mut self) -> Result<&Swarm<N>> {
        let mut rng = RandomStream::new(self.config.seed);
        let swarm = Swarm::initialize(&self.config, &self.objective, &mut rng)?;
        let state = self.state.insert(RunState { swarm, rng });
        Ok(&state.swarm)
    }

    /// Run the full iteration budget on the initialized swarm
    pub fn run<O: SwarmObserver<N>>(&mut self, observer: O) -> Result<Outcome<N>> {
        let state = self.state.as_mut().ok_or(Error::NotInitialized)?;
        optimizer::run(
            &mut state.swarm,
            &mut state.rng,
            &self.objective,
            self.config.weights,
            self.config.max_iterations,
            self.config.overflow,
            observer,
        )
    }

    /// Initialize then run without observers
    pub fn optimize(&mut self) -> Result<Outcome<N>> {
        self.initialize()?;
        self.run(NoopObserver)
    }

    /// Current global best score
    pub fn best_score(&self) -> Result<N> {
        self.swarm().map(Swarm::best_score)
    }

    /// Current global best position
    pub fn best_position(&self) -> Result<&[N]> {
        self.swarm().map(Swarm::best_position)
    }

    /// The swarm, once initialized
    pub fn swarm(&self) -> Result<&Swarm<N>> {
        self.state
            .as_ref()
            .map(|state| &state.swarm)
            .ok_or(Error::NotInitialized)
    }

    pub fn config(&self) -> &ParticleSwarmConfig<N> {
        &self.config
    }

    pub fn objective(&self) -> &F {
        &self.objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Fix16;
    use crate::objectives::Sphere;

    #[test]
    fn defaults_are_the_classic_settings() {
        let config = ParticleSwarmConfig::<f64>::default();
        assert_eq!(config.num_particles, 100);
        assert_eq!(config.dimensions, 2);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.bounds.lower(), -5.0);
        assert_eq!(config.bounds.upper(), 5.0);
        assert_eq!(config.weights, Weights::new(0.75, 1.0, 1.0));
        assert_eq!(config.progress_interval(), 100);

        let fixed = ParticleSwarmConfig::<Fix16>::default();
        assert_eq!(fixed.weights.inertia.to_f64(), 0.75);
    }

    #[test]
    fn progress_interval_never_zero() {
        let config = ParticleSwarmConfig::<f64> {
            max_iterations: 7,
            ..Default::default()
        };
        assert_eq!(config.progress_interval(), 1);
    }

    #[test]
    fn queries_fail_before_initialization() {
        let mut pso = ParticleSwarm::new(ParticleSwarmConfig::<f64>::default(), Sphere).unwrap();
        assert_eq!(pso.best_score(), Err(Error::NotInitialized));
        assert!(matches!(pso.best_position(), Err(Error::NotInitialized)));
        assert!(matches!(pso.run(NoopObserver), Err(Error::NotInitialized)));

        pso.initialize().unwrap();
        assert!(pso.best_score().is_ok());
        assert_eq!(pso.best_position().unwrap().len(), 2);
    }

    #[test]
    fn construction_rejects_bad_config() {
        let config = ParticleSwarmConfig::<f64> {
            num_particles: 0,
            ..Default::default()
        };
        assert!(matches!(
            ParticleSwarm::new(config, Sphere),
            Err(Error::Configuration(ConfigError::ZeroParticles))
        ));
    }

    #[test]
    fn reinitialize_restarts_the_stream() {
        let config = ParticleSwarmConfig::<f64> {
            num_particles: 8,
            max_iterations: 20,
            ..Default::default()
        };
        let mut pso = ParticleSwarm::new(config, Sphere).unwrap();
        let first = pso.optimize().unwrap();
        let second = pso.optimize().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn policies_serialize_snake_case() {
        let json = serde_json::to_string(&OverflowPolicy::Saturate).unwrap();
        assert_eq!(json, "\"saturate\"");
        let policy: OverflowPolicy = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(policy, OverflowPolicy::Fail);
    }
}
