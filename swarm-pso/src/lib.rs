//! # swarm-pso
//!
//! **Deterministic particle swarm optimization over float and fixed-point
//! numerics.**
//!
//! This crate wraps [`swarm_pso_core`] with the `std` pieces a complete run
//! needs: a JSON-loadable [`RunConfig`], backend dispatch, progress logging
//! through `tracing`, and NDJSON trajectory files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swarm_pso::{Backend, ObjectiveKind, RunConfig};
//!
//! let config = RunConfig::builder()
//!     .objective(ObjectiveKind::Rosenbrock)
//!     .backend(Backend::Fixed)
//!     .num_particles(50)
//!     .max_iterations(500)
//!     .build();
//!
//! let report = swarm_pso::run(&config)?;
//! println!("best {} at {:?}", report.best_score, report.best_position);
//! # Ok::<(), swarm_pso::RunError>(())
//! ```
//!
//! ## Crate Structure
//!
//! - [`swarm_pso_core`]: numerics, swarm state, the update loop (no_std compatible)
//! - [`trajectory`]: trajectory file writer/reader
//! - [`progress`]: progress logging observer

#![forbid(unsafe_code)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub use swarm_pso_core as core;

pub use swarm_pso_core::{
    algorithms::{OverflowPolicy, ParticleSwarm, ParticleSwarmConfig, Weights},
    numeric::{Fix16, Numeric},
    objectives::{Matyas, Rosenbrock, Sphere},
    swarm::Bounds,
    traits::{Objective, SwarmObserver},
    ConfigError, EvaluationError,
};

pub mod error;
pub mod progress;
pub mod trajectory;

pub use error::{Result, RunError};
pub use progress::ProgressLog;
pub use trajectory::{read_trajectory, Trajectory, TrajectoryHeader, TrajectoryRecorder};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::prelude::*;

    pub use crate::{Backend, ObjectiveKind, RunConfig, RunConfigBuilder, RunReport};
}

/// Numeric realization used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// IEEE-754 `f64`
    #[default]
    Float,
    /// Q16.16 fixed point ([`Fix16`])
    Fixed,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Float => "float",
            Backend::Fixed => "fixed",
        })
    }
}

impl FromStr for Backend {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "float" | "f64" => Ok(Backend::Float),
            "fixed" | "fix16" => Ok(Backend::Fixed),
            other => Err(RunError::InvalidArgument(format!("unknown backend `{other}`"))),
        }
    }
}

/// Built-in objective selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    #[default]
    Sphere,
    Rosenbrock,
    Matyas,
}

impl ObjectiveKind {
    /// Dimensions and bounds the objective is always run with, if any
    pub fn fixed_shape(self) -> Option<(usize, f64, f64)> {
        match self {
            ObjectiveKind::Matyas => Some((2, -10.0, 10.0)),
            ObjectiveKind::Sphere | ObjectiveKind::Rosenbrock => None,
        }
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectiveKind::Sphere => "sphere",
            ObjectiveKind::Rosenbrock => "rosenbrock",
            ObjectiveKind::Matyas => "matyas",
        })
    }
}

impl FromStr for ObjectiveKind {
    type Err = RunError;

    /// Accepts the long names and the legacy `f1` (sphere) / `f2` (Matyas) aliases
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sphere" | "f1" => Ok(ObjectiveKind::Sphere),
            "rosenbrock" => Ok(ObjectiveKind::Rosenbrock),
            "matyas" | "f2" => Ok(ObjectiveKind::Matyas),
            other => Err(RunError::InvalidArgument(format!("unknown function `{other}`"))),
        }
    }
}

impl<N: Numeric> Objective<N> for ObjectiveKind {
    fn evaluate(&self, position: &[N]) -> std::result::Result<N, EvaluationError> {
        match self {
            ObjectiveKind::Sphere => Sphere.evaluate(position),
            ObjectiveKind::Rosenbrock => Rosenbrock.evaluate(position),
            ObjectiveKind::Matyas => Matyas.evaluate(position),
        }
    }
}

/// Configuration for a complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub num_particles: usize,
    pub dimensions: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
    pub max_iterations: usize,
    pub seed: u64,
    pub objective: ObjectiveKind,
    pub backend: Backend,
    pub overflow: OverflowPolicy,
    /// Write an NDJSON trajectory here
    pub trajectory: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let base = ParticleSwarmConfig::<f64>::default();
        Self {
            num_particles: base.num_particles,
            dimensions: base.dimensions,
            lower_bound: base.bounds.lower(),
            upper_bound: base.bounds.upper(),
            inertia: base.weights.inertia,
            cognitive: base.weights.cognitive,
            social: base.weights.social,
            max_iterations: base.max_iterations,
            seed: base.seed,
            objective: ObjectiveKind::default(),
            backend: Backend::default(),
            overflow: base.overflow,
            trajectory: None,
        }
    }
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
    }

    /// Load a (possibly partial) JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(RunError::io(path))?;
        serde_json::from_slice(&bytes).map_err(RunError::json(path))
    }

    /// Apply the objective's fixed dimensions and bounds, if it has them
    pub fn resolved(&self) -> RunConfig {
        let mut config = self.clone();
        if let Some((dimensions, lower, upper)) = self.objective.fixed_shape() {
            config.dimensions = dimensions;
            config.lower_bound = lower;
            config.upper_bound = upper;
        }
        config
    }

    /// Core optimizer configuration in numeric type `N`
    ///
    /// Bounds and weights that `N` cannot represent are rejected rather than
    /// clamped.
    pub fn core_config<N: Numeric>(&self) -> Result<ParticleSwarmConfig<N>> {
        let bound = |x| convert::<N>(x, ConfigError::BoundsOverflow);
        let weight = |x| convert::<N>(x, ConfigError::WeightOverflow);
        let bounds = Bounds::new(bound(self.lower_bound)?, bound(self.upper_bound)?)
            .map_err(swarm_pso_core::Error::from)?;
        let config = ParticleSwarmConfig {
            num_particles: self.num_particles,
            dimensions: self.dimensions,
            bounds,
            weights: Weights::new(
                weight(self.inertia)?,
                weight(self.cognitive)?,
                weight(self.social)?,
            ),
            max_iterations: self.max_iterations,
            seed: self.seed,
            overflow: self.overflow,
        };
        config.validate().map_err(swarm_pso_core::Error::from)?;
        Ok(config)
    }

    fn trajectory_header(&self) -> TrajectoryHeader {
        TrajectoryHeader {
            schema_version: trajectory::SCHEMA_VERSION_V1,
            objective: self.objective,
            backend: self.backend,
            num_particles: self.num_particles,
            dimensions: self.dimensions,
            max_iterations: self.max_iterations,
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            seed: self.seed,
        }
    }
}

fn convert<N: Numeric>(value: f64, unrepresentable: ConfigError) -> Result<N> {
    N::checked_from_f64(value)
        .ok_or_else(|| swarm_pso_core::Error::from(unrepresentable).into())
}

/// Builder for RunConfig
#[derive(Debug, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_particles(mut self, num_particles: usize) -> Self {
        self.config.num_particles = num_particles;
        self
    }

    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    /// Initial sampling domain on every axis
    pub fn bounds(mut self, lower: f64, upper: f64) -> Self {
        self.config.lower_bound = lower;
        self.config.upper_bound = upper;
        self
    }

    /// Inertia, cognitive and social coefficients
    pub fn weights(mut self, inertia: f64, cognitive: f64, social: f64) -> Self {
        self.config.inertia = inertia;
        self.config.cognitive = cognitive;
        self.config.social = social;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn objective(mut self, objective: ObjectiveKind) -> Self {
        self.config.objective = objective;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.config.overflow = overflow;
        self
    }

    /// Record every iteration to an NDJSON file
    pub fn trajectory(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.trajectory = Some(path.into());
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}

/// Summary of a finished run, widened to `f64`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub backend: Backend,
    pub objective: ObjectiveKind,
    pub best_score: f64,
    pub best_position: Vec<f64>,
    /// Global best right after initialization
    pub initial_best_score: f64,
    pub iterations: usize,
    /// Objective evaluations including initialization
    pub evaluations: u64,
    pub overflows: u64,
    /// Iteration that found the final best (`None`: initialization)
    pub best_iteration: Option<usize>,
    pub elapsed: Duration,
    pub time_to_best: Duration,
    /// SHA-256 of the trajectory file, when one was written
    pub trajectory_digest: Option<String>,
}

/// Run the configured optimization to completion.
///
/// The configuration is [resolved](RunConfig::resolved) first, then dispatched
/// to the `f64` or [`Fix16`] realization of the same optimizer.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let config = config.resolved();
    match config.backend {
        Backend::Float => execute::<f64>(&config),
        Backend::Fixed => execute::<Fix16>(&config),
    }
}

fn execute<N: Numeric>(config: &RunConfig) -> Result<RunReport> {
    let swarm_config = config.core_config::<N>()?;
    let span = tracing::info_span!(
        "run",
        objective = %config.objective,
        backend = %config.backend,
        seed = config.seed
    );
    let _entered = span.enter();

    let started = Instant::now();
    let mut pso = ParticleSwarm::new(swarm_config, config.objective)?;
    let initial_best_score = pso.initialize()?.best_score().to_f64();

    let mut recorder = match &config.trajectory {
        Some(path) => Some(TrajectoryRecorder::create(path, &config.trajectory_header())?),
        None => None,
    };
    let mut progress = ProgressLog::starting_at(started);
    let outcome = pso.run((&mut progress, recorder.as_mut()))?;
    let trajectory_digest = recorder.map(TrajectoryRecorder::finish).transpose()?;

    let report = RunReport {
        backend: config.backend,
        objective: config.objective,
        best_score: outcome.best_score.to_f64(),
        best_position: outcome.best_position.iter().map(|x| x.to_f64()).collect(),
        initial_best_score,
        iterations: outcome.iterations,
        evaluations: config.num_particles as u64 + outcome.evaluations,
        overflows: outcome.overflows,
        best_iteration: outcome.best_iteration,
        elapsed: progress.elapsed(),
        time_to_best: progress.time_to_best(),
        trajectory_digest,
    };

    tracing::info!(
        best_score = report.best_score,
        best_iteration = ?report.best_iteration,
        evaluations = report.evaluations,
        overflows = report.overflows,
        elapsed_ms = report.elapsed.as_secs_f64() * 1e3,
        "run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_core_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.num_particles, 100);
        assert_eq!(config.dimensions, 2);
        assert_eq!((config.lower_bound, config.upper_bound), (-5.0, 5.0));
        assert_eq!((config.inertia, config.cognitive, config.social), (0.75, 1.0, 1.0));
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.objective, ObjectiveKind::Sphere);
        assert_eq!(config.backend, Backend::Float);
    }

    #[test]
    fn builder_sets_fields() {
        let config = RunConfig::builder()
            .num_particles(7)
            .dimensions(3)
            .bounds(-1.0, 2.0)
            .weights(0.5, 1.5, 2.5)
            .max_iterations(9)
            .seed(3)
            .objective(ObjectiveKind::Rosenbrock)
            .backend(Backend::Fixed)
            .overflow(OverflowPolicy::Saturate)
            .trajectory("out.ndjson")
            .build();
        assert_eq!(config.num_particles, 7);
        assert_eq!(config.dimensions, 3);
        assert_eq!((config.lower_bound, config.upper_bound), (-1.0, 2.0));
        assert_eq!(config.social, 2.5);
        assert_eq!(config.overflow, OverflowPolicy::Saturate);
        assert_eq!(config.trajectory, Some(PathBuf::from("out.ndjson")));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: RunConfig = serde_json::from_str(
            r#"{ "num_particles": 12, "objective": "rosenbrock", "backend": "fixed" }"#,
        )
        .unwrap();
        assert_eq!(config.num_particles, 12);
        assert_eq!(config.objective, ObjectiveKind::Rosenbrock);
        assert_eq!(config.backend, Backend::Fixed);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.overflow, OverflowPolicy::Wrap);
    }

    #[test]
    fn matyas_forces_its_shape() {
        let config = RunConfig::builder()
            .objective(ObjectiveKind::Matyas)
            .dimensions(5)
            .bounds(0.0, 1.0)
            .build()
            .resolved();
        assert_eq!(config.dimensions, 2);
        assert_eq!((config.lower_bound, config.upper_bound), (-10.0, 10.0));
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("f1".parse::<ObjectiveKind>().unwrap(), ObjectiveKind::Sphere);
        assert_eq!("f2".parse::<ObjectiveKind>().unwrap(), ObjectiveKind::Matyas);
        assert_eq!(
            "rosenbrock".parse::<ObjectiveKind>().unwrap(),
            ObjectiveKind::Rosenbrock
        );
        assert!("ackley".parse::<ObjectiveKind>().is_err());
        assert_eq!("fixed".parse::<Backend>().unwrap(), Backend::Fixed);
        assert!("half".parse::<Backend>().is_err());
    }

    #[test]
    fn invalid_bounds_are_configuration_errors() {
        let config = RunConfig::builder().bounds(3.0, -3.0).max_iterations(1).build();
        assert!(matches!(
            run(&config),
            Err(RunError::Optimizer(swarm_pso_core::Error::Configuration(
                swarm_pso_core::ConfigError::InvertedBounds
            )))
        ));
    }

    #[test]
    fn fixed_point_rejects_values_it_would_clamp() {
        let overflow = |config: &RunConfig| match config.core_config::<Fix16>() {
            Err(RunError::Optimizer(swarm_pso_core::Error::Configuration(err))) => Some(err),
            _ => None,
        };

        let bounds = RunConfig::builder().bounds(-40000.0, -5.0).build();
        assert_eq!(overflow(&bounds), Some(ConfigError::BoundsOverflow));
        assert!(bounds.core_config::<f64>().is_ok());

        let weights = RunConfig::builder().weights(0.75, 1.0, 50000.0).build();
        assert_eq!(overflow(&weights), Some(ConfigError::WeightOverflow));

        let edge = RunConfig::builder().bounds(-16000.0, 16000.0).build();
        assert!(edge.core_config::<Fix16>().is_ok());

        let infinite = RunConfig::builder().weights(f64::INFINITY, 1.0, 1.0).build();
        assert!(matches!(
            infinite.core_config::<f64>(),
            Err(RunError::Optimizer(swarm_pso_core::Error::Configuration(
                ConfigError::WeightOverflow
            )))
        ));
    }

    #[test]
    fn report_counts_initial_evaluations() {
        let config = RunConfig::builder()
            .num_particles(6)
            .max_iterations(4)
            .build();
        let report = run(&config).unwrap();
        assert_eq!(report.evaluations, 6 * (1 + 4));
        assert_eq!(report.iterations, 4);
        assert!(report.best_score <= report.initial_best_score);
        assert!(report.trajectory_digest.is_none());
    }
}
