//! # swarm-pso core
//!
//! Deterministic Particle Swarm Optimization primitives.
//!
//! This crate is `no_std` compatible (it needs `alloc`) and provides:
//! - A [`numeric::Numeric`] abstraction with an IEEE `f64` realization and a
//!   bit-reproducible [`numeric::Fixed`] realization
//! - A seeded [`rng::RandomStream`] with a fixed, observable draw order
//! - Swarm state and the deterministic initializer ([`swarm`])
//! - The global-best velocity/position update loop ([`optimizer`])
//! - Observer hooks for progress reporting and trajectory dumps
//!
//! ## Feature Flags
//!
//! - `std` (default): Enable standard library support (`std::error::Error` impls)
//! - `telemetry`: Enable tracing-based telemetry

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod algorithms;
pub mod numeric;
pub mod objectives;
pub mod observe;
pub mod optimizer;
pub mod rng;
pub mod swarm;
pub mod telemetry;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::*;
    pub use crate::numeric::{Fix16, Fixed, Numeric};
    pub use crate::objectives::{Matyas, Rosenbrock, Sphere};
    pub use crate::observe::{BestHistory, NoopObserver, Snapshot};
    pub use crate::optimizer::Outcome;
    pub use crate::rng::RandomStream;
    pub use crate::swarm::{Bounds, Particle, Swarm};
    pub use crate::traits::*;
    pub use crate::{ConfigError, Error, EvaluationError, Result};
}

/// Result type for swarm-pso operations
pub type Result<T> = core::result::Result<T, Error>;

/// Invalid construction parameters. Always fatal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The swarm needs at least one particle
    ZeroParticles,
    /// The search space needs at least one dimension
    ZeroDimensions,
    /// Lower bound is not strictly below the upper bound
    InvertedBounds,
    /// A bound or the bounds' span does not fit in the numeric realization
    BoundsOverflow,
    /// A weight does not fit in the numeric realization
    WeightOverflow,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroParticles => write!(f, "particle count must be non-zero"),
            ConfigError::ZeroDimensions => write!(f, "dimension count must be non-zero"),
            ConfigError::InvertedBounds => write!(f, "lower bound must be below upper bound"),
            ConfigError::BoundsOverflow => {
                write!(f, "bounds are not representable in the numeric type")
            }
            ConfigError::WeightOverflow => {
                write!(f, "weight is not representable in the numeric type")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Failure of the objective function for one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationError {
    /// The objective produced a value that cannot be ordered (e.g. NaN)
    NotComparable,
    /// Intermediate arithmetic left the representable range
    Overflow,
    /// The position has the wrong number of coordinates for this objective
    DimensionMismatch { expected: usize, actual: usize },
    /// Objective-specific failure
    Failed(&'static str),
}

impl core::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EvaluationError::NotComparable => write!(f, "objective value is not comparable"),
            EvaluationError::Overflow => write!(f, "objective arithmetic overflowed"),
            EvaluationError::DimensionMismatch { expected, actual } => {
                write!(f, "expected at least {expected} coordinates, got {actual}")
            }
            EvaluationError::Failed(reason) => write!(f, "objective failed: {reason}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EvaluationError {}

/// Error type for swarm-pso core operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid construction parameters
    Configuration(ConfigError),
    /// The objective failed; `iteration` is `None` during initialization
    Evaluation {
        iteration: Option<usize>,
        particle: usize,
        source: EvaluationError,
    },
    /// Update arithmetic overflowed under [`algorithms::OverflowPolicy::Fail`]
    NumericOverflow { iteration: usize, particle: usize },
    /// Best score/position queried before initialization
    NotInitialized,
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Configuration(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration(err) => Some(err),
            Error::Evaluation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Configuration(err) => write!(f, "invalid configuration: {err}"),
            Error::Evaluation {
                iteration: Some(iteration),
                particle,
                source,
            } => write!(
                f,
                "evaluation failed at iteration {iteration}, particle {particle}: {source}"
            ),
            Error::Evaluation {
                iteration: None,
                particle,
                source,
            } => write!(
                f,
                "evaluation failed during initialization, particle {particle}: {source}"
            ),
            Error::NumericOverflow {
                iteration,
                particle,
            } => write!(
                f,
                "numeric overflow at iteration {iteration}, particle {particle}"
            ),
            Error::NotInitialized => write!(f, "swarm has not been initialized"),
        }
    }
}
