//! Telemetry integration (optional).
//!
//! With the `telemetry` feature these hooks emit `tracing` events under the
//! `swarm_pso` target; without it they compile to nothing. They only read
//! optimizer state, so enabling them never changes a run.

use crate::algorithms::OverflowPolicy;
use crate::numeric::Numeric;

/// Global best improved (`iteration` is `None` during initialization)
#[cfg(feature = "telemetry")]
pub(crate) fn improved<N: Numeric>(iteration: Option<usize>, particle: usize, score: N) {
    match iteration {
        Some(iteration) => tracing::trace!(
            target: "swarm_pso",
            iteration,
            particle,
            score = score.to_f64(),
            "global best improved"
        ),
        None => tracing::trace!(
            target: "swarm_pso",
            particle,
            score = score.to_f64(),
            "initial global best"
        ),
    }
}

#[cfg(not(feature = "telemetry"))]
#[inline(always)]
pub(crate) fn improved<N: Numeric>(_iteration: Option<usize>, _particle: usize, _score: N) {}

/// Progress checkpoint reached
#[cfg(feature = "telemetry")]
pub(crate) fn progress<N: Numeric>(iteration: usize, best_score: N) {
    tracing::debug!(
        target: "swarm_pso",
        iteration,
        best_score = best_score.to_f64(),
        "progress"
    );
}

#[cfg(not(feature = "telemetry"))]
#[inline(always)]
pub(crate) fn progress<N: Numeric>(_iteration: usize, _best_score: N) {}

/// The update rule overflowed and the policy absorbed it
#[cfg(feature = "telemetry")]
pub(crate) fn overflowed(count: u64, policy: OverflowPolicy) {
    tracing::warn!(
        target: "swarm_pso",
        count,
        policy = ?policy,
        "numeric overflow in velocity/position update"
    );
}

#[cfg(not(feature = "telemetry"))]
#[inline(always)]
pub(crate) fn overflowed(_count: u64, _policy: OverflowPolicy) {}
