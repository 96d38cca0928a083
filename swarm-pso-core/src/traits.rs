//! Core traits for swarm-pso
//!
//! These traits define the seams between the optimizer and its collaborators:
//! the function being minimized, and anything that wants to watch a run.

use crate::numeric::Numeric;
use crate::swarm::Swarm;
use crate::EvaluationError;

/// A cost function the swarm minimizes.
///
/// Implementations must be pure: the optimizer calls `evaluate` exactly
/// `num_particles * (1 + max_iterations)` times per run and relies on equal
/// inputs giving equal outputs.
pub trait Objective<N: Numeric> {
    /// Score a position (lower is better)
    fn evaluate(&self, position: &[N]) -> core::result::Result<N, EvaluationError>;
}

impl<N, F> Objective<N> for F
where
    N: Numeric,
    F: Fn(&[N]) -> N,
{
    fn evaluate(&self, position: &[N]) -> core::result::Result<N, EvaluationError> {
        Ok(self(position))
    }
}

/// Passive hook into a run.
///
/// Observers see the swarm but cannot change it, so attaching one never
/// alters the trajectory.
pub trait SwarmObserver<N: Numeric> {
    /// Called before iteration `iteration` at the progress interval
    fn on_progress(&mut self, _iteration: usize, _best_score: N, _best_position: &[N]) {}

    /// Called with index 0 after initialization and index `i + 1` after iteration `i`
    fn on_state(&mut self, _iteration: usize, _swarm: &Swarm<N>) {}
}

impl<N: Numeric, O: SwarmObserver<N> + ?Sized> SwarmObserver<N> for &mut O {
    fn on_progress(&mut self, iteration: usize, best_score: N, best_position: &[N]) {
        (**self).on_progress(iteration, best_score, best_position)
    }

    fn on_state(&mut self, iteration: usize, swarm: &Swarm<N>) {
        (**self).on_state(iteration, swarm)
    }
}

impl<N: Numeric, O: SwarmObserver<N>> SwarmObserver<N> for Option<O> {
    fn on_progress(&mut self, iteration: usize, best_score: N, best_position: &[N]) {
        if let Some(observer) = self {
            observer.on_progress(iteration, best_score, best_position)
        }
    }

    fn on_state(&mut self, iteration: usize, swarm: &Swarm<N>) {
        if let Some(observer) = self {
            observer.on_state(iteration, swarm)
        }
    }
}

/// Fan out to two observers, first `A` then `B`.
impl<N: Numeric, A: SwarmObserver<N>, B: SwarmObserver<N>> SwarmObserver<N> for (A, B) {
    fn on_progress(&mut self, iteration: usize, best_score: N, best_position: &[N]) {
        self.0.on_progress(iteration, best_score, best_position);
        self.1.on_progress(iteration, best_score, best_position);
    }

    fn on_state(&mut self, iteration: usize, swarm: &Swarm<N>) {
        self.0.on_state(iteration, swarm);
        self.1.on_state(iteration, swarm);
    }
}
