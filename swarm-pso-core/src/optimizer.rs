//! The global-best PSO update loop
//!
//! Per iteration, per particle (in order), per dimension (in order):
//!
//! ```text
//! rc, rs  ~ U[0, 1)                      (cognitive first, then social)
//! v[d]    = w*v[d] + c*rc*(p[d] - x[d]) + s*rs*(g[d] - x[d])
//! x[d]   += v[d]
//! ```
//!
//! then the particle is re-evaluated and its personal best, followed by the
//! swarm's global best, is replaced on strict improvement. The global best is
//! updated in place, so particle `j` already steers toward an improvement made
//! by particle `j - 1` in the same iteration. Reproducing a run bit for bit
//! depends on this ordering; a parallel version would have to defer the
//! global-best update to a per-iteration reduction and would diverge.
//!
//! Neither velocity nor position is clamped, and there is no convergence
//! test: the loop always spends its full iteration budget.

use alloc::vec::Vec;

use rand_core::RngCore;

use crate::algorithms::{OverflowPolicy, Weights};
use crate::numeric::Numeric;
use crate::rng::RandomStream;
use crate::swarm::{evaluate, Swarm};
use crate::telemetry;
use crate::traits::{Objective, SwarmObserver};
use crate::{Error, Result};

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<N> {
    /// Final global best score
    pub best_score: N,
    /// Final global best position
    pub best_position: Vec<N>,
    /// Iterations executed (always the full budget)
    pub iterations: usize,
    /// Objective evaluations performed by the loop
    pub evaluations: u64,
    /// Update-rule overflows absorbed by the wrap/saturate policies
    pub overflows: u64,
    /// Iteration that produced the final global best (`None`: initialization)
    pub best_iteration: Option<usize>,
}

/// Iterations between progress callbacks: `max_iterations / 10`, at least 1.
pub fn progress_interval(max_iterations: usize) -> usize {
    (max_iterations / 10).max(1)
}

/// Run `max_iterations` update steps on an initialized swarm.
///
/// An objective failure or a non-comparable score aborts the run with
/// [`Error::Evaluation`]; under [`OverflowPolicy::Fail`] an overflow in the
/// update aborts with [`Error::NumericOverflow`]. The swarm keeps whatever
/// state it had reached when the error occurred.
pub fn run<N, F, R, O>(
    swarm: &mut Swarm<N>,
    rng: &mut RandomStream<R>,
    objective: &F,
    weights: Weights<N>,
    max_iterations: usize,
    policy: OverflowPolicy,
    mut observer: O,
) -> Result<Outcome<N>>
where
    N: Numeric,
    F: Objective<N> + ?Sized,
    R: RngCore,
    O: SwarmObserver<N>,
{
    let interval = progress_interval(max_iterations);
    let mut arith = Arith::new(policy);
    let mut evaluations = 0u64;
    let mut best_iteration = None;

    observer.on_state(0, swarm);

    for iteration in 0..max_iterations {
        if iteration % interval == 0 {
            telemetry::progress(iteration, swarm.best_score);
            observer.on_progress(iteration, swarm.best_score, &swarm.best_position);
        }

        let Swarm {
            particles,
            best_position,
            best_score,
            ..
        } = &mut *swarm;

        for (index, particle) in particles.iter_mut().enumerate() {
            arith.at(iteration, index);
            for d in 0..particle.position.len() {
                let rc: N = rng.unit_value();
                let rs: N = rng.unit_value();

                let x = particle.position[d];
                let inertia = arith.mul(weights.inertia, particle.velocity[d])?;
                let pull = arith.mul(weights.cognitive, rc)?;
                let gap = arith.sub(particle.best_position[d], x)?;
                let cognitive = arith.mul(pull, gap)?;
                let pull = arith.mul(weights.social, rs)?;
                let gap = arith.sub(best_position[d], x)?;
                let social = arith.mul(pull, gap)?;
                let partial = arith.add(inertia, cognitive)?;
                let velocity = arith.add(partial, social)?;

                particle.velocity[d] = velocity;
                particle.position[d] = arith.add(x, velocity)?;
            }

            let score = evaluate(objective, &particle.position, Some(iteration), index)?;
            evaluations += 1;

            if score < particle.best_score {
                particle.best_score = score;
                particle.best_position.clone_from(&particle.position);
                if score < *best_score {
                    *best_score = score;
                    best_position.clone_from(&particle.position);
                    best_iteration = Some(iteration);
                    telemetry::improved(Some(iteration), index, score);
                }
            }
        }

        observer.on_state(iteration + 1, swarm);
    }

    if arith.overflows > 0 {
        telemetry::overflowed(arith.overflows, policy);
    }

    Ok(Outcome {
        best_score: swarm.best_score,
        best_position: swarm.best_position.clone(),
        iterations: max_iterations,
        evaluations,
        overflows: arith.overflows,
        best_iteration,
    })
}

/// Update-rule arithmetic under an overflow policy.
struct Arith {
    policy: OverflowPolicy,
    overflows: u64,
    iteration: usize,
    particle: usize,
}

impl Arith {
    fn new(policy: OverflowPolicy) -> Self {
        Self {
            policy,
            overflows: 0,
            iteration: 0,
            particle: 0,
        }
    }

    fn at(&mut self, iteration: usize, particle: usize) {
        self.iteration = iteration;
        self.particle = particle;
    }

    fn add<N: Numeric>(&mut self, a: N, b: N) -> Result<N> {
        self.apply(a.checked_add(b), || a.wrapping_add(b), || a.saturating_add(b))
    }

    fn sub<N: Numeric>(&mut self, a: N, b: N) -> Result<N> {
        self.apply(a.checked_sub(b), || a.wrapping_sub(b), || a.saturating_sub(b))
    }

    fn mul<N: Numeric>(&mut self, a: N, b: N) -> Result<N> {
        self.apply(a.checked_mul(b), || a.wrapping_mul(b), || a.saturating_mul(b))
    }

    fn apply<N>(
        &mut self,
        checked: Option<N>,
        wrapped: impl FnOnce() -> N,
        saturated: impl FnOnce() -> N,
    ) -> Result<N> {
        if let Some(value) = checked {
            return Ok(value);
        }
        match self.policy {
            OverflowPolicy::Wrap => {
                self.overflows += 1;
                Ok(wrapped())
            }
            OverflowPolicy::Saturate => {
                self.overflows += 1;
                Ok(saturated())
            }
            OverflowPolicy::Fail => Err(Error::NumericOverflow {
                iteration: self.iteration,
                particle: self.particle,
            }),
        }
    }
}
