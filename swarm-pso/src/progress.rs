//! Progress logging observer.

use std::time::{Duration, Instant};

use swarm_pso_core::numeric::Numeric;
use swarm_pso_core::swarm::Swarm;
use swarm_pso_core::traits::SwarmObserver;

/// Logs the global best at every progress checkpoint and remembers how long
/// the run took to reach its final best.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    started: Instant,
    best: Option<f64>,
    time_to_best: Duration,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Measure times relative to `started` (e.g. to include initialization)
    pub fn starting_at(started: Instant) -> Self {
        Self {
            started,
            best: None,
            time_to_best: Duration::ZERO,
        }
    }

    /// Elapsed time at the state callback that first held the current best
    pub fn time_to_best(&self) -> Duration {
        self.time_to_best
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for ProgressLog {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Numeric> SwarmObserver<N> for ProgressLog {
    fn on_progress(&mut self, iteration: usize, best_score: N, best_position: &[N]) {
        let position: Vec<f64> = best_position.iter().map(|x| x.to_f64()).collect();
        tracing::info!(
            iteration,
            best_score = best_score.to_f64(),
            best_position = ?position,
            "progress"
        );
    }

    fn on_state(&mut self, _iteration: usize, swarm: &Swarm<N>) {
        let score = swarm.best_score().to_f64();
        if self.best.map_or(true, |best| score < best) {
            self.best = Some(score);
            self.time_to_best = self.started.elapsed();
        }
    }
}
