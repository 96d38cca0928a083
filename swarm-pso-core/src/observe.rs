//! Observer implementations and serializable swarm snapshots.
//!
//! [`Snapshot`] is the record schema written to trajectory files. Values are
//! stored as `f64` regardless of the numeric backend so that float and
//! fixed-point runs produce the same schema.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::numeric::Numeric;
use crate::swarm::Swarm;
use crate::traits::SwarmObserver;

/// Observer that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<N: Numeric> SwarmObserver<N> for NoopObserver {}

/// Records the global best score at every state callback.
///
/// Index 0 holds the score after initialization, index `i + 1` the score
/// after iteration `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct BestHistory<N> {
    scores: Vec<N>,
}

impl<N> Default for BestHistory<N> {
    fn default() -> Self {
        Self { scores: Vec::new() }
    }
}

impl<N: Numeric> BestHistory<N> {
    pub fn scores(&self) -> &[N] {
        &self.scores
    }

    /// Score after initialization
    pub fn initial(&self) -> Option<N> {
        self.scores.first().copied()
    }

    /// Score after the last completed iteration
    pub fn last(&self) -> Option<N> {
        self.scores.last().copied()
    }
}

impl<N: Numeric> SwarmObserver<N> for BestHistory<N> {
    fn on_state(&mut self, _iteration: usize, swarm: &Swarm<N>) {
        self.scores.push(swarm.best_score());
    }
}

/// One particle's kinematic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub index: usize,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
}

/// Full swarm state at one state callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 0 after initialization, `i + 1` after iteration `i`
    pub iteration: usize,
    pub particles: Vec<ParticleRecord>,
    pub best_position: Vec<f64>,
    pub best_score: f64,
}

impl Snapshot {
    pub fn capture<N: Numeric>(iteration: usize, swarm: &Swarm<N>) -> Self {
        Self {
            iteration,
            particles: swarm
                .particles()
                .iter()
                .enumerate()
                .map(|(index, p)| ParticleRecord {
                    index,
                    position: widen(&p.position),
                    velocity: widen(&p.velocity),
                })
                .collect(),
            best_position: widen(swarm.best_position()),
            best_score: swarm.best_score().to_f64(),
        }
    }
}

fn widen<N: Numeric>(values: &[N]) -> Vec<f64> {
    values.iter().map(|v| v.to_f64()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ParticleSwarmConfig;
    use crate::numeric::Fix16;
    use crate::objectives::Sphere;
    use crate::rng::RandomStream;

    fn swarm<N: Numeric>() -> Swarm<N> {
        let config = ParticleSwarmConfig::<N> {
            num_particles: 3,
            ..ParticleSwarmConfig::default()
        };
        Swarm::initialize(&config, &Sphere, &mut RandomStream::new(42)).unwrap()
    }

    #[test]
    fn snapshot_captures_every_particle() {
        let swarm = swarm::<f64>();
        let snapshot = Snapshot::capture(0, &swarm);
        assert_eq!(snapshot.particles.len(), 3);
        assert_eq!(snapshot.particles[2].index, 2);
        assert_eq!(snapshot.particles[1].position, swarm.particles()[1].position);
        assert_eq!(snapshot.best_score, swarm.best_score());
    }

    #[test]
    fn fixed_point_snapshot_widens_exactly() {
        let swarm = swarm::<Fix16>();
        let snapshot = Snapshot::capture(4, &swarm);
        for (record, particle) in snapshot.particles.iter().zip(swarm.particles()) {
            for (wide, narrow) in record.velocity.iter().zip(&particle.velocity) {
                assert_eq!(Fix16::from_f64(*wide), *narrow);
            }
        }
    }

    #[test]
    fn snapshot_json_shape() {
        let snapshot = Snapshot::capture(0, &swarm::<f64>());
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["iteration"], 0);
        assert_eq!(value["particles"].as_array().unwrap().len(), 3);
        assert!(value["best_score"].is_f64());
        assert_eq!(value["particles"][0]["velocity"].as_array().unwrap().len(), 2);
    }
}
