//! Creature records and the fitness model.
//!
//! Position, alive flag and step reward belong to the simulation. The core
//! keeps the latest observed [`CreatureState`] in each record and only reads it.

use crate::genetics::Genome;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Weight of the progress term in the fitness score
pub const PROGRESS_WEIGHT: f32 = 2.0;

/// Handle of a materialized creature inside a habitat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(pub u64);

impl std::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only snapshot of simulation-owned state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreatureState {
    /// Reference (head) position
    pub position: Vector3<f32>,
    /// Fixed target position
    pub target: Vector3<f32>,
    pub alive: bool,
    /// Accumulated ground-contact reward, frozen once dead
    pub step_reward: f32,
}

impl CreatureState {
    pub fn distance_to_target(&self) -> f32 {
        (self.position - self.target).norm()
    }
}

/// One genome bound to one creature for one evaluation window
#[derive(Clone, Debug)]
pub struct CreatureRecord {
    pub id: CreatureId,
    pub genome: Genome,
    /// Distance to target when materialized
    pub initial_distance: f32,
    /// Latest observed simulation state
    pub state: CreatureState,
}

impl CreatureRecord {
    /// Bind a genome to the state observed at materialization
    pub fn new(id: CreatureId, genome: Genome, spawned: CreatureState) -> Self {
        Self {
            id,
            genome,
            initial_distance: spawned.distance_to_target(),
            state: spawned,
        }
    }

    /// Replace the observed snapshot
    pub fn observe(&mut self, state: CreatureState) {
        self.state = state;
    }

    pub fn is_alive(&self) -> bool {
        self.state.alive
    }

    pub fn distance_to_target(&self) -> f32 {
        distance_to_target(self)
    }

    pub fn fitness(&self) -> f32 {
        fitness(self)
    }
}

/// Euclidean distance between the creature and its target
pub fn distance_to_target(record: &CreatureRecord) -> f32 {
    record.state.distance_to_target()
}

/// Progress toward the target, zero when dead or when moved backward
pub fn progress_term(initial_distance: f32, current_distance: f32, alive: bool) -> f32 {
    let progress = PROGRESS_WEIGHT * (initial_distance - current_distance);
    if !alive || progress < 0.0 {
        0.0
    } else {
        progress
    }
}

/// Fitness = progress term + step reward, never below zero
pub fn fitness(record: &CreatureRecord) -> f32 {
    let progress = progress_term(
        record.initial_distance,
        distance_to_target(record),
        record.is_alive(),
    );
    let total = progress + record.state.step_reward;
    if total.is_nan() || total < 0.0 {
        0.0
    } else {
        total
    }
}
