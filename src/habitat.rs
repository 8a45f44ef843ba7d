//! Contract between the evolutionary core and the simulation that hosts it.

use crate::creature::{CreatureId, CreatureState};
use crate::gait::LimbForces;
use crate::genetics::Genome;
use nalgebra::Vector3;

/// Simulation environment that owns creature bodies.
///
/// The core reads creature state through [`Habitat::observe`] and drives
/// limbs through [`Habitat::actuate`]; it never touches bodies directly.
pub trait Habitat {
    /// Materialize a creature bound to `genome` at `start`, walking toward `target`
    fn spawn(
        &mut self,
        genome: &Genome,
        start: Vector3<f32>,
        target: Vector3<f32>,
    ) -> (CreatureId, CreatureState);

    /// Current state of a live instance
    fn observe(&self, id: CreatureId) -> Option<CreatureState>;

    /// Hold the given force on each limb
    fn actuate(&mut self, id: CreatureId, forces: &LimbForces);

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Destroy every instance of the current generation
    fn clear(&mut self);

    /// Toggle the visual "current fittest" marker
    fn highlight(&mut self, _id: CreatureId, _on: bool) {}
}
