//! Phase cursor turning an actuation schedule into limb commands.
//!
//! Every `step_interval` seconds one limb fires: left, then right, then
//! head, and the head firing advances the rhythm phase.

use crate::genetics::{ActuationSchedule, Limb, Phase};
use crate::genetics::codec::PHASE_COUNT;
use nalgebra::Vector3;

/// Force to hold on each limb until the next command
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimbForces {
    forces: [Vector3<f32>; 3],
}

impl LimbForces {
    pub fn zero() -> Self {
        Self {
            forces: [Vector3::zeros(); 3],
        }
    }

    /// All limbs at rest except `limb`
    pub fn single(limb: Limb, force: Vector3<f32>) -> Self {
        let mut forces = Self::zero();
        forces.forces[limb.index()] = force;
        forces
    }

    pub fn get(&self, limb: Limb) -> Vector3<f32> {
        self.forces[limb.index()]
    }

    pub fn total(&self) -> Vector3<f32> {
        self.forces.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.forces.iter().all(|f| *f == Vector3::zeros())
    }
}

/// Per-creature motor program
#[derive(Clone, Debug)]
pub struct Gait {
    schedule: ActuationSchedule,
    step_interval: f32,
    thrust: f32,
    elapsed: f32,
    limb: Limb,
    rhythm: usize,
}

impl Gait {
    pub fn new(schedule: ActuationSchedule, step_interval: f32, thrust: f32) -> Self {
        Self {
            schedule,
            step_interval,
            thrust,
            elapsed: 0.0,
            limb: Limb::Left,
            rhythm: 0,
        }
    }

    /// Limb that fires next
    pub fn next_limb(&self) -> Limb {
        self.limb
    }

    /// Current rhythm phase index
    pub fn rhythm(&self) -> usize {
        self.rhythm
    }

    fn phase(&self) -> &Phase {
        &self.schedule.phases()[self.rhythm]
    }

    /// Advance by `dt` simulated seconds.
    ///
    /// Returns a command when limb forces change: a single firing limb once
    /// the interval has elapsed, or all-zero every tick while dead.
    pub fn tick(&mut self, dt: f32, alive: bool) -> Option<LimbForces> {
        if !alive {
            return Some(LimbForces::zero());
        }

        self.elapsed += dt;
        if self.elapsed <= self.step_interval {
            return None;
        }

        let limb = self.limb;
        let force = self.phase().force(limb) * self.thrust;
        if limb == Limb::Head {
            self.rhythm = (self.rhythm + 1) % PHASE_COUNT;
        }
        self.limb = limb.next();
        self.elapsed = 0.0;

        Some(LimbForces::single(limb, force))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Genome, GENOME_LENGTH};

    fn counting_gait(thrust: f32) -> Gait {
        let mut genes = [0.0; GENOME_LENGTH];
        for (i, gene) in genes.iter_mut().enumerate() {
            *gene = i as f32 + 1.0;
        }
        Gait::new(Genome::new(genes).schedule(), 0.5, thrust)
    }

    #[test]
    fn test_waits_for_interval() {
        let mut gait = counting_gait(1.0);
        assert_eq!(gait.tick(0.25, true), None);
        assert_eq!(gait.tick(0.25, true), None);
        assert!(gait.tick(0.1, true).is_some());
    }

    #[test]
    fn test_firing_order_and_rhythm() {
        let mut gait = counting_gait(1.0);
        let mut fired = Vec::new();
        for _ in 0..6 {
            let command = gait.tick(0.6, true).unwrap();
            let limb = Limb::ALL
                .into_iter()
                .find(|&l| command.get(l) != Vector3::zeros())
                .unwrap();
            fired.push((limb, command.get(limb)));
        }

        assert_eq!(fired[0], (Limb::Left, Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(fired[1], (Limb::Right, Vector3::new(4.0, 5.0, 6.0)));
        assert_eq!(fired[2], (Limb::Head, Vector3::new(7.0, 8.0, 9.0)));
        assert_eq!(fired[3], (Limb::Left, Vector3::new(10.0, 11.0, 12.0)));
        assert_eq!(fired[5], (Limb::Head, Vector3::new(16.0, 17.0, 18.0)));
        assert_eq!(gait.rhythm(), 0);
        assert_eq!(gait.next_limb(), Limb::Left);
    }

    #[test]
    fn test_thrust_scales_force() {
        let mut gait = counting_gait(2.0);
        let command = gait.tick(1.0, true).unwrap();
        assert_eq!(command.get(Limb::Left), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(command.get(Limb::Right), Vector3::zeros());
    }

    #[test]
    fn test_dead_creature_is_released() {
        let mut gait = counting_gait(1.0);
        let command = gait.tick(0.01, false).unwrap();
        assert!(command.is_zero());
        // Cursor does not advance while dead
        assert_eq!(gait.next_limb(), Limb::Left);
    }
}
