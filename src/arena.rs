//! Headless point-mass arena.
//!
//! A stand-in [`Habitat`] so the loop can run without an engine. Each
//! creature is a single body: a firing limb gives it an impulse, gravity
//! pulls it back to the ground plane, and every landing is a ground contact
//! worth the step reward. Landing harder than `crash_speed` counts as a fall
//! and kills the creature.

use crate::config::{ArenaConfig, Config};
use crate::creature::{CreatureId, CreatureState};
use crate::gait::LimbForces;
use crate::genetics::Genome;
use crate::habitat::Habitat;
use nalgebra::Vector3;
use rayon::prelude::*;

#[derive(Clone, Debug)]
struct Body {
    id: CreatureId,
    position: Vector3<f32>,
    velocity: Vector3<f32>,
    target: Vector3<f32>,
    alive: bool,
    step_reward: f32,
    grounded: bool,
    impulse: Vector3<f32>,
}

impl Body {
    fn state(&self) -> CreatureState {
        CreatureState {
            position: self.position,
            target: self.target,
            alive: self.alive,
            step_reward: self.step_reward,
        }
    }

    fn integrate(&mut self, dt: f32, params: &ArenaConfig, reward: f32) {
        if self.alive {
            self.velocity += self.impulse / params.body_mass;
        }
        self.impulse = Vector3::zeros();

        self.velocity.y -= params.gravity * dt;
        self.position += self.velocity * dt;

        if self.position.y <= 0.0 {
            let impact = -self.velocity.y;
            let landed = !self.grounded;
            self.position.y = 0.0;
            self.velocity.y = 0.0;
            self.grounded = true;

            if landed {
                if impact > params.crash_speed {
                    self.alive = false;
                } else if self.alive {
                    self.step_reward += reward;
                }
            }
        } else {
            self.grounded = false;
        }

        if self.grounded {
            let keep = (1.0 - params.ground_friction * dt).max(0.0);
            self.velocity.x *= keep;
            self.velocity.z *= keep;
        }
    }
}

/// Point-mass habitat
pub struct Arena {
    params: ArenaConfig,
    step_reward: f32,
    bodies: Vec<Body>,
    next_id: u64,
    highlighted: Option<CreatureId>,
}

impl Arena {
    pub fn new(params: ArenaConfig, step_reward: f32) -> Self {
        Self {
            params,
            step_reward,
            bodies: Vec::new(),
            next_id: 0,
            highlighted: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.arena.clone(), config.simulation.step_reward)
    }

    /// Live instance count
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Creature currently carrying the highlight
    pub fn highlighted(&self) -> Option<CreatureId> {
        self.highlighted
    }

    fn body_mut(&mut self, id: CreatureId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }
}

impl Habitat for Arena {
    fn spawn(
        &mut self,
        _genome: &Genome,
        start: Vector3<f32>,
        target: Vector3<f32>,
    ) -> (CreatureId, CreatureState) {
        let id = CreatureId(self.next_id);
        self.next_id += 1;

        let body = Body {
            id,
            position: start,
            velocity: Vector3::zeros(),
            target,
            alive: true,
            step_reward: 0.0,
            grounded: start.y <= 0.0,
            impulse: Vector3::zeros(),
        };
        let state = body.state();
        self.bodies.push(body);
        (id, state)
    }

    fn observe(&self, id: CreatureId) -> Option<CreatureState> {
        self.bodies.iter().find(|b| b.id == id).map(Body::state)
    }

    fn actuate(&mut self, id: CreatureId, forces: &LimbForces) {
        if let Some(body) = self.body_mut(id) {
            body.impulse += forces.total();
        }
    }

    fn step(&mut self, dt: f32) {
        let params = &self.params;
        let reward = self.step_reward;
        self.bodies
            .par_iter_mut()
            .for_each(|body| body.integrate(dt, params, reward));
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.highlighted = None;
    }

    fn highlight(&mut self, id: CreatureId, on: bool) {
        if on {
            self.highlighted = Some(id);
        } else if self.highlighted == Some(id) {
            self.highlighted = None;
        }
    }
}
