//! The player's paper glider
//!
//! Physical properties come from the upgrade levels at spawn time. Held
//! controls and passive lift are applied as forces before the next physics
//! step consumes them.

use std::collections::VecDeque;

use glam::Vec2;

use super::physics::{BodyDesc, BodyHandle, BodyState, PhysicsEngine, Shape};
use super::state::Controls;
use crate::consts::*;
use crate::progression::Upgrades;
use crate::{heading, normalize_angle};

/// Below this speed the glider ignores controls
const CONTROL_MIN_SPEED: f32 = 0.3;
/// Passive lift needs at least this much forward speed
const PASSIVE_LIFT_MIN_SPEED: f32 = 2.0;
const TRAIL_MIN_SPEED: f32 = 1.0;
const TRAIL_FADE: f32 = 0.02;
/// Fraction of the heading error corrected per tick
const ROTATION_EASING: f32 = 0.12;

const PITCH_DOWN_FORCE: Vec2 = Vec2::new(0.0003, 0.0006);
const BOOST_THRUST: f32 = 0.004;
const BOOST_BURN: f32 = 0.8;
const FUEL_PER_LEVEL: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// 1.0 fresh, fades to 0
    pub life: f32,
}

#[derive(Debug, Clone)]
pub struct Player {
    body: BodyHandle,
    aero: f32,
    lift_coef: f32,
    boost_fuel: f32,
    max_boost_fuel: f32,
    is_boosting: bool,
    trail: VecDeque<TrailPoint>,
}

impl Player {
    /// Physical description of a glider built with `upgrades`
    pub fn body_desc(position: Vec2, upgrades: &Upgrades) -> BodyDesc {
        let weight = upgrades.weight.max(1) as f32;
        let aero = upgrades.aero.max(1) as f32;
        BodyDesc {
            shape: Shape::Trapezoid {
                width: PLAYER_WIDTH,
                height: PLAYER_HEIGHT,
                slope: PLAYER_SLOPE,
            },
            position,
            is_static: false,
            density: 0.0015 / (weight * 0.8),
            friction: 0.01,
            friction_air: 0.012 / (aero * 0.7),
            restitution: 0.15,
        }
    }

    /// Create the glider body at `position`
    pub fn spawn(physics: &mut dyn PhysicsEngine, position: Vec2, upgrades: &Upgrades) -> Self {
        let body = physics.create_body(&Self::body_desc(position, upgrades));
        let aero = upgrades.aero.max(1) as f32;
        let fuel = upgrades.fuel as f32 * FUEL_PER_LEVEL;
        Self {
            body,
            aero,
            lift_coef: 0.00015 * aero,
            boost_fuel: fuel,
            max_boost_fuel: fuel,
            is_boosting: false,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    pub fn despawn(self, physics: &mut dyn PhysicsEngine) {
        physics.remove_body(self.body);
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn state(&self, physics: &dyn PhysicsEngine) -> Option<BodyState> {
        physics.body(self.body)
    }

    /// Apply forces for the held controls
    pub fn apply_controls(&mut self, controls: &Controls, physics: &mut dyn PhysicsEngine) {
        self.is_boosting = false;
        let Some(state) = physics.body(self.body) else {
            return;
        };
        let speed = state.speed();
        if speed < CONTROL_MIN_SPEED {
            return;
        }

        if controls.pitch_up {
            let lift = speed * self.lift_coef * self.aero;
            physics.apply_force(self.body, state.position, Vec2::new(0.0, -lift));
        }
        if controls.pitch_down {
            physics.apply_force(self.body, state.position, PITCH_DOWN_FORCE);
        }
        if controls.boost && self.boost_fuel > 0.0 {
            self.is_boosting = true;
            self.boost_fuel = (self.boost_fuel - BOOST_BURN).max(0.0);
            physics.apply_force(self.body, state.position, heading(state.angle) * BOOST_THRUST);
        }
    }

    /// Passive lift, nose-into-wind rotation and trail upkeep
    pub fn update(&mut self, physics: &mut dyn PhysicsEngine) {
        let Some(state) = physics.body(self.body) else {
            return;
        };
        let speed = state.speed();

        if speed > PASSIVE_LIFT_MIN_SPEED && state.velocity.x > 0.0 {
            let lift = speed * self.lift_coef * 0.5;
            physics.apply_force(self.body, state.position, Vec2::new(0.0, -lift));
        }

        let target = state.velocity.y.atan2(state.velocity.x);
        let diff = normalize_angle(target - state.angle);
        let angle = state.angle + diff * ROTATION_EASING;
        physics.set_angle(self.body, angle);

        if speed > TRAIL_MIN_SPEED {
            self.trail.push_back(TrailPoint {
                pos: state.position - heading(angle) * (PLAYER_WIDTH * 0.5),
                life: 1.0,
            });
        }
        for point in &mut self.trail {
            point.life -= TRAIL_FADE;
        }
        self.trail.retain(|p| p.life > 0.0);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    /// Top up boost fuel, capped at the tank size
    pub fn refill_fuel(&mut self, amount: f32) {
        self.boost_fuel = (self.boost_fuel + amount).min(self.max_boost_fuel);
    }

    pub fn boost_fuel(&self) -> f32 {
        self.boost_fuel
    }

    pub fn max_boost_fuel(&self) -> f32 {
        self.max_boost_fuel
    }

    /// Remaining fuel in [0, 1]; 0 with no tank
    pub fn fuel_fraction(&self) -> f32 {
        if self.max_boost_fuel > 0.0 {
            self.boost_fuel / self.max_boost_fuel
        } else {
            0.0
        }
    }

    pub fn is_boosting(&self) -> bool {
        self.is_boosting
    }

    pub fn trail(&self) -> impl Iterator<Item = &TrailPoint> {
        self.trail.iter()
    }
}
