//! Rigid-body physics capability
//!
//! The flight session only needs a handful of operations from a physics
//! engine, collected in [`PhysicsEngine`]. [`SimplePhysics`] implements them
//! with Matter-compatible units: velocities are displacements per 1/60 s
//! reference step and forces are in Matter's force units, so the tuning
//! numbers feel the same as on the classic web engine.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::consts::{BASE_DELTA_MS, GRAVITY, GRAVITY_SCALE};

/// Opaque handle to a body owned by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(u32);

/// Collision shape (axis-aligned extents are used for contacts)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { width: f32, height: f32 },
    /// Matter-style trapezoid: `slope` narrows the top edge
    Trapezoid { width: f32, height: f32, slope: f32 },
}

impl Shape {
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Rect { width, height } | Shape::Trapezoid { width, height, .. } => {
                Vec2::new(width, height) * 0.5
            }
        }
    }

    pub fn area(&self) -> f32 {
        match *self {
            Shape::Rect { width, height } => width * height,
            Shape::Trapezoid { width, height, slope } => {
                let roof = (1.0 - slope) * width;
                (width + roof) * 0.5 * height
            }
        }
    }

    /// Vertices in local space, clockwise from top-left (y down)
    fn local_vertices(&self) -> Vec<Vec2> {
        match *self {
            Shape::Rect { width, height } => {
                let h = Vec2::new(width, height) * 0.5;
                vec![
                    Vec2::new(-h.x, -h.y),
                    Vec2::new(h.x, -h.y),
                    Vec2::new(h.x, h.y),
                    Vec2::new(-h.x, h.y),
                ]
            }
            Shape::Trapezoid { width, height, slope } => {
                let roof = (1.0 - slope) * width * 0.5;
                let hw = width * 0.5;
                let hh = height * 0.5;
                vec![
                    Vec2::new(-roof, -hh),
                    Vec2::new(roof, -hh),
                    Vec2::new(hw, hh),
                    Vec2::new(-hw, hh),
                ]
            }
        }
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub shape: Shape,
    pub position: Vec2,
    pub is_static: bool,
    pub density: f32,
    pub friction: f32,
    pub friction_air: f32,
    pub restitution: f32,
}

impl BodyDesc {
    /// A static rectangle (terrain)
    pub fn static_rect(center: Vec2, width: f32, height: f32, friction: f32) -> Self {
        Self {
            shape: Shape::Rect { width, height },
            position: center,
            is_static: true,
            density: 0.0,
            friction,
            friction_air: 0.0,
            restitution: 0.0,
        }
    }
}

/// Snapshot of a body's kinematic state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
}

impl BodyState {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// The physics operations the game consumes
pub trait PhysicsEngine {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle);
    /// Accumulate a force for the next step (Matter force units)
    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2);
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    fn set_angle(&mut self, handle: BodyHandle, angle: f32);
    /// Advance the simulation by `dt_ms` milliseconds
    fn step(&mut self, dt_ms: f32);
    fn body(&self, handle: BodyHandle) -> Option<BodyState>;
    /// World-space outline
    fn vertices(&self, handle: BodyHandle) -> Vec<Vec2>;
    fn body_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Body {
    desc: BodyDesc,
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    mass: f32,
    force: Vec2,
}

impl Body {
    fn half_extents(&self) -> Vec2 {
        self.desc.shape.half_extents()
    }
}

/// Small Verlet-style integrator with AABB contacts against static bodies
#[derive(Debug, Clone, Default)]
pub struct SimplePhysics {
    /// Ordered by handle for deterministic iteration
    bodies: BTreeMap<BodyHandle, Body>,
    next_id: u32,
}

impl SimplePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `body` out of `ground` along the axis of least penetration
    fn resolve_contact(body: &mut Body, ground: &Body) {
        let half = body.half_extents() + ground.half_extents();
        let delta = body.position - ground.position;
        let overlap = half - delta.abs();
        if overlap.x <= 0.0 || overlap.y <= 0.0 {
            return;
        }

        let friction = body.desc.friction.min(ground.desc.friction);
        let restitution = body.desc.restitution;

        if overlap.y < overlap.x {
            let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
            body.position.y += sign * overlap.y;
            if body.velocity.y * sign < 0.0 {
                body.velocity.y = -body.velocity.y * restitution;
                body.velocity.x *= 1.0 - friction;
            }
        } else {
            let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
            body.position.x += sign * overlap.x;
            if body.velocity.x * sign < 0.0 {
                body.velocity.x = -body.velocity.x * restitution;
                body.velocity.y *= 1.0 - friction;
            }
        }
    }
}

impl PhysicsEngine for SimplePhysics {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        let mass = if desc.is_static {
            f32::INFINITY
        } else {
            (desc.density * desc.shape.area()).max(f32::EPSILON)
        };
        self.bodies.insert(
            handle,
            Body {
                desc: *desc,
                position: desc.position,
                velocity: Vec2::ZERO,
                angle: 0.0,
                mass,
                force: Vec2::ZERO,
            },
        );
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn apply_force(&mut self, handle: BodyHandle, _point: Vec2, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            if !body.desc.is_static {
                body.force += force;
            }
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity = velocity;
        }
    }

    fn set_angle(&mut self, handle: BodyHandle, angle: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.angle = angle;
        }
    }

    fn step(&mut self, dt_ms: f32) {
        if dt_ms <= 0.0 {
            return;
        }
        let scale = dt_ms / BASE_DELTA_MS;
        let accel_scale = BASE_DELTA_MS * BASE_DELTA_MS * scale;
        let gravity = GRAVITY * GRAVITY_SCALE;

        let statics: Vec<Body> = self
            .bodies
            .values()
            .filter(|b| b.desc.is_static)
            .cloned()
            .collect();

        for body in self.bodies.values_mut().filter(|b| !b.desc.is_static) {
            let damping = (1.0 - body.desc.friction_air * scale).max(0.0);
            body.velocity =
                body.velocity * damping + (body.force / body.mass + gravity) * accel_scale;
            body.position += body.velocity * scale;
            body.force = Vec2::ZERO;

            for ground in &statics {
                Self::resolve_contact(body, ground);
            }
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<BodyState> {
        self.bodies.get(&handle).map(|b| BodyState {
            position: b.position,
            velocity: b.velocity,
            angle: b.angle,
        })
    }

    fn vertices(&self, handle: BodyHandle) -> Vec<Vec2> {
        let Some(body) = self.bodies.get(&handle) else {
            return Vec::new();
        };
        let rotation = Vec2::from_angle(body.angle);
        body.desc
            .shape
            .local_vertices()
            .into_iter()
            .map(|v| body.position + rotation.rotate(v))
            .collect()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glider_at(pos: Vec2) -> BodyDesc {
        BodyDesc {
            shape: Shape::Trapezoid {
                width: 50.0,
                height: 25.0,
                slope: 0.3,
            },
            position: pos,
            is_static: false,
            density: 0.0015,
            friction: 0.01,
            friction_air: 0.0,
            restitution: 0.15,
        }
    }

    #[test]
    fn test_gravity_accelerates_downward() {
        let mut physics = SimplePhysics::new();
        let body = physics.create_body(&glider_at(Vec2::ZERO));
        physics.step(BASE_DELTA_MS);
        let state = physics.body(body).unwrap();
        // g * scale * dt² = 0.35 * 0.001 * 277.8
        assert!((state.velocity.y - 0.0972).abs() < 1e-3);
        assert!(state.position.y > 0.0);
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn test_force_is_consumed_by_one_step() {
        let mut physics = SimplePhysics::new();
        let body = physics.create_body(&glider_at(Vec2::ZERO));
        physics.apply_force(body, Vec2::ZERO, Vec2::new(0.01, 0.0));
        physics.step(BASE_DELTA_MS);
        let vx1 = physics.body(body).unwrap().velocity.x;
        assert!(vx1 > 0.0);
        physics.step(BASE_DELTA_MS);
        let vx2 = physics.body(body).unwrap().velocity.x;
        assert!((vx2 - vx1).abs() < 1e-6);
    }

    #[test]
    fn test_body_rests_on_static_ground() {
        let mut physics = SimplePhysics::new();
        physics.create_body(&BodyDesc::static_rect(
            Vec2::new(0.0, 100.0),
            400.0,
            100.0,
            0.8,
        ));
        let body = physics.create_body(&glider_at(Vec2::new(0.0, 30.0)));
        for _ in 0..600 {
            physics.step(BASE_DELTA_MS);
        }
        let state = physics.body(body).unwrap();
        // Ground top is y = 50, glider half height 12.5
        assert!((state.position.y - 37.5).abs() < 0.5, "y = {}", state.position.y);
        assert!(state.speed() < 0.2);
    }

    #[test]
    fn test_air_friction_slows_body() {
        let mut physics = SimplePhysics::new();
        let mut desc = glider_at(Vec2::ZERO);
        desc.friction_air = 0.05;
        let body = physics.create_body(&desc);
        physics.set_velocity(body, Vec2::new(10.0, 0.0));
        physics.step(BASE_DELTA_MS);
        assert!((physics.body(body).unwrap().velocity.x - 9.5).abs() < 1e-4);
    }

    #[test]
    fn test_remove_and_vertices() {
        let mut physics = SimplePhysics::new();
        let ground = physics.create_body(&BodyDesc::static_rect(Vec2::ZERO, 10.0, 4.0, 0.5));
        let verts = physics.vertices(ground);
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0], Vec2::new(-5.0, -2.0));
        assert_eq!(physics.body_count(), 1);

        physics.remove_body(ground);
        assert_eq!(physics.body_count(), 0);
        assert!(physics.body(ground).is_none());
        assert!(physics.vertices(ground).is_empty());
    }

    #[test]
    fn test_trapezoid_area_matches_matter() {
        let shape = Shape::Trapezoid {
            width: 50.0,
            height: 25.0,
            slope: 0.3,
        };
        // Roof is 70% of the base: (50 + 35) / 2 * 25
        assert!((shape.area() - 1062.5).abs() < 1e-3);
    }
}
