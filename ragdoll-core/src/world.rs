use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Opaque handle to a body living in a [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// Axis-aligned rectangle in screen space (px, y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Rect { center, size }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents()
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents()
    }
}

/// World gravity as a direction plus a scale; the integrated acceleration is
/// `(x, y) * scale` in px/s².
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Gravity {
    pub const ZERO: Gravity = Gravity {
        x: 0.0,
        y: 0.0,
        scale: 0.0,
    };

    pub fn acceleration(&self) -> Vec2 {
        Vec2::new(self.x, self.y) * self.scale
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity {
            x: 0.0,
            y: 1.0,
            scale: 980.0,
        }
    }
}

/// Snapshot of a body read back from the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub angle: f32,
    pub linvel: Vec2,
    pub angvel: f32,
    pub mass: f32,
    pub is_static: bool,
}

/// Description of a dynamic rectangular body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartDesc {
    pub rect: Rect,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Pin joint between two bodies at anchors given in each body's local frame.
/// A stiffness of 1 is rigid; lower values make the pin springy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinJoint {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
    pub stiffness: f32,
}

/// Two bodies that started touching during the last step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionPair {
    pub a: BodyId,
    pub b: BodyId,
}

impl CollisionPair {
    /// Returns the other member if `id` is part of the pair.
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// The slice of a 2D rigid-body engine the playground depends on.
pub trait PhysicsWorld {
    fn add_part(&mut self, desc: &PartDesc) -> Result<BodyId, WorldError>;

    /// Adds a fixed, invisible rectangle.
    fn add_static_rect(&mut self, rect: &Rect) -> Result<BodyId, WorldError>;

    /// Removes a body. Removing an id that is not in the world is a no-op.
    fn remove_body(&mut self, id: BodyId) -> Result<(), WorldError>;

    fn contains(&self, id: BodyId) -> bool;

    fn add_pin_joint(&mut self, joint: &PinJoint) -> Result<(), WorldError>;

    fn body_state(&self, id: BodyId) -> Result<BodyState, WorldError>;

    fn set_linear_velocity(&mut self, id: BodyId, linvel: Vec2) -> Result<(), WorldError>;

    fn set_angular_velocity(&mut self, id: BodyId, angvel: f32) -> Result<(), WorldError>;

    /// Applies `force` at world `point` for the next step only.
    fn apply_force_at_point(
        &mut self,
        id: BodyId,
        force: Vec2,
        point: Vec2,
    ) -> Result<(), WorldError>;

    fn gravity(&self) -> Gravity;

    fn set_gravity(&mut self, gravity: Gravity);

    /// Integrates one step of `dt` seconds and appends the collision-start
    /// pairs observed during it.
    fn step(&mut self, dt: f32, events: &mut Vec<CollisionPair>);
}

/// Rotates a local-frame vector by `angle` radians.
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
