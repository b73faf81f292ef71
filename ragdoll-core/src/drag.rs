//! Pointer drag constraint.
//!
//! Pressing on a part grabs it at the clicked point. While held, every
//! pre-step sets the part's velocity so the grab point closes `stiffness` of
//! the remaining distance to the pointer per step.

use glam::Vec2;
use parry2d::na::{Isometry2, Point2, Vector2};
use parry2d::query::PointQuery;
use parry2d::shape::Cuboid;

use crate::error::WorldError;
use crate::ragdoll::RagdollPart;
use crate::world::{BodyId, PhysicsWorld, rotate};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Grab {
    body: BodyId,
    local_anchor: Vec2,
}

#[derive(Debug)]
pub struct DragController {
    stiffness: f32,
    max_speed: f32,
    grab: Option<Grab>,
    target: Vec2,
}

impl DragController {
    pub fn new(stiffness: f32, max_speed: f32) -> Self {
        DragController {
            stiffness: stiffness.clamp(0.0, 1.0),
            max_speed,
            grab: None,
            target: Vec2::ZERO,
        }
    }

    pub fn grabbed(&self) -> Option<BodyId> {
        self.grab.map(|g| g.body)
    }

    /// Topmost part under `point`. Later parts are drawn on top, so the
    /// search runs back to front.
    pub fn pick<W: PhysicsWorld>(world: &W, parts: &[RagdollPart], point: Vec2) -> Option<BodyId> {
        let p = Point2::new(point.x, point.y);
        parts.iter().rev().find_map(|part| {
            let state = world.body_state(part.body).ok()?;
            let half = part.size * 0.5;
            let shape = Cuboid::new(Vector2::new(half.x, half.y));
            let iso = Isometry2::new(Vector2::new(state.position.x, state.position.y), state.angle);
            shape.contains_point(&iso, &p).then_some(part.body)
        })
    }

    /// Starts a drag if `point` hits a part. Returns whether something was grabbed.
    pub fn press<W: PhysicsWorld>(
        &mut self,
        world: &W,
        parts: &[RagdollPart],
        point: Vec2,
    ) -> Result<bool, WorldError> {
        let Some(body) = Self::pick(world, parts, point) else {
            return Ok(false);
        };
        let state = world.body_state(body)?;
        let local_anchor = rotate(point - state.position, -state.angle);
        self.grab = Some(Grab { body, local_anchor });
        self.target = point;
        log::debug!("grabbed {body:?}");
        Ok(true)
    }

    pub fn move_to(&mut self, point: Vec2) {
        self.target = point;
    }

    pub fn release(&mut self) {
        if let Some(g) = self.grab.take() {
            log::debug!("released {:?}", g.body);
        }
    }

    /// Pulls the grabbed part toward the pointer. A part that vanished from
    /// the world ends the drag.
    pub fn apply<W: PhysicsWorld>(&mut self, world: &mut W, dt: f32) {
        let Some(grab) = self.grab else {
            return;
        };
        match self.pull(world, grab, dt) {
            Ok(()) => {}
            Err(WorldError::UnknownBody(id)) => {
                log::debug!("drag target {id:?} is gone");
                self.grab = None;
            }
            Err(e) => log::debug!("drag skipped this step: {e}"),
        }
    }

    fn pull<W: PhysicsWorld>(&self, world: &mut W, grab: Grab, dt: f32) -> Result<(), WorldError> {
        let state = world.body_state(grab.body)?;
        let anchor = state.position + rotate(grab.local_anchor, state.angle);
        let mut linvel = (self.target - anchor) * self.stiffness / dt;
        let speed = linvel.length();
        if speed > self.max_speed {
            linvel *= self.max_speed / speed;
        }
        world.set_linear_velocity(grab.body, linvel)?;
        // let the joints carry the rotation instead of spinning the grabbed part
        world.set_angular_velocity(grab.body, state.angvel * 0.5)
    }
}
