//! In-memory `PhysicsWorld` used by the unit tests.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;

use crate::error::WorldError;
use crate::world::{
    BodyId, BodyState, CollisionPair, Gravity, PartDesc, PhysicsWorld, PinJoint, Rect,
};

#[derive(Clone, Debug)]
pub struct MockBody {
    pub state: BodyState,
    pub rect: Rect,
}

#[derive(Debug, Default)]
pub struct MockWorld {
    pub bodies: BTreeMap<BodyId, MockBody>,
    pub joints: Vec<PinJoint>,
    pub forces: Vec<(BodyId, Vec2, Vec2)>,
    pub gravity: Gravity,
    /// Bodies whose state reads and writes fail.
    pub faulty: HashSet<BodyId>,
    /// Pairs reported by the next call to `step`.
    pub scripted: Vec<CollisionPair>,
    /// Number of `add_static_rect` calls that succeed before the rest fail.
    pub static_budget: Option<usize>,
    next_id: u64,
}

impl MockWorld {
    pub fn new() -> Self {
        MockWorld::default()
    }

    pub fn body(&self, id: BodyId) -> &MockBody {
        &self.bodies[&id]
    }

    pub fn place(&mut self, id: BodyId, position: Vec2, linvel: Vec2) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.state.position = position;
            b.state.linvel = linvel;
        }
    }

    pub fn static_count(&self) -> usize {
        self.bodies.values().filter(|b| b.state.is_static).count()
    }

    fn insert(&mut self, rect: Rect, mass: f32, is_static: bool) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        self.bodies.insert(
            id,
            MockBody {
                state: BodyState {
                    position: rect.center,
                    angle: 0.0,
                    linvel: Vec2::ZERO,
                    angvel: 0.0,
                    mass,
                    is_static,
                },
                rect,
            },
        );
        id
    }

    fn live(&mut self, id: BodyId) -> Result<&mut MockBody, WorldError> {
        if self.faulty.contains(&id) {
            return Err(WorldError::Engine(format!("injected fault on {id:?}")));
        }
        self.bodies.get_mut(&id).ok_or(WorldError::UnknownBody(id))
    }
}

impl PhysicsWorld for MockWorld {
    fn add_part(&mut self, desc: &PartDesc) -> Result<BodyId, WorldError> {
        if desc.rect.size.min_element() <= 0.0 {
            return Err(WorldError::InvalidShape(format!("{:?}", desc.rect.size)));
        }
        let mass = desc.rect.size.x * desc.rect.size.y * desc.density;
        Ok(self.insert(desc.rect, mass, false))
    }

    fn add_static_rect(&mut self, rect: &Rect) -> Result<BodyId, WorldError> {
        if let Some(budget) = self.static_budget.as_mut() {
            if *budget == 0 {
                return Err(WorldError::Engine("static body budget exhausted".into()));
            }
            *budget -= 1;
        }
        Ok(self.insert(*rect, 0.0, true))
    }

    fn remove_body(&mut self, id: BodyId) -> Result<(), WorldError> {
        self.bodies.remove(&id);
        Ok(())
    }

    fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    fn add_pin_joint(&mut self, joint: &PinJoint) -> Result<(), WorldError> {
        for id in [joint.body_a, joint.body_b] {
            if !self.bodies.contains_key(&id) {
                return Err(WorldError::UnknownBody(id));
            }
        }
        self.joints.push(*joint);
        Ok(())
    }

    fn body_state(&self, id: BodyId) -> Result<BodyState, WorldError> {
        if self.faulty.contains(&id) {
            return Err(WorldError::Engine(format!("injected fault on {id:?}")));
        }
        self.bodies
            .get(&id)
            .map(|b| b.state)
            .ok_or(WorldError::UnknownBody(id))
    }

    fn set_linear_velocity(&mut self, id: BodyId, linvel: Vec2) -> Result<(), WorldError> {
        self.live(id)?.state.linvel = linvel;
        Ok(())
    }

    fn set_angular_velocity(&mut self, id: BodyId, angvel: f32) -> Result<(), WorldError> {
        self.live(id)?.state.angvel = angvel;
        Ok(())
    }

    fn apply_force_at_point(
        &mut self,
        id: BodyId,
        force: Vec2,
        point: Vec2,
    ) -> Result<(), WorldError> {
        self.live(id)?;
        self.forces.push((id, force, point));
        Ok(())
    }

    fn gravity(&self) -> Gravity {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Gravity) {
        self.gravity = gravity;
    }

    fn step(&mut self, dt: f32, events: &mut Vec<CollisionPair>) {
        let accel = self.gravity.acceleration();
        for body in self.bodies.values_mut() {
            if body.state.is_static {
                continue;
            }
            body.state.linvel += accel * dt;
            body.state.position += body.state.linvel * dt;
        }
        events.append(&mut self.scripted);
    }
}
