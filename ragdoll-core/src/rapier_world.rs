//! `PhysicsWorld` backed by rapier2d. Units are screen pixels with y down.

use std::collections::HashMap;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::na::{Point2, Vector2};
use rapier2d::prelude::*;

use crate::error::WorldError;
use crate::world::{
    BodyId, BodyState, CollisionPair, Gravity, PartDesc, PhysicsWorld, PinJoint, Rect,
};

/// Spring constant used for a pin of stiffness 1 when it is built as a spring.
const SPRING_PER_STIFFNESS: Real = 4000.0;
const SPRING_DAMPING: Real = 40.0;

fn vec2_to_na(v: Vec2) -> Vector2<Real> {
    Vector2::new(v.x, v.y)
}

fn vec2_to_point(v: Vec2) -> Point2<Real> {
    Point2::new(v.x, v.y)
}

fn na_to_vec2(v: &Vector2<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Collects collision-start events during a step.
#[derive(Default)]
struct StartedCollisions {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl StartedCollisions {
    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        match self.started.lock() {
            Ok(mut v) => std::mem::take(&mut *v),
            Err(_) => Vec::new(),
        }
    }
}

impl EventHandler for StartedCollisions {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(h1, h2, _) = event
            && let Ok(mut v) = self.started.lock()
        {
            v.push((h1, h2));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

pub struct RapierWorld {
    gravity: Gravity,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    events: StartedCollisions,
    handles: HashMap<BodyId, RigidBodyHandle>,
    next_id: u64,
}

impl RapierWorld {
    pub fn new(gravity: Gravity) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // tolerances are tuned for metres; the world runs in pixels
        integration_parameters.length_unit = 100.0;
        RapierWorld {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            events: StartedCollisions::default(),
            handles: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    fn handle(&self, id: BodyId) -> Result<RigidBodyHandle, WorldError> {
        self.handles
            .get(&id)
            .copied()
            .ok_or(WorldError::UnknownBody(id))
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut RigidBody, WorldError> {
        let handle = self.handle(id)?;
        self.bodies
            .get_mut(handle)
            .ok_or(WorldError::UnknownBody(id))
    }

    fn insert(&mut self, builder: RigidBodyBuilder, collider: ColliderBuilder) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        let handle = self.bodies.insert(builder.user_data(id.0 as u128).build());
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);
        self.handles.insert(id, handle);
        id
    }

    fn collider_to_body(&self, handle: ColliderHandle) -> Option<BodyId> {
        let collider = self.colliders.get(handle)?;
        let body = self.bodies.get(collider.parent()?)?;
        Some(BodyId(body.user_data as u64))
    }
}

fn check_rect(rect: &Rect) -> Result<(), WorldError> {
    let ok = rect.size.is_finite() && rect.size.min_element() > 0.0 && rect.center.is_finite();
    if ok {
        Ok(())
    } else {
        Err(WorldError::InvalidShape(format!(
            "rect at {} of size {}",
            rect.center, rect.size
        )))
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_part(&mut self, desc: &PartDesc) -> Result<BodyId, WorldError> {
        check_rect(&desc.rect)?;
        let half = desc.rect.half_extents();
        let body = RigidBodyBuilder::dynamic()
            .translation(vec2_to_na(desc.rect.center))
            .ccd_enabled(true);
        let collider = ColliderBuilder::cuboid(half.x, half.y)
            .density(desc.density)
            .friction(desc.friction)
            .restitution(desc.restitution);
        Ok(self.insert(body, collider))
    }

    fn add_static_rect(&mut self, rect: &Rect) -> Result<BodyId, WorldError> {
        check_rect(rect)?;
        let half = rect.half_extents();
        let body = RigidBodyBuilder::fixed().translation(vec2_to_na(rect.center));
        let collider =
            ColliderBuilder::cuboid(half.x, half.y).active_events(ActiveEvents::COLLISION_EVENTS);
        Ok(self.insert(body, collider))
    }

    fn remove_body(&mut self, id: BodyId) -> Result<(), WorldError> {
        let Some(handle) = self.handles.remove(&id) else {
            return Ok(());
        };
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        Ok(())
    }

    fn contains(&self, id: BodyId) -> bool {
        self.handles.contains_key(&id)
    }

    fn add_pin_joint(&mut self, joint: &PinJoint) -> Result<(), WorldError> {
        let a = self.handle(joint.body_a)?;
        let b = self.handle(joint.body_b)?;
        let anchor_a = vec2_to_point(joint.anchor_a);
        let anchor_b = vec2_to_point(joint.anchor_b);
        if joint.stiffness >= 1.0 {
            let pin = RevoluteJointBuilder::new()
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .contacts_enabled(false)
                .build();
            self.impulse_joints.insert(a, b, pin, true);
        } else {
            let mut spring: GenericJoint = SpringJointBuilder::new(
                0.0,
                joint.stiffness.max(0.0) * SPRING_PER_STIFFNESS,
                SPRING_DAMPING,
            )
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .build()
            .into();
            spring.set_contacts_enabled(false);
            self.impulse_joints.insert(a, b, spring, true);
        }
        Ok(())
    }

    fn body_state(&self, id: BodyId) -> Result<BodyState, WorldError> {
        let rb = self
            .bodies
            .get(self.handle(id)?)
            .ok_or(WorldError::UnknownBody(id))?;
        Ok(BodyState {
            position: na_to_vec2(rb.translation()),
            angle: rb.rotation().angle(),
            linvel: na_to_vec2(rb.linvel()),
            angvel: rb.angvel(),
            mass: rb.mass(),
            is_static: !rb.is_dynamic(),
        })
    }

    fn set_linear_velocity(&mut self, id: BodyId, linvel: Vec2) -> Result<(), WorldError> {
        if !linvel.is_finite() {
            return Err(WorldError::Engine(format!("non-finite velocity {linvel}")));
        }
        self.body_mut(id)?.set_linvel(vec2_to_na(linvel), true);
        Ok(())
    }

    fn set_angular_velocity(&mut self, id: BodyId, angvel: f32) -> Result<(), WorldError> {
        if !angvel.is_finite() {
            return Err(WorldError::Engine(format!("non-finite angular velocity {angvel}")));
        }
        self.body_mut(id)?.set_angvel(angvel, true);
        Ok(())
    }

    fn apply_force_at_point(
        &mut self,
        id: BodyId,
        force: Vec2,
        point: Vec2,
    ) -> Result<(), WorldError> {
        if !force.is_finite() {
            return Err(WorldError::Engine(format!("non-finite force {force}")));
        }
        self.body_mut(id)?
            .add_force_at_point(vec2_to_na(force), vec2_to_point(point), true);
        Ok(())
    }

    fn gravity(&self) -> Gravity {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Gravity) {
        self.gravity = gravity;
    }

    fn step(&mut self, dt: f32, events: &mut Vec<CollisionPair>) {
        self.integration_parameters.dt = dt;
        let gravity = vec2_to_na(self.gravity.acceleration());
        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &self.events,
        );

        // user forces persist in rapier until cleared
        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
        }

        for (h1, h2) in self.events.drain() {
            if let (Some(a), Some(b)) = (self.collider_to_body(h1), self.collider_to_body(h2)) {
                events.push(CollisionPair { a, b });
            }
        }
    }
}
