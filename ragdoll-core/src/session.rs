//! Fixed-step driver tying a world, the doll and the controller together.

use glam::Vec2;
use serde::Serialize;

use crate::boundary::Edge;
use crate::config::RagdollConfig;
use crate::controller::{BoundaryController, SessionStatus, StepHooks};
use crate::drag::DragController;
use crate::error::Result;
use crate::ragdoll::{PartKind, Ragdoll, RagdollOptions};
use crate::viewport::Viewport;
use crate::world::{CollisionPair, PhysicsWorld, Rect};

/// Accumulates frame time and hands out whole fixed steps.
#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f64,
    max_substeps: u32,
    accumulator: f64,
    last_ms: Option<f64>,
}

impl FixedStep {
    pub fn new(hz: f32, max_substeps: u32) -> Self {
        FixedStep {
            dt: 1.0 / hz as f64,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            last_ms: None,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt as f32
    }

    /// Feed an animation-frame timestamp (ms). Returns how many steps to run.
    /// The first timestamp only primes the clock. Time beyond `max_substeps`
    /// steps is dropped so a stalled tab does not fast-forward.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };
        self.accumulator += ((now_ms - last) / 1000.0).max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_substeps {
            self.accumulator -= self.dt;
            steps += 1;
        }
        if steps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.dt);
        }
        steps
    }
}

/// Drawing data for one part.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PartPose {
    pub kind: PartKind,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub width: f32,
    pub height: f32,
}

/// The whole interactive toy.
pub struct Playground<W: PhysicsWorld> {
    world: W,
    ragdoll: Ragdoll,
    controller: BoundaryController,
    drag: DragController,
    clock: FixedStep,
    pending: Vec<CollisionPair>,
    ticks: u64,
}

impl<W: PhysicsWorld> Playground<W> {
    /// Assembles the doll at the viewport centre and starts in Partial mode.
    pub fn new(mut world: W, config: &RagdollConfig, width: f32, height: f32) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(width, height);
        world.set_gravity(config.gravity);
        let ragdoll = Ragdoll::assemble(
            &mut world,
            viewport.center(),
            &RagdollOptions {
                scale: config.doll_scale,
                density: config.part_density,
                friction: config.part_friction,
                restitution: config.part_restitution,
                ..RagdollOptions::default()
            },
        )?;
        let controller =
            BoundaryController::start(&mut world, viewport, config, ragdoll.trackable())?;
        Ok(Playground {
            world,
            ragdoll,
            controller,
            drag: DragController::new(config.drag_stiffness, config.drag_speed_limit()),
            clock: FixedStep::new(config.timestep_hz, config.max_substeps),
            pending: Vec::new(),
            ticks: 0,
        })
    }

    /// One simulation tick: collisions from the last step, pre-step hooks,
    /// then integration.
    pub fn tick(&mut self) {
        let pairs = std::mem::take(&mut self.pending);
        if !pairs.is_empty() {
            self.controller.on_collision(&mut self.world, &pairs);
        }
        self.drag.apply(&mut self.world, self.clock.dt());
        self.controller.on_before_step(&mut self.world);
        self.world.step(self.clock.dt(), &mut self.pending);
        self.ticks += 1;
    }

    /// Runs as many ticks as the elapsed frame time allows.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let steps = self.clock.advance(now_ms);
        for _ in 0..steps {
            self.tick();
        }
        steps
    }

    /// Applies a viewport change. Call between ticks only.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.controller.on_resize(&mut self.world, width, height);
    }

    pub fn press(&mut self, point: Vec2) -> bool {
        match self.drag.press(&self.world, self.ragdoll.parts(), point) {
            Ok(hit) => hit,
            Err(e) => {
                log::debug!("press ignored: {e}");
                false
            }
        }
    }

    pub fn drag_to(&mut self, point: Vec2) {
        self.drag.move_to(point);
    }

    pub fn release(&mut self) {
        self.drag.release();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.grabbed().is_some()
    }

    pub fn status(&self) -> SessionStatus {
        self.controller.status()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn viewport(&self) -> &Viewport {
        self.controller.viewport()
    }

    pub fn ragdoll(&self) -> &Ragdoll {
        &self.ragdoll
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Poses of the parts that could be read this frame.
    pub fn part_poses(&self) -> Vec<PartPose> {
        self.ragdoll
            .parts()
            .iter()
            .filter_map(|p| {
                let s = self.world.body_state(p.body).ok()?;
                Some(PartPose {
                    kind: p.kind,
                    x: s.position.x,
                    y: s.position.y,
                    angle: s.angle,
                    width: p.size.x,
                    height: p.size.y,
                })
            })
            .collect()
    }

    pub fn walls(&self) -> &[(Edge, Rect)] {
        self.controller.boundaries().rects()
    }
}
