//! Session state owner: wires the landing detector, boundary manager and
//! repositioning controller into the three simulation hooks.

use serde::Serialize;

use crate::boundary::{BoundaryManager, BoundaryMode};
use crate::config::RagdollConfig;
use crate::error::WorldError;
use crate::landing::{GravityState, LandingDetector, LandingState};
use crate::reposition::{RepositionController, RepositionTuning};
use crate::viewport::Viewport;
use crate::world::{BodyId, CollisionPair, PhysicsWorld};

/// Callbacks invoked by the fixed-step runner. Per tick the order is
/// `on_collision` (pairs from the previous integration), `on_before_step`,
/// then the integration itself. `on_resize` only runs between ticks.
pub trait StepHooks<W: PhysicsWorld> {
    fn on_collision(&mut self, world: &mut W, pairs: &[CollisionPair]);
    fn on_before_step(&mut self, world: &mut W);
    fn on_resize(&mut self, world: &mut W, width: f32, height: f32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub mode: BoundaryMode,
    pub gravity: GravityState,
    pub landing: LandingState,
    pub walls: usize,
}

#[derive(Debug)]
pub struct BoundaryController {
    viewport: Viewport,
    boundaries: BoundaryManager,
    landing: LandingDetector,
    reposition: RepositionController,
    parts: Vec<BodyId>,
}

impl BoundaryController {
    /// Starts a session in Partial mode with gravity taken from the world.
    pub fn start<W: PhysicsWorld>(
        world: &mut W,
        viewport: Viewport,
        config: &RagdollConfig,
        parts: Vec<BodyId>,
    ) -> Result<Self, WorldError> {
        let mut boundaries = BoundaryManager::new(config.wall_thickness);
        boundaries.set_mode(world, &viewport, BoundaryMode::Partial)?;
        Ok(BoundaryController {
            viewport,
            boundaries,
            landing: LandingDetector::new(),
            reposition: RepositionController::new(RepositionTuning {
                edge_margin: config.edge_margin,
                force_base: config.restore_force_base,
                velocity_damp: config.restore_velocity_damp,
            }),
            parts,
        })
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            mode: self.boundaries.mode(),
            gravity: self.landing.gravity(),
            landing: self.landing.state(),
            walls: self.boundaries.set().len(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn boundaries(&self) -> &BoundaryManager {
        &self.boundaries
    }

    pub fn parts(&self) -> &[BodyId] {
        &self.parts
    }
}

impl<W: PhysicsWorld> StepHooks<W> for BoundaryController {
    fn on_collision(&mut self, world: &mut W, pairs: &[CollisionPair]) {
        let result = self.landing.on_collision(
            world,
            pairs,
            &mut self.boundaries,
            &self.viewport,
            &self.parts,
        );
        if let Err(e) = result {
            log::error!("enabling full boundaries failed: {e}");
        }
    }

    fn on_before_step(&mut self, world: &mut W) {
        self.reposition
            .apply(world, self.boundaries.mode(), &self.viewport, &self.parts);
    }

    fn on_resize(&mut self, world: &mut W, width: f32, height: f32) {
        self.viewport.resize(width, height);
        let mode = self.boundaries.mode();
        log::info!(
            "viewport resized to {}x{}, rebuilding {mode:?} walls",
            self.viewport.width,
            self.viewport.height
        );
        if let Err(e) = self.boundaries.set_mode(world, &self.viewport, mode) {
            log::error!("rebuilding walls after resize failed: {e}");
        }
    }
}
