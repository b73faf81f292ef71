//! Soft edge repositioning: parts that drift into the margin along a screen
//! edge get a spring-like push back toward the interior.

use glam::Vec2;

use crate::boundary::BoundaryMode;
use crate::error::WorldError;
use crate::viewport::Viewport;
use crate::world::{BodyId, PhysicsWorld};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepositionTuning {
    pub edge_margin: f32,
    pub force_base: f32,
    pub velocity_damp: f32,
}

/// Per-unit-mass restoring force for a point at `position`, and whether the
/// point lies outside any margin.
///
/// Each violated edge contributes `force_base * distance` on its own axis.
/// Opposite edges are summed as-is, so they can cancel when the viewport is
/// narrower than two margins.
pub fn restoring_force(
    position: Vec2,
    viewport: &Viewport,
    tuning: &RepositionTuning,
) -> (Vec2, bool) {
    let m = tuning.edge_margin;
    let left = m - position.x;
    let right = (viewport.width - m) - position.x;
    let top = m - position.y;
    let bottom = (viewport.height - m) - position.y;

    let mut force = Vec2::ZERO;
    let mut outside = false;
    if left > 0.0 {
        force.x += tuning.force_base * left;
        outside = true;
    }
    if right < 0.0 {
        force.x += tuning.force_base * right;
        outside = true;
    }
    if top > 0.0 {
        force.y += tuning.force_base * top;
        outside = true;
    }
    if bottom < 0.0 {
        force.y += tuning.force_base * bottom;
        outside = true;
    }
    (force, outside)
}

#[derive(Debug)]
pub struct RepositionController {
    tuning: RepositionTuning,
}

impl RepositionController {
    pub fn new(tuning: RepositionTuning) -> Self {
        RepositionController { tuning }
    }

    /// Runs one pass over `parts`. Does nothing until the boundaries are Full.
    /// Returns how many parts were pushed.
    pub fn apply<W: PhysicsWorld>(
        &self,
        world: &mut W,
        mode: BoundaryMode,
        viewport: &Viewport,
        parts: &[BodyId],
    ) -> usize {
        if mode != BoundaryMode::Full {
            return 0;
        }
        let mut pushed = 0;
        for &part in parts {
            match self.nudge(world, viewport, part) {
                Ok(true) => pushed += 1,
                Ok(false) => {}
                Err(e) => log::debug!("skipping {part:?} this step: {e}"),
            }
        }
        pushed
    }

    fn nudge<W: PhysicsWorld>(
        &self,
        world: &mut W,
        viewport: &Viewport,
        part: BodyId,
    ) -> Result<bool, WorldError> {
        let state = world.body_state(part)?;
        let (force, outside) = restoring_force(state.position, viewport, &self.tuning);
        if force != Vec2::ZERO {
            world.apply_force_at_point(part, force * state.mass, state.position)?;
        }
        if outside {
            world.set_linear_velocity(part, state.linvel * self.tuning.velocity_damp)?;
        }
        Ok(outside)
    }
}
