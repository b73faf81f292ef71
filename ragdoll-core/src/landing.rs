//! One-shot floor contact detection.

use glam::Vec2;
use serde::Serialize;

use crate::boundary::{BoundaryManager, BoundaryMode};
use crate::error::WorldError;
use crate::viewport::Viewport;
use crate::world::{BodyId, CollisionPair, Gravity, PhysicsWorld};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LandingState {
    Falling,
    Landed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GravityState {
    Enabled,
    Disabled,
}

#[derive(Debug)]
pub struct LandingDetector {
    landed: bool,
    gravity: GravityState,
}

impl Default for LandingDetector {
    fn default() -> Self {
        LandingDetector::new()
    }
}

impl LandingDetector {
    pub fn new() -> Self {
        LandingDetector {
            landed: false,
            gravity: GravityState::Enabled,
        }
    }

    pub fn state(&self) -> LandingState {
        if self.landed {
            LandingState::Landed
        } else {
            LandingState::Falling
        }
    }

    pub fn gravity(&self) -> GravityState {
        self.gravity
    }

    /// Finds a pair joining the floor to a dynamic body.
    pub fn floor_contact<W: PhysicsWorld>(
        world: &W,
        boundaries: &BoundaryManager,
        pairs: &[CollisionPair],
    ) -> Option<BodyId> {
        let floor = boundaries.set().bottom?;
        pairs.iter().find_map(|pair| {
            let other = pair.other(floor)?;
            match world.body_state(other) {
                Ok(state) if !state.is_static => Some(other),
                _ => None,
            }
        })
    }

    /// Handles a batch of collision-start pairs. Returns `true` on the call
    /// that performs the landing transition; every call after that is ignored.
    ///
    /// If the four walls cannot be built, gravity is restored and the
    /// detector goes back to Falling, so the next floor contact retries.
    pub fn on_collision<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        pairs: &[CollisionPair],
        boundaries: &mut BoundaryManager,
        viewport: &Viewport,
        parts: &[BodyId],
    ) -> Result<bool, WorldError> {
        if self.landed {
            return Ok(false);
        }
        let Some(body) = Self::floor_contact(world, boundaries, pairs) else {
            return Ok(false);
        };
        self.landed = true;

        let previous = world.gravity();
        world.set_gravity(Gravity::ZERO);
        self.gravity = GravityState::Disabled;

        for &part in parts {
            let zeroed = world
                .set_linear_velocity(part, Vec2::ZERO)
                .and_then(|_| world.set_angular_velocity(part, 0.0));
            if let Err(e) = zeroed {
                log::debug!("could not settle {part:?}: {e}");
            }
        }

        if let Err(e) = boundaries.set_mode(world, viewport, BoundaryMode::Full) {
            world.set_gravity(previous);
            self.gravity = GravityState::Enabled;
            self.landed = false;
            return Err(e);
        }
        log::info!("ragdoll landed ({body:?} touched the floor)");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWorld;
    use crate::world::{PartDesc, Rect};

    struct Fixture {
        world: MockWorld,
        boundaries: BoundaryManager,
        viewport: Viewport,
        parts: Vec<BodyId>,
    }

    fn fixture() -> Fixture {
        let mut world = MockWorld::new();
        world.set_gravity(Gravity::default());
        let viewport = Viewport::new(800.0, 600.0);
        let mut boundaries = BoundaryManager::new(120.0);
        boundaries
            .set_mode(&mut world, &viewport, BoundaryMode::Partial)
            .unwrap();
        let parts = (0..3)
            .map(|i| {
                let id = world
                    .add_part(&PartDesc {
                        rect: Rect::new(
                            Vec2::new(100.0 + 50.0 * i as f32, 500.0),
                            Vec2::splat(20.0),
                        ),
                        density: 0.002,
                        friction: 0.5,
                        restitution: 0.0,
                    })
                    .unwrap();
                world.set_linear_velocity(id, Vec2::new(3.0, 40.0)).unwrap();
                world.set_angular_velocity(id, 1.5).unwrap();
                id
            })
            .collect();
        Fixture {
            world,
            boundaries,
            viewport,
            parts,
        }
    }

    fn floor_pair(f: &Fixture, part: BodyId) -> CollisionPair {
        CollisionPair {
            a: f.boundaries.set().bottom.unwrap(),
            b: part,
        }
    }

    #[test]
    fn unrelated_pairs_keep_falling() {
        let mut f = fixture();
        let mut det = LandingDetector::new();
        let pairs = [CollisionPair {
            a: f.parts[0],
            b: f.parts[1],
        }];
        let fired = det
            .on_collision(&mut f.world, &pairs, &mut f.boundaries, &f.viewport, &f.parts)
            .unwrap();
        assert!(!fired);
        assert_eq!(det.state(), LandingState::Falling);
        assert_eq!(det.gravity(), GravityState::Enabled);
        assert!(f.world.gravity().scale > 0.0);
        assert_eq!(f.boundaries.mode(), BoundaryMode::Partial);
    }

    #[test]
    fn floor_contact_with_static_body_is_ignored() {
        let mut f = fixture();
        let rock = f
            .world
            .add_static_rect(&Rect::new(Vec2::new(10.0, 590.0), Vec2::splat(10.0)))
            .unwrap();
        let mut det = LandingDetector::new();
        let pairs = [floor_pair(&f, rock)];
        assert!(!det
            .on_collision(&mut f.world, &pairs, &mut f.boundaries, &f.viewport, &f.parts)
            .unwrap());
        assert_eq!(det.state(), LandingState::Falling);
    }

    #[test]
    fn first_floor_contact_lands_and_settles_parts() {
        let mut f = fixture();
        let mut det = LandingDetector::new();
        let pairs = [floor_pair(&f, f.parts[1])];
        let fired = det
            .on_collision(&mut f.world, &pairs, &mut f.boundaries, &f.viewport, &f.parts)
            .unwrap();

        assert!(fired);
        assert_eq!(det.state(), LandingState::Landed);
        assert_eq!(det.gravity(), GravityState::Disabled);
        assert_eq!(f.world.gravity(), Gravity::ZERO);
        assert_eq!(f.boundaries.mode(), BoundaryMode::Full);
        assert_eq!(f.boundaries.set().len(), 4);
        for &p in &f.parts {
            let s = f.world.body_state(p).unwrap();
            assert_eq!(s.linvel, Vec2::ZERO);
            assert_eq!(s.angvel, 0.0);
        }
    }

    #[test]
    fn landing_fires_exactly_once() {
        let mut f = fixture();
        let mut det = LandingDetector::new();
        let first = [floor_pair(&f, f.parts[0]), floor_pair(&f, f.parts[2])];
        assert!(det
            .on_collision(&mut f.world, &first, &mut f.boundaries, &f.viewport, &f.parts)
            .unwrap());
        let walls: Vec<_> = f.boundaries.set().iter().collect();

        // later contacts with the new floor change nothing
        for _ in 0..3 {
            f.world
                .set_linear_velocity(f.parts[0], Vec2::new(5.0, 5.0))
                .unwrap();
            let again = [floor_pair(&f, f.parts[0])];
            assert!(!det
                .on_collision(&mut f.world, &again, &mut f.boundaries, &f.viewport, &f.parts)
                .unwrap());
        }
        assert_eq!(f.boundaries.set().iter().collect::<Vec<_>>(), walls);
        assert_eq!(f.boundaries.mode(), BoundaryMode::Full);
        assert_eq!(det.gravity(), GravityState::Disabled);
        // velocity written after landing is left alone
        assert_eq!(
            f.world.body_state(f.parts[0]).unwrap().linvel,
            Vec2::new(5.0, 5.0)
        );
    }

    #[test]
    fn faulty_part_does_not_block_landing() {
        let mut f = fixture();
        f.world.faulty.insert(f.parts[0]);
        let mut det = LandingDetector::new();
        let pairs = [floor_pair(&f, f.parts[1])];
        assert!(det
            .on_collision(&mut f.world, &pairs, &mut f.boundaries, &f.viewport, &f.parts)
            .unwrap());
        let s = f.world.body_state(f.parts[2]).unwrap();
        assert_eq!(s.linvel, Vec2::ZERO);
        assert_eq!(f.boundaries.mode(), BoundaryMode::Full);
    }

    #[test]
    fn failed_wall_build_rearms_with_gravity_back() {
        let mut f = fixture();
        let floor = f.boundaries.set().bottom.unwrap();
        f.world.static_budget = Some(3);
        let mut det = LandingDetector::new();
        let pairs = [floor_pair(&f, f.parts[0])];
        assert!(det
            .on_collision(&mut f.world, &pairs, &mut f.boundaries, &f.viewport, &f.parts)
            .is_err());

        assert_eq!(det.state(), LandingState::Falling);
        assert_eq!(det.gravity(), GravityState::Enabled);
        assert_eq!(f.world.gravity(), Gravity::default());
        assert_eq!(f.boundaries.mode(), BoundaryMode::Partial);
        assert_eq!(f.boundaries.set().bottom, Some(floor));
        assert_eq!(f.boundaries.set().len(), 1);

        // the next contact succeeds once walls can be built again
        f.world.static_budget = None;
        assert!(det
            .on_collision(&mut f.world, &pairs, &mut f.boundaries, &f.viewport, &f.parts)
            .unwrap());
        assert_eq!(det.state(), LandingState::Landed);
        assert_eq!(f.boundaries.set().len(), 4);
    }
}
