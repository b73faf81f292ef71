//! Paper-doll ragdoll that falls onto the bottom of the screen, then stays
//! boxed in by four walls and a soft push back from the edges.
//!
//! The simulation logic talks to the physics engine only through
//! [`PhysicsWorld`]. [`RapierWorld`] is the rapier2d implementation used by
//! the browser build.

pub mod boundary;
pub mod config;
pub mod controller;
pub mod drag;
pub mod error;
pub mod landing;
pub mod ragdoll;
pub mod rapier_world;
pub mod reposition;
pub mod session;
pub mod viewport;
pub mod world;

#[cfg(test)]
mod mock;

pub use boundary::{BoundaryManager, BoundaryMode, BoundarySet, Edge};
pub use config::RagdollConfig;
pub use controller::{BoundaryController, SessionStatus, StepHooks};
pub use drag::DragController;
pub use error::{ConfigError, Error, Result, WorldError};
pub use landing::{GravityState, LandingDetector, LandingState};
pub use ragdoll::{PartKind, Ragdoll, RagdollOptions};
pub use rapier_world::RapierWorld;
pub use reposition::{RepositionController, RepositionTuning};
pub use session::{FixedStep, PartPose, Playground};
pub use viewport::Viewport;
pub use world::{BodyId, BodyState, CollisionPair, Gravity, PhysicsWorld, Rect};

pub use glam::Vec2;
