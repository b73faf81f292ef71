use thiserror::Error;

use crate::world::BodyId;

/// Faults reported by a [`PhysicsWorld`](crate::world::PhysicsWorld) implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError {
    #[error("no body with id {0:?} in the world")]
    UnknownBody(BodyId),
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("physics engine error: {0}")]
    Engine(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
