//! Tunables for the playground. Every field falls back to its default when
//! missing from a loaded config file.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::world::Gravity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagdollConfig {
    /// Thickness of each screen wall in px. Must exceed the largest distance
    /// a dragged part can travel in one step.
    pub wall_thickness: f32,
    /// Distance from an edge inside which a part is pushed back (px).
    pub edge_margin: f32,
    /// Restoring force per px of penetration, per unit of mass.
    pub restore_force_base: f32,
    /// Velocity multiplier applied each step while a part is outside a margin.
    pub restore_velocity_damp: f32,
    pub gravity: Gravity,
    /// Fraction of the pointer distance closed per step while dragging, in [0, 1].
    pub drag_stiffness: f32,
    /// Upper bound on drag speed (px/s). `None` derives it from the wall
    /// thickness and time step.
    pub max_drag_speed: Option<f32>,
    pub timestep_hz: f32,
    pub max_substeps: u32,
    pub doll_scale: f32,
    pub part_density: f32,
    pub part_friction: f32,
    pub part_restitution: f32,
    pub show_walls: bool,
}

impl Default for RagdollConfig {
    fn default() -> Self {
        RagdollConfig {
            wall_thickness: 120.0,
            edge_margin: 30.0,
            restore_force_base: 200.0,
            restore_velocity_damp: 0.9,
            gravity: Gravity::default(),
            drag_stiffness: 0.2,
            max_drag_speed: None,
            timestep_hz: 60.0,
            max_substeps: 5,
            doll_scale: 1.0,
            part_density: 0.002,
            part_friction: 0.6,
            part_restitution: 0.1,
            show_walls: false,
        }
    }
}

impl RagdollConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: RagdollConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("wall_thickness", self.wall_thickness)?;
        positive("timestep_hz", self.timestep_hz)?;
        positive("doll_scale", self.doll_scale)?;
        positive("part_density", self.part_density)?;
        non_negative("edge_margin", self.edge_margin)?;
        non_negative("restore_force_base", self.restore_force_base)?;
        non_negative("part_friction", self.part_friction)?;
        non_negative("part_restitution", self.part_restitution)?;
        if !(self.restore_velocity_damp > 0.0 && self.restore_velocity_damp < 1.0) {
            return Err(out_of_range(
                "restore_velocity_damp",
                self.restore_velocity_damp,
            ));
        }
        if !(0.0..=1.0).contains(&self.drag_stiffness) {
            return Err(out_of_range("drag_stiffness", self.drag_stiffness));
        }
        if let Some(speed) = self.max_drag_speed {
            positive("max_drag_speed", speed)?;
        }
        if !self.gravity.x.is_finite() {
            return Err(out_of_range("gravity.x", self.gravity.x));
        }
        if !self.gravity.y.is_finite() {
            return Err(out_of_range("gravity.y", self.gravity.y));
        }
        non_negative("gravity.scale", self.gravity.scale)?;
        if self.max_substeps == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_substeps",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Drag speed cap: the explicit value, or half a wall thickness per step.
    pub fn drag_speed_limit(&self) -> f32 {
        self.max_drag_speed
            .unwrap_or(0.5 * self.wall_thickness * self.timestep_hz)
    }
}

fn out_of_range(field: &'static str, value: f32) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        value: value as f64,
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value))
    }
}
